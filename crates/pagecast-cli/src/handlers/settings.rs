//! Settings command handler.

use anyhow::Result;
use pagecast_core::{Settings, SettingsUpdate, find_voice};

use crate::bootstrap::CliContext;
use crate::commands::SettingsCommand;
use crate::error::CliError;
use crate::utils::input;

/// Execute a settings subcommand.
pub async fn execute(ctx: &CliContext, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            let settings = ctx.settings.get().await.map_err(CliError::from)?;
            print_settings(&settings);
        }
        SettingsCommand::Set {
            voice,
            volume,
            timeout,
            no_timeout,
            autoplay,
        } => {
            let update = build_update(voice, volume, timeout, no_timeout, autoplay)?;
            let settings = ctx.settings.update(update).await.map_err(CliError::from)?;
            println!("Settings updated.");
            print_settings(&settings);
        }
        SettingsCommand::Reset { force } => {
            if !force && !input::prompt_confirmation("Reset all settings to defaults?")? {
                println!("Reset cancelled.");
                return Ok(());
            }
            let settings = ctx.settings.reset().await.map_err(CliError::from)?;
            println!("Settings reset to defaults.");
            print_settings(&settings);
        }
    }
    Ok(())
}

/// Turn `settings set` flags into a partial update.
fn build_update(
    voice: Option<String>,
    volume: Option<f32>,
    timeout: Option<u64>,
    no_timeout: bool,
    autoplay: Option<bool>,
) -> Result<SettingsUpdate, CliError> {
    // Canonicalize the voice id so stored settings match the catalogue.
    let voice = voice
        .map(|v| {
            find_voice(&v)
                .map(|found| found.id)
                .ok_or_else(|| CliError::Arguments(format!("unknown voice '{v}' (see 'pagecast voices')")))
        })
        .transpose()?;

    let timeout = if no_timeout { Some(None) } else { timeout.map(Some) };

    let update = SettingsUpdate {
        default_voice: voice.map(Some),
        volume: volume.map(Some),
        synthesis_timeout_secs: timeout,
        autoplay_on_open: autoplay.map(Some),
    };

    if update.default_voice.is_none()
        && update.volume.is_none()
        && update.synthesis_timeout_secs.is_none()
        && update.autoplay_on_open.is_none()
    {
        return Err(CliError::Arguments(
            "nothing to change; pass at least one option (see 'pagecast settings set --help')"
                .to_string(),
        ));
    }

    Ok(update)
}

fn print_settings(settings: &Settings) {
    println!("  voice    = {}", settings.default_voice.as_deref().unwrap_or("(default)"));
    println!("  volume   = {:.2}", settings.effective_volume());
    match settings.synthesis_timeout_secs {
        Some(secs) => println!("  timeout  = {secs}s"),
        None => println!("  timeout  = none"),
    }
    println!("  autoplay = {}", settings.autoplay_on_open.unwrap_or(false));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::context;

    #[test]
    fn test_build_update_canonicalizes_voice() {
        let update = build_update(Some("kore".into()), None, None, false, None).unwrap();
        assert_eq!(update.default_voice, Some(Some("Kore".to_string())));
    }

    #[test]
    fn test_build_update_rejects_unknown_voice() {
        let err = build_update(Some("Zephyr-9".into()), None, None, false, None).unwrap_err();
        assert!(matches!(err, CliError::Arguments(_)));
    }

    #[test]
    fn test_no_timeout_clears_timeout() {
        let update = build_update(None, None, None, true, None).unwrap();
        assert_eq!(update.synthesis_timeout_secs, Some(None));
    }

    #[test]
    fn test_empty_update_is_rejected() {
        assert!(build_update(None, None, None, false, None).is_err());
    }

    #[tokio::test]
    async fn test_set_then_show_round_trip() {
        let ctx = context().await;
        execute(
            &ctx,
            SettingsCommand::Set {
                voice: Some("aoede".into()),
                volume: Some(0.4),
                timeout: Some(45),
                no_timeout: false,
                autoplay: Some(true),
            },
        )
        .await
        .unwrap();

        let settings = ctx.settings.get().await.unwrap();
        assert_eq!(settings.default_voice.as_deref(), Some("Aoede"));
        assert_eq!(settings.volume, Some(0.4));
        assert_eq!(settings.synthesis_timeout_secs, Some(45));
        assert_eq!(settings.autoplay_on_open, Some(true));
    }

    #[tokio::test]
    async fn test_invalid_volume_is_config_error() {
        let ctx = context().await;
        let err = execute(
            &ctx,
            SettingsCommand::Set {
                voice: None,
                volume: Some(1.5),
                timeout: None,
                no_timeout: false,
                autoplay: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err.downcast_ref::<CliError>(), Some(CliError::Config(_))));
    }

    #[tokio::test]
    async fn test_forced_reset_restores_defaults() {
        let ctx = context().await;
        let update = build_update(Some("Charon".into()), None, None, false, None).unwrap();
        ctx.settings.update(update).await.unwrap();

        execute(&ctx, SettingsCommand::Reset { force: true }).await.unwrap();

        assert_eq!(ctx.settings.get().await.unwrap(), Settings::with_defaults());
    }
}
