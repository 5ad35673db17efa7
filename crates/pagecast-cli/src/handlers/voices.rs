//! Voices command handler.

use anyhow::Result;
use pagecast_core::{AVAILABLE_VOICES, default_voice};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// List the catalogue, marking the configured default.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let settings = ctx.settings.get().await.map_err(CliError::from)?;
    let selected = settings
        .default_voice
        .unwrap_or_else(|| default_voice().id);

    for (id, label, _) in AVAILABLE_VOICES {
        let marker = if id.eq_ignore_ascii_case(&selected) { "*" } else { " " };
        println!("{marker} {id:<8} {label}");
    }
    println!("\n* = default. Change it with 'pagecast settings set --voice <id>'.");
    Ok(())
}
