//! CLI entry point - the composition root.
//!
//! Loads `.env`, parses arguments, initializes logging, bootstraps the
//! context and dispatches to a handler. Errors are printed once here and
//! mapped to an exit code.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use pagecast_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .chain()
                .find_map(|e| e.downcast_ref::<CliError>())
                .map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` for pagecast crates with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,pagecast_core=debug,pagecast_db=debug,pagecast_gemini=debug,pagecast_voice=debug,pagecast_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let ctx = bootstrap(CliConfig {
        data_dir: cli.data_dir,
        api_key: cli.api_key,
    })
    .await?;

    match command {
        Commands::Import {
            file,
            title,
            no_fallback,
        } => handlers::import::execute(&ctx, &file, title, no_fallback).await?,
        Commands::List => handlers::list::execute(&ctx).await?,
        Commands::Remove { document, force } => {
            handlers::remove::execute(&ctx, &document, force).await?;
        }
        Commands::Play { document, autoplay } => {
            handlers::play::execute(&ctx, document, autoplay).await?;
        }
        Commands::Voices => handlers::voices::execute(&ctx).await?,
        Commands::Paths => handlers::paths::execute(&ctx),
        Commands::Settings { command } => handlers::settings::execute(&ctx, command).await?,
    }

    Ok(())
}
