//! vecsmoke
//!
//! Smoke test for a vector store endpoint: ensure a collection, upsert sample
//! points, search, print the results.
//!
//! # Usage
//!
//! ```bash
//! vecsmoke run --host localhost --no-tls
//! vecsmoke check --host https://xyz.cloud.qdrant.io
//! vecsmoke config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/vecsmoke/config.toml)
//! 3. Environment variables (VECSMOKE_*, then bare HOST / API_KEY)
//! 4. CLI flags

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use vecsmoke_cli::{
    describe_error, handle_check, handle_run, init_logging, load_settings, show_config, Cli,
    Commands,
};

async fn execute(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_deref(), cli.log_level.as_deref())?;

    match cli.command {
        Commands::Run(args) => {
            init_logging(&settings.log_level)?;
            handle_run(settings, &args).await?;
        }
        Commands::Check(args) => {
            init_logging(&settings.log_level)?;
            handle_check(settings, &args).await?;
        }
        Commands::Config => {
            print!("{}", show_config(&settings)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}
