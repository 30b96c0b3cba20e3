//! Estimator CLI - Project cost estimates
//!
//! Usage:
//!   estimator estimate --type web-app --pages 8 --auth   Structured estimate
//!   estimator parse "A booking site with logins..."      Free-form estimate via AI
//!   estimator serve --port 3000                          Start web server
//!   estimator config                                     Show effective config

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use estimator_core::{EstimatorConfig, StructuredInput};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Estimate {
            project_type,
            pages,
            complexity,
            auth,
            admin_panel,
            ai,
            timeline,
            notes,
            output,
        } => {
            let input = StructuredInput {
                project_type,
                pages,
                complexity,
                auth,
                admin_panel,
                ai_features: ai,
                timeline,
                notes: notes.unwrap_or_default(),
            };
            commands::cmd_estimate(&input, &output)
        }
        Commands::Parse {
            description,
            output,
        } => {
            let config = EstimatorConfig::load(cli.config.as_deref())?;
            commands::cmd_parse(&config, &description, &output).await
        }
        Commands::Serve {
            port,
            host,
            static_dir,
        } => {
            let config = EstimatorConfig::load(cli.config.as_deref())?;
            commands::cmd_serve(&config, host.as_deref(), port, static_dir.as_deref()).await
        }
        Commands::Config => {
            let config = EstimatorConfig::load(cli.config.as_deref())?;
            commands::cmd_config(&config)
        }
    }
}
