//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use estimator_core::{AiFeatures, Complexity, ExportFormat, ProjectType, Timeline};

/// Estimator - Deterministic project cost estimates
#[derive(Parser)]
#[command(name = "estimator")]
#[command(about = "Project cost estimator with optional AI-assisted scoping", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.local/share/estimator/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate from structured scope
    Estimate {
        /// Project type: landing, web-app, script, mobile, other
        #[arg(long = "type", default_value = "web-app")]
        project_type: ProjectType,

        /// Number of pages or screens
        #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=200))]
        pages: u32,

        /// Complexity: low, medium, high
        #[arg(short, long, default_value = "medium")]
        complexity: Complexity,

        /// User accounts / authentication
        #[arg(long)]
        auth: bool,

        /// Admin dashboard
        #[arg(long)]
        admin_panel: bool,

        /// AI features: none, basic, advanced
        #[arg(long, default_value = "none")]
        ai: AiFeatures,

        /// Timeline: flexible, normal, rushed
        #[arg(short, long, default_value = "normal")]
        timeline: Timeline,

        /// Free-text notes (max 500 characters)
        #[arg(long)]
        notes: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Estimate from a free-form description via the AI backend
    Parse {
        /// Project description (5-2000 characters)
        description: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (default from config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Directory of static site files to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

/// Output flags shared by `estimate` and `parse`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Write the estimate to a file (or into a directory with a dated name)
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Export format: text, csv, json (default: from the file extension)
    #[arg(long)]
    pub format: Option<ExportFormat>,

    /// Leave assumptions out of the summary and invoice
    #[arg(long)]
    pub no_assumptions: bool,

    /// Leave optimization ideas out of the summary and invoice
    #[arg(long)]
    pub no_suggestions: bool,
}
