//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `config` - Print the effective configuration
//! - `estimate` - Structured estimate
//! - `output` - Shared summary printing and file export
//! - `parse` - Free-form estimate via the AI backend
//! - `serve` - Web server command

pub mod config;
pub mod estimate;
pub mod output;
pub mod parse;
pub mod serve;

// Re-export command functions for main.rs
pub use config::*;
pub use estimate::*;
pub use output::*;
pub use parse::*;
pub use serve::*;
