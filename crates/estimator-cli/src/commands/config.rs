//! Config command implementation

use anyhow::Result;

use estimator_core::config::default_config_path;
use estimator_core::EstimatorConfig;

pub fn cmd_config(config: &EstimatorConfig) -> Result<()> {
    println!();
    println!("⚙️  Estimator Configuration");
    println!("   ─────────────────────────────────────────────────────────────");
    match default_config_path() {
        Some(path) if path.exists() => println!("   Override file: {}", path.display()),
        Some(path) => println!("   Override file: {} (not present)", path.display()),
        None => println!("   Override file: (no data directory on this platform)"),
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
