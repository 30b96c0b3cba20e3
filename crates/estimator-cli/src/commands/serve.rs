//! Server command implementation

use std::path::Path;

use anyhow::Result;

use estimator_core::{AIClient, EstimatorConfig};
use estimator_server::ServerConfig;

pub async fn cmd_serve(
    config: &EstimatorConfig,
    host: Option<&str>,
    port: Option<u16>,
    static_dir: Option<&Path>,
) -> Result<()> {
    let host = host.unwrap_or(&config.server.host);
    let port = port.unwrap_or(config.server.port);
    let static_dir = static_dir.or(config.server.static_dir.as_deref());
    let server_config = ServerConfig::from_settings(&config.server);

    println!("🚀 Starting estimator web server...");
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    println!(
        "   ⏱️  Rate limit: {} requests / {}s per client",
        server_config.rate_limit_max,
        server_config.rate_limit_window.as_secs()
    );
    if server_config.allowed_origins.is_empty() {
        println!("   ⚠️  Origin check: disabled (set ALLOWED_ORIGINS)");
    } else {
        println!(
            "   🔒 Allowed origins: {}",
            server_config.allowed_origins.join(", ")
        );
    }
    if !server_config.trusted_proxies.is_empty() {
        println!(
            "   🔀 Trusted proxies: {}",
            server_config
                .trusted_proxies
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!();

    let ai = AIClient::from_config(&config.ai);
    estimator_server::serve_with_config(host, port, static_dir, server_config, ai).await
}
