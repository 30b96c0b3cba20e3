//! Configuration loading
//!
//! Resolution order (later wins):
//! 1. Embedded defaults (`config/estimator.toml`)
//! 2. Override file: `--config PATH`, else `~/.local/share/estimator/config.toml`
//! 3. Environment variables
//!
//! Override files may be partial; any key they omit keeps its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ai::openai_compatible;
use crate::error::{Error, Result};

/// Embedded default config
const DEFAULT_CONFIG: &str = include_str!("../../../config/estimator.toml");

/// Effective configuration for the server and the AI backend
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EstimatorConfig {
    pub server: ServerSettings,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// IPs or CIDRs, parsed by the server
    pub trusted_proxies: Vec<String>,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiConfig {
    pub backend: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origins: Vec::new(),
            trusted_proxies: Vec::new(),
            rate_limit_max: crate::rate_limit::DEFAULT_MAX_REQUESTS,
            rate_limit_window_secs: crate::rate_limit::DEFAULT_WINDOW.as_secs(),
            static_dir: None,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: "openai_compatible".to_string(),
            model: openai_compatible::DEFAULT_MODEL.to_string(),
            timeout_secs: openai_compatible::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Get the default override config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("estimator").join("config.toml"))
}

impl EstimatorConfig {
    /// Load defaults, the override file and environment overrides
    ///
    /// An explicit `override_path` must exist; the default location is
    /// optional.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_toml(DEFAULT_CONFIG)?;

        if let Some(path) = override_path {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            config.merge_toml(&content)?;
        } else if let Some(path) = default_config_path().filter(|p| p.exists()) {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            config.merge_toml(&content)?;
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Parse a complete config on top of the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.merge_toml(content)?;
        Ok(config)
    }

    /// Apply the keys present in `content` to this config
    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(server) = raw.server {
            if let Some(host) = server.host {
                self.server.host = host;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(origins) = server.allowed_origins {
                self.server.allowed_origins = origins;
            }
            if let Some(proxies) = server.trusted_proxies {
                self.server.trusted_proxies = proxies;
            }
            if let Some(max) = server.rate_limit_max {
                self.server.rate_limit_max = max;
            }
            if let Some(secs) = server.rate_limit_window_secs {
                self.server.rate_limit_window_secs = secs;
            }
            if let Some(dir) = server.static_dir {
                self.server.static_dir = Some(dir);
            }
        }

        if let Some(ai) = raw.ai {
            if let Some(backend) = ai.backend {
                self.ai.backend = backend;
            }
            if let Some(model) = ai.model {
                self.ai.model = model;
            }
            if let Some(timeout) = ai.timeout_secs {
                self.ai.timeout_secs = timeout;
            }
        }

        self.check()
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            self.server.allowed_origins = split_list(&origins);
        }
        if let Some(proxies) = lookup("ESTIMATOR_TRUSTED_PROXIES") {
            self.server.trusted_proxies = split_list(&proxies);
        }
        if let Some(max) = lookup("ESTIMATOR_RATE_LIMIT_MAX") {
            self.server.rate_limit_max = parse_env("ESTIMATOR_RATE_LIMIT_MAX", &max)?;
        }
        if let Some(secs) = lookup("ESTIMATOR_RATE_LIMIT_WINDOW_SECS") {
            self.server.rate_limit_window_secs =
                parse_env("ESTIMATOR_RATE_LIMIT_WINDOW_SECS", &secs)?;
        }
        if let Some(backend) = lookup("AI_BACKEND") {
            self.ai.backend = backend;
        }
        if let Some(model) = lookup("OPENAI_COMPATIBLE_MODEL") {
            self.ai.model = model;
        }
        if let Some(timeout) = lookup("OPENAI_COMPATIBLE_TIMEOUT_SECS") {
            self.ai.timeout_secs = parse_env("OPENAI_COMPATIBLE_TIMEOUT_SECS", &timeout)?;
        }

        self.check()
    }

    /// Render as TOML (for `estimator config`)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    fn check(&self) -> Result<()> {
        if self.server.rate_limit_max == 0 {
            return Err(Error::Config("rate_limit_max must be at least 1".to_string()));
        }
        if self.server.rate_limit_window_secs == 0 {
            return Err(Error::Config(
                "rate_limit_window_secs must be at least 1".to_string(),
            ));
        }
        if self.ai.timeout_secs == 0 {
            return Err(Error::Config("ai.timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, value)))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    server: Option<RawServer>,
    ai: Option<RawAi>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    allowed_origins: Option<Vec<String>>,
    trusted_proxies: Option<Vec<String>>,
    rate_limit_max: Option<u32>,
    rate_limit_window_secs: Option<u64>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAi {
    backend: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}
