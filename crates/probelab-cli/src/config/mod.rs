//! Configuration loading for probelab.
//! Reads probelab.toml from the current directory or the path in
//! PROBELAB_CONFIG; PROBELAB_API_URL overrides the backend address either way.

use std::path::Path;

use probelab_common::{ProbelabError, Result};
use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub steering: SteeringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url()        -> String { "http://localhost:8000".to_string() }
fn default_request_timeout() -> u64 { 60 }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Deployed backends have used 80s and 90s idle windows with 5s or 10s
/// refresh; both are plain configuration here, never literals at call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_staleness_threshold")]
    pub staleness_threshold_secs: u64,
}

fn default_poll_interval()       -> u64 { 5 }
fn default_staleness_threshold() -> u64 { 90 }

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            staleness_threshold_secs: default_staleness_threshold(),
        }
    }
}

/// The steering demo's form defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringConfig {
    #[serde(default = "default_layer")]
    pub layer: u32,
    #[serde(default = "default_scaling_factor")]
    pub scaling_factor: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_layer()          -> u32 { 9 }
fn default_scaling_factor() -> f64 { 5.0 }
fn default_max_tokens()     -> u32 { 50 }

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            layer: default_layer(),
            scaling_factor: default_scaling_factor(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Config {
    /// Load configuration; a missing file just means defaults.
    pub fn load() -> Result<Config> {
        let path = std::env::var("PROBELAB_CONFIG").unwrap_or_else(|_| "probelab.toml".to_string());
        let mut config = if Path::new(&path).exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| ProbelabError::Config(format!("cannot read {path}: {e}")))?;
            toml::from_str(&raw)
                .map_err(|e| ProbelabError::Config(format!("invalid {path}: {e}")))?
        } else {
            Config::default()
        };
        if let Ok(url) = std::env::var("PROBELAB_API_URL") {
            config.api.base_url = url;
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.monitor.poll_interval_secs)
    }

    pub fn staleness_threshold(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.monitor.staleness_threshold_secs)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.api.request_timeout_secs)
    }
}
