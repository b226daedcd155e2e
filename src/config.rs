//! Runtime configuration.
//!
//! Everything is resolved once at startup from (in order of precedence)
//! CLI flags, environment variables (`.env` is honored), and defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Dataset directories the resolver searches, in order.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Datasets colocated with the service.
    pub local_dir: PathBuf,
    /// Shared top-level dataset directory (fallback).
    pub shared_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from("datasets"),
            shared_dir: PathBuf::from("../datasets"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub data: DataConfig,
}

impl AppConfig {
    /// Build the configuration from the environment, with defaults.
    ///
    /// Recognized variables: `INSIGHT_ADDR`, `INSIGHT_DATASETS_DIR`,
    /// `INSIGHT_SHARED_DATASETS_DIR`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let addr: SocketAddr = match std::env::var("INSIGHT_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid INSIGHT_ADDR '{raw}': {e}"))?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 8000)),
        };

        let mut data = DataConfig::default();
        if let Ok(dir) = std::env::var("INSIGHT_DATASETS_DIR") {
            data.local_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("INSIGHT_SHARED_DATASETS_DIR") {
            data.shared_dir = PathBuf::from(dir);
        }

        Ok(AppConfig { addr, data })
    }
}
