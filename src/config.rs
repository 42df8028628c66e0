//! Configuration management for the LBAS server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the flat JSON record collections
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub session_timeout_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CirculationConfig {
    /// How long a walk-in reservation is held before it expires
    pub reservation_hold_minutes: i64,
    /// Cap on concurrently active reservations per member
    pub max_active_reservations: usize,
    /// Lifetime of a password-reset ticket
    pub ticket_ttl_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub circulation: CirculationConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LBAS_)
            .add_source(
                Environment::with_prefix("LBAS")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override data directory from LBAS_DATA_DIR env var if present
            .set_override_option("storage.data_dir", env::var("LBAS_DATA_DIR").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_timeout_hours: 2,
        }
    }
}

impl Default for CirculationConfig {
    fn default() -> Self {
        Self {
            reservation_hold_minutes: 30,
            max_active_reservations: 5,
            ticket_ttl_minutes: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
