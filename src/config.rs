use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::schema::ValidationMode;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ValidationConfig {
    #[serde(default)]
    pub mode: ValidationMode,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct InputConfig {
    /// JSON file of records; the demo records are used when unset
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub csv_logging: bool,
    #[serde(default = "default_csv_log_path")]
    pub csv_log_path: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            csv_logging: false,
            csv_log_path: default_csv_log_path(),
        }
    }
}

fn default_csv_log_path() -> String { "validation_log.csv".to_string() }

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub config_path: String,
    pub input_path: Option<String>,
    pub validation_mode: Option<ValidationMode>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        
        Ok(config)
    }

    /// Environment values take precedence over the file
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(path) = &env.input_path {
            self.input.path = Some(path.clone());
        }
        if let Some(mode) = env.validation_mode {
            self.validation.mode = mode;
        }
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();
        
        let validation_mode = match std::env::var("VALIDATION_MODE") {
            Ok(raw) => Some(
                raw.parse::<ValidationMode>()
                    .context("VALIDATION_MODE is invalid")?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            config_path: std::env::var("SNAPSHOT_CONFIG")
                .unwrap_or_else(|_| "config.toml".to_string()),
            input_path: std::env::var("SNAPSHOT_INPUT").ok(),
            validation_mode,
        })
    }
}
