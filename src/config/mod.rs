mod types;

pub use types::{Config, PerformanceConfig, PulseConfig, MAX_ROTATION_INTERVAL_SECS};

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "SIGNAGE_CONFIG";

#[derive(Debug, Error)]
enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_config() -> Config {
    load_config_from(&get_config_path())
}

/// Loads and validates the config at `config_path`. Any failure is logged and
/// yields the defaults; the player always starts.
pub fn load_config_from(config_path: &Path) -> Config {
    let config = if config_path.exists() {
        match read_config(config_path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", config_path);
                config
            }
            Err(e) => {
                log::error!("{}", e);
                Config::default()
            }
        }
    } else {
        log::info!("No config file found at {:?}, using defaults", config_path);
        Config::default()
    };

    let issues = config.validate();
    let errors: Vec<_> = issues.iter().filter(|i| i.is_error).collect();
    let warnings: Vec<_> = issues.iter().filter(|i| !i.is_error).collect();

    for warning in &warnings {
        log::warn!("Config: {}", warning);
    }
    for error in &errors {
        log::error!("Config: {}", error);
    }

    if !issues.is_empty() {
        log::info!(
            "Config validation: {} error(s), {} warning(s)",
            errors.len(),
            warnings.len()
        );
    }

    if !errors.is_empty() {
        log::error!("Config has errors; falling back to defaults.");
        return Config::default();
    }

    config
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

pub fn get_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("signage")
        .join("config.toml")
}
