use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{auth::local::DEFAULT_PASSWORD_COST, utils::paths::PathResolver};

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

/// User preferences for the CLI and the local stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    #[serde(default = "Config::default_password_cost")]
    pub password_cost: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Overrides where user documents and credentials are kept.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: Self::default_currency_symbol(),
            log_filter: Self::default_log_filter(),
            password_cost: Self::default_password_cost(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn default_currency_symbol() -> String {
        "£".into()
    }

    pub fn default_log_filter() -> String {
        "budget_folders=info".into()
    }

    pub fn default_password_cost() -> u32 {
        DEFAULT_PASSWORD_COST
    }

    /// Formats an amount with the configured currency symbol.
    pub fn format_amount(&self, amount: f64) -> String {
        if amount < 0.0 {
            format!("-{}{:.2}", self.currency_symbol, amount.abs())
        } else {
            format!("{}{:.2}", self.currency_symbol, amount)
        }
    }

    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| base.to_path_buf())
    }
}

/// Handles persistence of [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: &Path) -> Result<Self, ConfigError> {
        let path = PathResolver::config_file_in(base);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self::new(path))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.config_path.exists() {
            let data = fs::read_to_string(&self.config_path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.config_path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");
        let config = manager.load().expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.currency_symbol, "£");
    }

    #[test]
    fn config_manager_persists_and_loads_config() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");
        let mut config = Config::default();
        config.currency_symbol = "$".into();
        config.password_cost = 4;
        manager.save(&config).expect("save");
        assert_eq!(manager.load().expect("load"), config);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");
        fs::write(manager.config_path(), r#"{ "currency_symbol": "€" }"#).expect("write");
        let config = manager.load().expect("load");
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.log_filter, "budget_folders=info");
    }

    #[test]
    fn amounts_use_currency_symbol() {
        let config = Config::default();
        assert_eq!(config.format_amount(155.0), "£155.00");
        assert_eq!(config.format_amount(-20.5), "-£20.50");
    }
}
