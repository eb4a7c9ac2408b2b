use dirs::home_dir;
use std::{
    env,
    path::{Path, PathBuf},
};

pub const HOME_ENV: &str = "BUDGET_FOLDERS_HOME";

const DEFAULT_DIR_NAME: &str = ".budget_folders";
const USERS_DIR: &str = "users";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const CREDENTIALS_FILE: &str = "credentials.json";

/// Resolves where the CLI keeps its files.
pub struct PathResolver;

impl PathResolver {
    /// `$BUDGET_FOLDERS_HOME`, defaulting to `~/.budget_folders`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn users_dir_in(base: &Path) -> PathBuf {
        base.join(USERS_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    pub fn credentials_file_in(base: &Path) -> PathBuf {
        base.join(CREDENTIALS_FILE)
    }
}
