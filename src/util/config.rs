//! Startup configuration.
//!
//! Read from `config.json` in the platform config dir (or the file named by
//! `HOUSE_PRICE_CONFIG`), then patched by environment variables.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "HousePricePredictor";
const APP_NAME: &str = "HousePricePredictor";

pub const DEFAULT_MODEL_PATH: &str = "Models/LinearRegression.json";
pub const DEFAULT_WORKSHEET: &str = "House Data";

pub const ENV_CONFIG: &str = "HOUSE_PRICE_CONFIG";
pub const ENV_MODEL: &str = "HOUSE_PRICE_MODEL";
pub const ENV_LOG: &str = "HOUSE_PRICE_LOG";
pub const ENV_SHEET_ID: &str = "HOUSE_PRICE_SHEET_ID";
pub const ENV_SHEETS_TOKEN: &str = "HOUSE_PRICE_SHEETS_TOKEN";
pub const ENV_SHEETS_API_KEY: &str = "HOUSE_PRICE_SHEETS_API_KEY";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub worksheet: String,
    pub log_level: String,
    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            worksheet: DEFAULT_WORKSHEET.to_string(),
            log_level: "info".to_string(),
            store: StoreConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    Workbook {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Sheets {
        spreadsheet_id: String,
        #[serde(default)]
        access_token: Option<String>,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Workbook { path: None }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Serde {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl AppConfig {
    /// Applies environment overrides. `lookup` is `std::env::var` outside tests.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = var(ENV_MODEL) {
            self.model_path = PathBuf::from(path);
        }
        if let Some(level) = var(ENV_LOG) {
            self.log_level = level;
        }
        if let Some(id) = var(ENV_SHEET_ID) {
            let base_url = match &self.store {
                StoreConfig::Sheets { base_url, .. } => base_url.clone(),
                StoreConfig::Workbook { .. } => None,
            };
            self.store = StoreConfig::Sheets {
                spreadsheet_id: id,
                access_token: None,
                api_key: None,
                base_url,
            };
        }
        if let StoreConfig::Sheets {
            access_token,
            api_key,
            ..
        } = &mut self.store
        {
            if let Some(token) = var(ENV_SHEETS_TOKEN) {
                *access_token = Some(token);
            }
            if let Some(key) = var(ENV_SHEETS_API_KEY) {
                *api_key = Some(key);
            }
        }
        self
    }
}

fn config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("config.json"))
}

/// Reads a config file. A missing file yields the defaults.
pub fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).map_err(|source| ConfigError::Serde {
            path: path.to_path_buf(),
            source,
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads the process configuration: file (if any) plus environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let base = match config_file() {
        Some(path) => read_config_file(&path)?,
        None => AppConfig::default(),
    };
    Ok(base.with_env_overrides(|key| std::env::var(key).ok()))
}
