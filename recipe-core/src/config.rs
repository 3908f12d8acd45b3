use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::session::Credentials;

pub const APP_DIR_NAME: &str = "recipe-browser";

pub const ENV_API_KEY: &str = "RECIPES_API_KEY";
pub const ENV_API_HOST: &str = "RECIPES_API_HOST";
pub const ENV_USER_EMAIL: &str = "RECIPES_USER_EMAIL";
pub const ENV_USER_PASSWORD: &str = "RECIPES_USER_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub favorites: FavoritesConfig,
    pub budget: BudgetConfig,
    /// Where `local_store.json` lives; defaults to the config directory.
    pub storage_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub list_url: String,
    pub detail_url: String,
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub request_timeout_seconds: u64,
    pub page_size: u32,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub email: Option<String>,
    pub password: Option<String>,
    pub signed_in_at_start: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FavoritesPersistence {
    #[default]
    Memory,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FavoritesConfig {
    pub persistence: FavoritesPersistence,
    pub clear_on_logout: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BudgetReset {
    #[default]
    Never,
    Daily,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct BudgetConfig {
    /// Maximum number of outbound API calls; `None` disables the budget.
    pub limit: Option<u32>,
    pub reset: BudgetReset,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            list_url: "https://tasty.p.rapidapi.com/recipes/list".to_owned(),
            detail_url: "https://tasty.p.rapidapi.com/recipes/get-more-info".to_owned(),
            api_key: None,
            api_host: Some("tasty.p.rapidapi.com".to_owned()),
            request_timeout_seconds: 10,
            page_size: 20,
        }
    }
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            persistence: FavoritesPersistence::Memory,
            clear_on_logout: true,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("signed_in_at_start", &self.signed_in_at_start)
            .finish()
    }
}

impl AuthConfig {
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some(Credentials {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

impl AppConfig {
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join(APP_DIR_NAME))
    }

    /// Récupère le chemin du fichier de configuration
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn storage_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::config_dir(),
        }
    }

    /// Charge la configuration depuis le fichier par défaut, ou crée une
    /// configuration par défaut. Les variables d'environnement s'appliquent
    /// dans les deux cas.
    pub fn load() -> Self {
        let mut config = match Self::config_file_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "unable to load configuration, using defaults");
                let default_config = Self::default();
                if let Err(save_err) = Self::config_file_path()
                    .and_then(|path| default_config.save_to(&path))
                {
                    warn!(error = %save_err, "unable to save default configuration");
                }
                default_config
            }
        };
        config.apply_env_overrides();
        config
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Secrets never live in the config file in practice; they come from
    /// the environment, like the browser build's `VITE_*` variables.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api.api_key = Some(key);
        }
        if let Some(host) = lookup(ENV_API_HOST) {
            self.api.api_host = Some(host);
        }
        if let Some(email) = lookup(ENV_USER_EMAIL) {
            self.auth.email = Some(email);
        }
        if let Some(password) = lookup(ENV_USER_PASSWORD) {
            self.auth.password = Some(password);
        }
    }
}
