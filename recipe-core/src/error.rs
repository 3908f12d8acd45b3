use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API Error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("response parsing error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request budget exhausted ({limit} calls)")]
    BudgetExceeded { limit: u32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to locate a configuration directory")]
    NoConfigDir,
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write config file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("a signed-in session is required")]
    NotConnected,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
