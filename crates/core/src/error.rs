use thiserror::Error;

pub type BeaconResult<T> = Result<T, BeaconError>;

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid page URL: {0}")]
    InvalidPageUrl(String),

    #[error("Backend '{platform}' cannot encode a {kind} hit")]
    UnsupportedHit {
        platform: &'static str,
        kind: &'static str,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for BeaconError {
    fn from(err: config::ConfigError) -> Self {
        BeaconError::Config(err.to_string())
    }
}
