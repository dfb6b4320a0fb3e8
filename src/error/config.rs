use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    OpenFileError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Invalid ledger base url: {0}")]
    InvalidBaseUrl(String),

    #[error("Address is both a root and a destination: {0}")]
    OverlappingWallets(String),

    #[error("Invalid threshold {0}: must be within [0, 1]")]
    InvalidThreshold(f64),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),
}
