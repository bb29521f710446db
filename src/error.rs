use thiserror::Error;

/// Configuration errors raised while reading the hook environment
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("Validation token must not be empty")]
    EmptyToken,

    #[error("Invalid settle delay: {0}")]
    InvalidDelay(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
