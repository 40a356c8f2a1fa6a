//! Errors surfaced while loading or writing the config file.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The platform provides no config directory, e.g. a stripped container.
    #[error("Config directory not found")]
    NoConfigDir,
}

pub type ConfigResult<T> = Result<T, ConfigError>;
