//! Error types for Pratikriya
//!
//! The behavior state machines are total functions of (state, elapsed time,
//! sensor booleans) and never fail. Errors only come from loading
//! configuration and bringing up the obstruction sensor.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Pratikriya error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Obstruction sensor failed to start
    #[error("Sensor error: {0}")]
    Sensor(String),
}
