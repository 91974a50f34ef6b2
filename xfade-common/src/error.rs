//! Common error types for xfade

use thiserror::Error;

/// Common result type for xfade operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the fallible edges of the crossfade stack
///
/// The crossfade stage itself never fails; these cover configuration
/// loading and updates made on its behalf.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key not recognized by the crossfade settings store
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// Value could not be parsed for the given setting
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
