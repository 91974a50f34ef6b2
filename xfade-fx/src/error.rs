//! Error types for xfade-fx
//!
//! The crossfade stage itself is infallible; these errors come from the
//! playlist host and its WAV input/output.

use thiserror::Error;

/// Main error type for xfade-fx
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors from the common crate
    #[error(transparent)]
    Common(#[from] xfade_common::Error),

    /// WAV decoding or encoding errors
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Input the host cannot feed to an effect
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Sink received audio in a different format than it was opened with
    #[error("Format change mid-stream: {0}")]
    FormatChange(String),
}

/// Convenience Result type using xfade-fx Error
pub type Result<T> = std::result::Result<T, Error>;
