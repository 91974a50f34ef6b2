//! # xfade common library
//!
//! Shared code for the crossfade stage and its hosts:
//! - Error types
//! - Crossfade settings, TOML configuration and key/value updates
//! - Fade curve definitions and ramp calculations

pub mod config;
pub mod error;
pub mod fade_curves;

pub use config::{ConfigSource, CrossfadeSettings, LoggingConfig, TomlConfig};
pub use error::{Error, Result};
pub use fade_curves::FadeCurve;
