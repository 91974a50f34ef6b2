//! Crossfade settings and configuration file loading
//!
//! Settings reach the crossfade stage from two places:
//! 1. A TOML file (`[crossfade]` and `[logging]` tables)
//! 2. Individual key/value updates, as a preferences store would issue them
//!
//! Both paths clamp values to the ranges the preferences surface allows.
//! The crossfade stage itself never clamps: it trusts whatever settings it
//! is handed, so a zero overlap simply degenerates to pass-through.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "XFADE_CONFIG";

/// Keys recognized by [`CrossfadeSettings::set`] and [`CrossfadeSettings::get`]
pub const KEYS: &[&str] = &[
    "automatic",
    "length",
    "manual",
    "manual_length",
    "no_fade_in",
    "use_sigmoid",
    "sigmoid_steepness",
];

/// Allowed range for the automatic overlap, in seconds
pub const LENGTH_RANGE: (f64, f64) = (1.0, 15.0);

/// Allowed range for the manual overlap, in seconds
pub const MANUAL_LENGTH_RANGE: (f64, f64) = (0.1, 3.0);

/// Allowed range for the S-curve steepness
pub const STEEPNESS_RANGE: (f64, f64) = (2.0, 16.0);

/// Crossfade options, read by the effect on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossfadeSettings {
    /// Crossfade on automatic track change
    pub automatic: bool,

    /// Automatic overlap in seconds
    pub length: f64,

    /// Crossfade on seek or manual track change
    pub manual: bool,

    /// Manual overlap in seconds
    pub manual_length: f64,

    /// Mix the incoming audio in at full gain instead of ramping it up
    pub no_fade_in: bool,

    /// Use the S-curve instead of a straight ramp
    pub use_sigmoid: bool,

    /// S-curve steepness (higher is steeper)
    pub sigmoid_steepness: f64,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            automatic: true,
            length: 5.0,
            manual: true,
            manual_length: 0.2,
            no_fade_in: false,
            use_sigmoid: false,
            sigmoid_steepness: 6.0,
        }
    }
}

impl CrossfadeSettings {
    /// Settings with both overlap features disabled (pure pass-through)
    pub fn disabled() -> Self {
        Self {
            automatic: false,
            manual: false,
            ..Self::default()
        }
    }

    /// Copy of these settings with every numeric field clamped to its range
    ///
    /// Non-finite values are replaced by the default for that field.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            length: clamp_or(self.length, LENGTH_RANGE, defaults.length),
            manual_length: clamp_or(self.manual_length, MANUAL_LENGTH_RANGE, defaults.manual_length),
            sigmoid_steepness: clamp_or(
                self.sigmoid_steepness,
                STEEPNESS_RANGE,
                defaults.sigmoid_steepness,
            ),
            ..self.clone()
        }
    }

    /// Update one setting from its string form
    ///
    /// Numeric values are clamped to their allowed range.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "automatic" => self.automatic = parse_bool(key, value)?,
            "manual" => self.manual = parse_bool(key, value)?,
            "no_fade_in" => self.no_fade_in = parse_bool(key, value)?,
            "use_sigmoid" => self.use_sigmoid = parse_bool(key, value)?,
            "length" => {
                self.length = clamp_or(parse_float(key, value)?, LENGTH_RANGE, self.length)
            }
            "manual_length" => {
                self.manual_length =
                    clamp_or(parse_float(key, value)?, MANUAL_LENGTH_RANGE, self.manual_length)
            }
            "sigmoid_steepness" => {
                self.sigmoid_steepness = clamp_or(
                    parse_float(key, value)?,
                    STEEPNESS_RANGE,
                    self.sigmoid_steepness,
                )
            }
            _ => return Err(Error::UnknownSetting(key.to_string())),
        }

        debug!("Crossfade setting {} = {}", key, value);
        Ok(())
    }

    /// Current value of one setting in string form
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "automatic" => self.automatic.to_string(),
            "length" => self.length.to_string(),
            "manual" => self.manual.to_string(),
            "manual_length" => self.manual_length.to_string(),
            "no_fade_in" => self.no_fade_in.to_string(),
            "use_sigmoid" => self.use_sigmoid.to_string(),
            "sigmoid_steepness" => self.sigmoid_steepness.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Contents of the TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub crossfade: CrossfadeSettings,
    pub logging: LoggingConfig,
}

/// Parse a TOML document into a configuration with clamped settings
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    let mut config: TomlConfig =
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
    config.crossfade = config.crossfade.clamped();
    Ok(config)
}

/// Load and parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_toml_config(&content).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Resolve the configuration file path
///
/// Priority order:
/// 1. Explicit path (command line)
/// 2. `XFADE_CONFIG` environment variable
/// 3. `<config dir>/xfade/config.toml`
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("xfade").join("config.toml"))
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),

    /// This file was looked for but does not exist; defaults are in use
    Missing(PathBuf),

    /// No path could be resolved; defaults are in use
    NoConfigDir,
}

impl ConfigSource {
    /// Warning to report when defaults stand in for a config file
    pub fn fallback_notice(&self) -> Option<String> {
        match self {
            ConfigSource::File(_) => None,
            ConfigSource::Missing(path) => Some(format!(
                "Config file {} not found, using defaults",
                path.display()
            )),
            ConfigSource::NoConfigDir => {
                Some("No configuration directory available, using defaults".to_string())
            }
        }
    }
}

/// Load configuration and report where it came from
///
/// Nothing is logged, so callers can load before installing a subscriber
/// and report the [`ConfigSource`] afterwards. A file that exists but
/// cannot be parsed is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let Some(path) = resolve_config_path(explicit) else {
        return Ok((TomlConfig::default(), ConfigSource::NoConfigDir));
    };

    if !path.exists() {
        return Ok((TomlConfig::default(), ConfigSource::Missing(path)));
    }

    let config = load_toml_config(&path)?;
    Ok((config, ConfigSource::File(path)))
}

/// Load configuration, falling back to built-in defaults
///
/// A missing file is not an error: a warning is logged and defaults are
/// used. A file that exists but cannot be parsed is an error.
pub fn load_or_default(explicit: Option<&Path>) -> Result<TomlConfig> {
    let (config, source) = load_config(explicit)?;
    match source.fallback_notice() {
        Some(notice) => warn!("{}", notice),
        None => debug!("Loaded config from {:?}", source),
    }
    Ok(config)
}

fn clamp_or(value: f64, (min, max): (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(Error::InvalidInput(format!(
            "{}: expected a boolean, got '{}'",
            key, other
        ))),
    }
}

fn parse_float(key: &str, value: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| {
        Error::InvalidInput(format!("{}: expected a number, got '{}'", key, value.trim()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CrossfadeSettings::default();
        assert!(settings.automatic);
        assert_eq!(settings.length, 5.0);
        assert!(settings.manual);
        assert_eq!(settings.manual_length, 0.2);
        assert!(!settings.no_fade_in);
        assert!(!settings.use_sigmoid);
        assert_eq!(settings.sigmoid_steepness, 6.0);
    }

    #[test]
    fn test_clamped() {
        let settings = CrossfadeSettings {
            length: 60.0,
            manual_length: 0.0,
            sigmoid_steepness: f64::NAN,
            ..CrossfadeSettings::default()
        }
        .clamped();

        assert_eq!(settings.length, 15.0);
        assert_eq!(settings.manual_length, 0.1);
        assert_eq!(settings.sigmoid_steepness, 6.0);
    }

    #[test]
    fn test_set_and_get() {
        let mut settings = CrossfadeSettings::default();

        settings.set("automatic", "false").unwrap();
        settings.set("use_sigmoid", "YES").unwrap();
        settings.set("manual_length", "0.5").unwrap();
        settings.set("length", "100").unwrap();

        assert!(!settings.automatic);
        assert!(settings.use_sigmoid);
        assert_eq!(settings.get("manual_length").as_deref(), Some("0.5"));
        assert_eq!(settings.length, 15.0);
        assert_eq!(settings.get("bogus"), None);
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut settings = CrossfadeSettings::default();

        assert!(matches!(
            settings.set("volume", "1"),
            Err(Error::UnknownSetting(_))
        ));
        assert!(matches!(
            settings.set("manual", "maybe"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            settings.set("length", "five"),
            Err(Error::InvalidInput(_))
        ));

        // Failed updates leave the settings untouched
        assert_eq!(settings, CrossfadeSettings::default());
    }

    #[test]
    fn test_every_key_round_trips_through_get() {
        let settings = CrossfadeSettings::default();
        for key in KEYS {
            let value = settings.get(key).expect("key should be readable");
            let mut copy = settings.clone();
            copy.set(key, &value).unwrap();
            assert_eq!(copy, settings, "key {}", key);
        }
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = parse_toml_config(
            r#"
            [crossfade]
            automatic = false
            manual_length = 9.0
            "#,
        )
        .unwrap();

        assert!(!config.crossfade.automatic);
        assert_eq!(config.crossfade.manual_length, 3.0);
        assert_eq!(config.crossfade.length, 5.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(matches!(
            parse_toml_config("[crossfade]\nlength = \"long\""),
            Err(Error::Config(_))
        ));
    }
}
