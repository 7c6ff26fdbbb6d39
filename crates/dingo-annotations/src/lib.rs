#![allow(clippy::missing_errors_doc)]

//! Per-compilation configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },
    #[error("failed to parse configuration: {0}")]
    ParseFailure(String),
}

/// Governs the nil-safety check tier emitted around sum-type field
/// dereferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NilSafetyMode {
    Off,
    #[default]
    On,
    Debug,
}

impl NilSafetyMode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "off" => Ok(Self::Off),
            "on" => Ok(Self::On),
            "debug" => Ok(Self::Debug),
            other => Err(ConfigError::InvalidValue {
                key: "nil_safety_checks".to_string(),
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Debug => "debug",
        }
    }
}

/// Recognized and ad-hoc configuration for one compilation run.
///
/// Only `nil_safety_checks` is part of the core's contract; everything
/// else lands in `extra_flags` and is opaque to this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub nil_safety_checks: NilSafetyMode,
    pub extra_flags: HashMap<String, String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            nil_safety_checks: NilSafetyMode::On,
            extra_flags: HashMap::new(),
        }
    }

    /// Builds a `Config` from a flat string-keyed map, as a driver would
    /// produce from `--flag=value` command-line options.
    pub fn from_flags(flags: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        for (key, value) in flags {
            match key.as_str() {
                "nil_safety_checks" => {
                    config.nil_safety_checks = NilSafetyMode::parse(&value)?;
                }
                _ => {
                    config.extra_flags.insert(key, value);
                }
            }
        }
        Ok(config)
    }

    /// Parses configuration from a TOML document, e.g. a `dingo.toml`.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let value: toml::Value =
            toml::from_str(text).map_err(|e| ConfigError::ParseFailure(e.to_string()))?;
        let table = value
            .as_table()
            .ok_or_else(|| ConfigError::ParseFailure("expected a TOML table".to_string()))?;
        let mut flags = HashMap::new();
        for (key, val) in table {
            let as_str = match val {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            flags.insert(key.clone(), as_str);
        }
        Self::from_flags(flags)
    }
}
