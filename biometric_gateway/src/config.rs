//! Environment helpers shared by the ceremony and gateway configuration structs
//!
//! Every setting is read once, when the application is wired together. Values that
//! cannot be parsed are logged and replaced by the default; values that parse but are
//! out of range are rejected by the individual config constructors.

use std::str::FromStr;

use thiserror::Error;

/// Errors raised while building a configuration value
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("{0} must be set")]
    Missing(String),

    /// A value was supplied but is not acceptable
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Reads and parses an environment variable.
///
/// Returns `None` when the variable is unset or when it cannot be parsed; the latter
/// is logged so that a typo does not silently change behavior.
pub(crate) fn env_value<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Invalid {}: {}. Using default", name, raw);
            None
        }
    }
}

/// Reads a comma separated list, dropping empty items
pub(crate) fn env_list(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|raw| split_list(&raw))
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads an on/off style switch
pub(crate) fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name).ok() {
        None => default,
        Some(v) => match v.to_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => true,
            "0" | "false" | "off" | "no" => false,
            invalid => {
                tracing::warn!("Invalid {}: {}. Using default '{}'", name, invalid, default);
                default
            }
        },
    }
}
