//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default characters-per-token ratio for token estimates
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::Configuration(format!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tracing filter directives
    pub rust_log: String,
    pub log_format: LogFormat,

    /// Characters per token used by the default token estimator
    pub chars_per_token: usize,

    /// Name given to conversations created without one
    pub default_conversation_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rust_log: "supportdesk=info".to_string(),
            log_format: LogFormat::default(),
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
            default_conversation_name: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Self::default();

        let log_format = match env::var("LOG_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.log_format,
        };

        let chars_per_token = match env::var("TOKEN_CHARS_PER_TOKEN") {
            Ok(raw) => parse_chars_per_token(&raw)?,
            Err(_) => defaults.chars_per_token,
        };

        let config = Self {
            rust_log: env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            log_format,
            chars_per_token,
            default_conversation_name: env::var("DEFAULT_CONVERSATION_NAME")
                .unwrap_or(defaults.default_conversation_name),
        };

        Ok(config)
    }
}

fn parse_chars_per_token(raw: &str) -> Result<usize> {
    let value: usize = raw.trim().parse().map_err(|_| {
        Error::Configuration(format!(
            "TOKEN_CHARS_PER_TOKEN must be a positive integer, got '{}'",
            raw
        ))
    })?;
    if value == 0 {
        return Err(Error::Configuration(
            "TOKEN_CHARS_PER_TOKEN must be at least 1".to_string(),
        ));
    }
    Ok(value)
}
