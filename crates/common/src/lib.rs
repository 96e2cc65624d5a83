//! Shared utilities, configuration, and error handling for Supportdesk
//!
//! This crate provides common functionality used across the Supportdesk crates:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{Config, LogFormat};
pub use error::{Error, Result};
pub use telemetry::init_tracing;
