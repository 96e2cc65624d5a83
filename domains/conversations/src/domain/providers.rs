//! External collaborators consumed by the conversations domain
//!
//! Identifier generation, wall-clock time and token estimation are injected
//! so the host application (and tests) can swap them out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use supportdesk_common::config::{Config, DEFAULT_CHARS_PER_TOKEN};
use uuid::Uuid;

use super::entities::MessageContent;

/// Produces globally unique identifiers
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Produces non-decreasing timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Estimates the token footprint of a message payload
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, content: &MessageContent) -> i32;
}

/// UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `ceil(chars / chars_per_token)` over textual payloads
///
/// JSON payloads are measured on their compact serialization. Binary
/// payloads are not textual and estimate to zero.
#[derive(Debug, Clone, Copy)]
pub struct CharRatioEstimator {
    chars_per_token: usize,
}

impl CharRatioEstimator {
    /// A ratio of zero is clamped to one
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }

    fn estimate_chars(&self, chars: usize) -> i32 {
        let tokens = chars.div_ceil(self.chars_per_token);
        i32::try_from(tokens).unwrap_or(i32::MAX)
    }
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_CHARS_PER_TOKEN)
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, content: &MessageContent) -> i32 {
        match content {
            MessageContent::Text(text) => self.estimate_chars(text.chars().count()),
            MessageContent::Json(value) => self.estimate_chars(value.to_string().chars().count()),
            MessageContent::Image(_) => 0,
        }
    }
}

/// Bundle of collaborators shared by message lists, conversations and the registry
#[derive(Clone)]
pub struct Providers {
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn Clock>,
    pub tokens: Arc<dyn TokenEstimator>,
}

impl Providers {
    pub fn new(
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenEstimator>,
    ) -> Self {
        Self { ids, clock, tokens }
    }

    /// Default collaborators tuned by the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            tokens: Arc::new(CharRatioEstimator::new(config.chars_per_token)),
            ..Self::default()
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenEstimator>) -> Self {
        self.tokens = tokens;
        self
    }
}

impl Default for Providers {
    fn default() -> Self {
        Self {
            ids: Arc::new(UuidIdGenerator),
            clock: Arc::new(SystemClock),
            tokens: Arc::new(CharRatioEstimator::default()),
        }
    }
}

impl std::fmt::Debug for Providers {
    #[mutants::skip] // Debug output only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}
