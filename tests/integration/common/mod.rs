//! Common test utilities and fixtures for integration tests

use std::sync::{Arc, Once};

use supportdesk_common::Config;
use supportdesk_conversations::mock::{ManualClock, SequentialIdGenerator};
use supportdesk_conversations::{ConversationRegistry, Message, Providers};

static INIT: Once = Once::new();

/// Load test environment variables once per process
pub fn test_config() -> Config {
    INIT.call_once(|| {
        dotenvy::from_filename(".env.test").ok();
    });
    Config::from_env().unwrap_or_default()
}

/// Registry wired to deterministic collaborators
#[allow(dead_code)]
pub struct TestApp {
    pub registry: Arc<ConversationRegistry>,
    pub clock: Arc<ManualClock>,
    pub providers: Providers,
}

impl TestApp {
    pub fn new() -> Self {
        let config = test_config();
        let clock = Arc::new(ManualClock::epoch());
        let providers = Providers::from_config(&config)
            .with_ids(Arc::new(SequentialIdGenerator::new("env")))
            .with_clock(clock.clone());
        let registry = Arc::new(
            ConversationRegistry::with_providers(providers.clone())
                .with_default_name(config.default_conversation_name),
        );

        Self {
            registry,
            clock,
            providers,
        }
    }
}

/// Message ids in the given order
#[allow(dead_code)]
pub fn ids(messages: &[&Message]) -> Vec<String> {
    messages.iter().map(|m| m.id.clone()).collect()
}
