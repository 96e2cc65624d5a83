//! Conversations domain: role-scoped support chat messages, sharing and summarization bookkeeping

pub mod api;
pub mod domain;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::conversation::Conversation;
pub use domain::entities::{ContentKind, Message, MessageContent, Role};
pub use domain::message_list::{Envelope, MessageList};
pub use domain::providers::{
    CharRatioEstimator, Clock, IdGenerator, Providers, SystemClock, TokenEstimator,
    UuidIdGenerator,
};
pub use domain::visibility::MessageFilter;

// Re-export repository types
pub use repository::{ConversationFactory, ConversationRegistry, SharedConversation};

// Re-export API types
pub use api::{ConversationResponse, MessageResponse};
