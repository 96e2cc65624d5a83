//! In-memory storage for the Conversations domain

pub mod registry;

pub use registry::{ConversationFactory, ConversationRegistry, SharedConversation};
