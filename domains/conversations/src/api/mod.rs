//! Boundary types handed to the transport layer

pub mod views;

pub use views::{ConversationResponse, MessageResponse, SummarizationResponse};
