//! Role-scoped response DTOs
//!
//! What a transport layer renders to each party. A view only ever contains
//! the messages its role is allowed to see.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::conversation::Conversation;
use crate::domain::entities::{Message, MessageContent, Role};

/// Message response DTO
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub author_id: String,
    pub author_role: Role,
    pub content: MessageContent,
    pub estimated_token_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageResponse {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.clone(),
            author_id: m.author_id.clone(),
            author_role: m.author_role,
            content: m.content.clone(),
            estimated_token_count: m.estimated_token_count,
            created_at: m.created_at,
        }
    }
}

/// Conversation as seen by one role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub viewer_role: Role,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessageResponse>,
    /// Summarization progress is internal bookkeeping, hidden from customers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarization: Option<SummarizationResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizationResponse {
    pub last_summarized_index: Option<usize>,
    pub last_summarized_at: Option<DateTime<Utc>>,
    pub pending_messages: usize,
}

impl ConversationResponse {
    pub fn for_role(conversation: &Conversation, role: Role) -> Self {
        let messages = conversation
            .get_conversation_for_role(role)
            .into_iter()
            .map(MessageResponse::from)
            .collect();

        let summarization = (role != Role::Customer).then(|| SummarizationResponse {
            last_summarized_index: conversation.last_summarized_index(),
            last_summarized_at: conversation.last_summarized_at(),
            pending_messages: conversation.get_messages_to_summarize().len(),
        });

        Self {
            id: conversation.id().to_string(),
            name: conversation.name().to_string(),
            description: conversation.description().to_string(),
            viewer_role: role,
            created_at: conversation.created_at(),
            messages,
            summarization,
        }
    }
}
