//! Role-visibility model
//!
//! Pure functions deciding which messages a role may see and which messages
//! are handed to an automated assistant as context.

use serde::{Deserialize, Serialize};

use super::entities::{ContentKind, Message, Role};

/// Whether `message` may be shown to `role`
pub fn visible_to(message: &Message, role: Role) -> bool {
    message.is_visible_to(role)
}

/// Roles allowed to address a robot
///
/// Advisory only: appends are never rejected on this basis.
pub fn can_interact_with_robots(role: Role) -> bool {
    matches!(
        role,
        Role::Agent | Role::Supervisor | Role::ConversationAdmin
    )
}

/// Whether `message` belongs in an automated assistant's context
pub fn is_for_automated_processing(message: &Message) -> bool {
    message.author_role == Role::Robot
        || message.is_visible_to(Role::Robot)
        || can_interact_with_robots(message.author_role)
}

/// Messages an automated assistant should receive, in input order
pub fn messages_for_automated_processing<'a, I>(messages: I) -> Vec<&'a Message>
where
    I: IntoIterator<Item = &'a Message>,
{
    messages
        .into_iter()
        .filter(|message| is_for_automated_processing(message))
        .collect()
}

/// Sum of the per-message token estimates
pub fn total_estimated_tokens<'a, I>(messages: I) -> i64
where
    I: IntoIterator<Item = &'a Message>,
{
    messages
        .into_iter()
        .map(|message| i64::from(message.estimated_token_count))
        .sum()
}

/// Message selection criteria; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageFilter {
    pub author_role: Option<Role>,
    pub author_id: Option<String>,
    pub content_kind: Option<ContentKind>,
    pub visible_to: Option<Role>,
}

impl MessageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn author_role(mut self, role: Role) -> Self {
        self.author_role = Some(role);
        self
    }

    pub fn author_id(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    pub fn content_kind(mut self, kind: ContentKind) -> Self {
        self.content_kind = Some(kind);
        self
    }

    pub fn visible_to(mut self, role: Role) -> Self {
        self.visible_to = Some(role);
        self
    }

    pub fn matches(&self, message: &Message) -> bool {
        self.author_role
            .map_or(true, |role| message.author_role == role)
            && self
                .author_id
                .as_deref()
                .map_or(true, |id| message.author_id == id)
            && self
                .content_kind
                .map_or(true, |kind| message.kind() == kind)
            && self
                .visible_to
                .map_or(true, |role| message.is_visible_to(role))
    }
}
