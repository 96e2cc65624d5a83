//! Conversation aggregate
//!
//! An append-only, ordered sequence of messages for one support session,
//! with role-scoped views, robot-message sharing and a summarization
//! watermark. Position 0 is permanently the first appended message.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use supportdesk_common::{Error, Result};

use super::entities::{Message, MessageContent, Role};
use super::message_list::MessageList;
use super::providers::Providers;
use super::visibility::{self, MessageFilter};

#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    messages: MessageList<Message>,
    /// Message id to append position; the first message with an id keeps it
    positions: HashMap<String, usize>,
    last_summarized_index: Option<usize>,
    last_summarized_at: Option<DateTime<Utc>>,
    providers: Providers,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        providers: Providers,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            created_at: providers.clock.now(),
            messages: MessageList::new(providers.clone()),
            positions: HashMap::new(),
            last_summarized_index: None,
            last_summarized_at: None,
            providers,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.messages.count()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages in append order
    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator {
        self.messages.iter()
    }

    pub fn message_at(&self, index: usize) -> Option<&Message> {
        self.messages.get_at(index)
    }

    pub fn get_message(&self, id: &str) -> Option<&Message> {
        self.positions
            .get(id)
            .and_then(|&position| self.messages.get_at(position))
    }

    // ------------------------------------------------------------------
    // Appends
    // ------------------------------------------------------------------

    /// Append `message` as given
    ///
    /// Content and visibility are not checked; a robot-directed message from
    /// a role that may not interact with robots is logged and still stored.
    pub fn add_message(&mut self, message: Message) -> &Message {
        if message.is_visible_to(Role::Robot)
            && !visibility::can_interact_with_robots(message.author_role)
        {
            tracing::debug!(
                conversation_id = %self.id,
                message_id = %message.id,
                role = %message.author_role,
                "Robot-visible message from a role that cannot interact with robots"
            );
        }

        tracing::debug!(
            conversation_id = %self.id,
            message_id = %message.id,
            role = %message.author_role,
            kind = %message.kind(),
            "Appending message"
        );

        let position = self.messages.count();
        if self.positions.contains_key(&message.id) {
            tracing::debug!(
                conversation_id = %self.id,
                message_id = %message.id,
                "Duplicate message id, lookups keep the earlier message"
            );
        } else {
            self.positions.insert(message.id.clone(), position);
        }

        &self.messages.append(message).item
    }

    fn build_message(
        &self,
        id: impl Into<String>,
        author_id: impl Into<String>,
        author_role: Role,
        content: MessageContent,
        estimated_token_count: Option<i32>,
    ) -> Message {
        let tokens =
            estimated_token_count.unwrap_or_else(|| self.providers.tokens.estimate(&content));
        Message::new(
            id,
            author_id,
            author_role,
            content,
            tokens,
            self.providers.clock.now(),
        )
    }

    pub fn add_customer_message(
        &mut self,
        id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<MessageContent>,
        estimated_token_count: Option<i32>,
    ) -> &Message {
        let message = self.build_message(
            id,
            author_id,
            Role::Customer,
            content.into(),
            estimated_token_count,
        );
        self.add_message(message)
    }

    pub fn add_agent_message(
        &mut self,
        id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<MessageContent>,
        estimated_token_count: Option<i32>,
    ) -> &Message {
        let message = self.build_message(
            id,
            author_id,
            Role::Agent,
            content.into(),
            estimated_token_count,
        );
        self.add_message(message)
    }

    pub fn add_robot_message(
        &mut self,
        id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<MessageContent>,
        estimated_token_count: Option<i32>,
    ) -> &Message {
        let message = self.build_message(
            id,
            author_id,
            Role::Robot,
            content.into(),
            estimated_token_count,
        );
        self.add_message(message)
    }

    pub fn add_supervisor_message(
        &mut self,
        id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<MessageContent>,
        estimated_token_count: Option<i32>,
    ) -> &Message {
        let message = self.build_message(
            id,
            author_id,
            Role::Supervisor,
            content.into(),
            estimated_token_count,
        );
        self.add_message(message)
    }

    /// Append a robot message already cleared for the customer
    pub fn add_shared_robot_message(
        &mut self,
        id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<MessageContent>,
        estimated_token_count: Option<i32>,
    ) -> &Message {
        let message = self.build_message(
            id,
            author_id,
            Role::CxRobot,
            content.into(),
            estimated_token_count,
        );
        self.add_message(message)
    }

    // ------------------------------------------------------------------
    // Sharing
    // ------------------------------------------------------------------

    /// Append a customer-visible copy of a robot message
    ///
    /// The original is left untouched. Fails with `InvalidOperation` if
    /// `original` was not authored by a robot; nothing is appended then.
    pub fn share_robot_message_with_customer(
        &mut self,
        original: &Message,
        new_id: impl Into<String>,
    ) -> Result<&Message> {
        self.share_robot_content(original, new_id.into(), original.content.clone())
    }

    /// Like [`Self::share_robot_message_with_customer`], but the customer sees
    /// `edited_content` instead of the robot's original wording
    pub fn share_edited_robot_message(
        &mut self,
        original: &Message,
        new_id: impl Into<String>,
        edited_content: impl Into<MessageContent>,
    ) -> Result<&Message> {
        self.share_robot_content(original, new_id.into(), edited_content.into())
    }

    /// Share a stored robot message looked up by id
    pub fn share_robot_message_by_id(
        &mut self,
        original_id: &str,
        new_id: impl Into<String>,
    ) -> Result<&Message> {
        let original = self
            .get_message(original_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Message {} not found", original_id)))?;
        self.share_robot_message_with_customer(&original, new_id)
    }

    fn share_robot_content(
        &mut self,
        original: &Message,
        new_id: String,
        content: MessageContent,
    ) -> Result<&Message> {
        if original.author_role != Role::Robot {
            tracing::warn!(
                conversation_id = %self.id,
                message_id = %original.id,
                role = %original.author_role,
                "Refusing to share a non-robot message"
            );
            return Err(Error::InvalidOperation(
                "can only share robot messages".to_string(),
            ));
        }

        let estimated_token_count = if content == original.content {
            original.estimated_token_count
        } else {
            self.providers.tokens.estimate(&content)
        };

        let shared = Message::new(
            new_id,
            original.author_id.clone(),
            Role::CxRobot,
            content,
            estimated_token_count,
            self.providers.clock.now(),
        );

        tracing::info!(
            conversation_id = %self.id,
            original_id = %original.id,
            shared_id = %shared.id,
            "Sharing robot message with customer"
        );

        Ok(self.add_message(shared))
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Last appended message, by append order
    pub fn get_most_recent_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get_customer_visible_messages(&self) -> Vec<&Message> {
        self.visible_to(Role::Customer)
    }

    pub fn get_agent_visible_messages(&self) -> Vec<&Message> {
        self.visible_to(Role::Agent)
    }

    pub fn get_supervisor_visible_messages(&self) -> Vec<&Message> {
        self.visible_to(Role::Supervisor)
    }

    pub fn get_admin_visible_messages(&self) -> Vec<&Message> {
        self.visible_to(Role::ConversationAdmin)
    }

    /// Messages `role` may see, in append order
    pub fn get_conversation_for_role(&self, role: Role) -> Vec<&Message> {
        match role {
            Role::Customer => self.get_customer_visible_messages(),
            Role::Agent => self.get_agent_visible_messages(),
            Role::Supervisor => self.get_supervisor_visible_messages(),
            Role::ConversationAdmin => self.get_admin_visible_messages(),
            other => self.filter_by_role_visibilities(&[other]),
        }
    }

    /// Messages visible to at least one of `roles`
    pub fn filter_by_role_visibilities(&self, roles: &[Role]) -> Vec<&Message> {
        self.messages()
            .filter(|message| roles.iter().any(|&role| message.is_visible_to(role)))
            .collect()
    }

    pub fn filter(&self, filter: &MessageFilter) -> Vec<&Message> {
        self.messages()
            .filter(|message| filter.matches(message))
            .collect()
    }

    pub fn messages_by_author(&self, author_id: &str) -> Vec<&Message> {
        self.filter(&MessageFilter::new().author_id(author_id))
    }

    fn visible_to(&self, role: Role) -> Vec<&Message> {
        self.messages()
            .filter(|message| visibility::visible_to(message, role))
            .collect()
    }

    pub fn get_messages_for_robot_processing(&self) -> Vec<&Message> {
        visibility::messages_for_automated_processing(self.messages())
    }

    pub fn calculate_total_token_count_for_robot(&self) -> i64 {
        visibility::total_estimated_tokens(self.get_messages_for_robot_processing())
    }

    // ------------------------------------------------------------------
    // Summarization watermark
    // ------------------------------------------------------------------

    /// `None` until something has been summarized
    pub fn last_summarized_index(&self) -> Option<usize> {
        self.last_summarized_index
    }

    pub fn last_summarized_at(&self) -> Option<DateTime<Utc>> {
        self.last_summarized_at
    }

    /// Messages after the watermark
    pub fn get_messages_to_summarize(&self) -> Vec<&Message> {
        let start = self.last_summarized_index.map_or(0, |index| index + 1);
        self.messages().skip(start).collect()
    }

    /// Move the watermark to `index`
    ///
    /// Out-of-range indices and indices behind the current watermark are
    /// ignored. Returns whether the watermark was updated.
    pub fn mark_summarized_up_to(&mut self, index: usize) -> bool {
        if index >= self.len() {
            tracing::debug!(
                conversation_id = %self.id,
                index,
                len = self.len(),
                "Ignoring out-of-range summarization index"
            );
            return false;
        }
        if self.last_summarized_index.is_some_and(|current| index < current) {
            tracing::debug!(
                conversation_id = %self.id,
                index,
                current = ?self.last_summarized_index,
                "Ignoring summarization index behind the watermark"
            );
            return false;
        }

        self.last_summarized_index = Some(index);
        self.last_summarized_at = Some(self.providers.clock.now());
        true
    }

    /// Move the watermark to the last message; no-op when empty
    pub fn mark_all_as_summarized(&mut self) -> bool {
        match self.len().checked_sub(1) {
            Some(last) => self.mark_summarized_up_to(last),
            None => false,
        }
    }
}
