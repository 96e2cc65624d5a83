//! Domain entities for the Conversations domain
//!
//! Participant roles, message payloads and the message entity itself.
//! A message's author role and content never change after construction;
//! its visibility set is fixed from the author role unless the caller
//! explicitly tags it before appending.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use supportdesk_common::{Error, Result};

/// Participant role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Customer,
    Agent,
    Supervisor,
    /// Automated assistant talking to staff, never shown to customers
    Robot,
    /// Robot output explicitly shared with the customer
    CxRobot,
    ConversationAdmin,
    Tool,
    Admin,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Customer,
        Role::Agent,
        Role::Supervisor,
        Role::Robot,
        Role::CxRobot,
        Role::ConversationAdmin,
        Role::Tool,
        Role::Admin,
    ];

    /// Roles that see a message authored by `self` unless tagged otherwise
    pub fn default_visibility(&self) -> BTreeSet<Role> {
        let roles: &[Role] = match self {
            Role::Customer | Role::Agent | Role::CxRobot => &[
                Role::Customer,
                Role::Agent,
                Role::Supervisor,
                Role::ConversationAdmin,
            ],
            Role::Supervisor => &[Role::Supervisor, Role::ConversationAdmin],
            Role::Robot | Role::Tool => {
                &[Role::Agent, Role::Supervisor, Role::ConversationAdmin]
            }
            Role::ConversationAdmin | Role::Admin => &[Role::ConversationAdmin],
        };
        roles.iter().copied().collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Agent => "agent",
            Role::Supervisor => "supervisor",
            Role::Robot => "robot",
            Role::CxRobot => "cx-robot",
            Role::ConversationAdmin => "conversation-admin",
            Role::Tool => "tool",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("Unknown role: {}", s)))
    }
}

/// Discriminant of [`MessageContent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Json,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Text => write!(f, "text"),
            ContentKind::Image => write!(f, "image"),
            ContentKind::Json => write!(f, "json"),
        }
    }
}

/// Message payload, serialized as `{ "type": <kind>, "payload": <value> }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum MessageContent {
    Text(String),
    Image(#[serde(with = "base64_bytes")] Vec<u8>),
    Json(serde_json::Value),
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text(text.into())
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            MessageContent::Text(_) => ContentKind::Text,
            MessageContent::Image(_) => ContentKind::Image,
            MessageContent::Json(_) => ContentKind::Json,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub author_id: String,
    pub author_role: Role,
    pub content: MessageContent,
    /// Not validated; zero and negative values are carried as given
    pub estimated_token_count: i32,
    pub role_visibilities: BTreeSet<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Create a message visible to the author role's default audience
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        author_role: Role,
        content: MessageContent,
        estimated_token_count: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Message {
            id: id.into(),
            author_id: author_id.into(),
            author_role,
            content,
            estimated_token_count,
            role_visibilities: author_role.default_visibility(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the visibility set
    pub fn with_visibilities(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.role_visibilities = roles.into_iter().collect();
        self
    }

    /// Add one role to the visibility set
    pub fn visible_to(mut self, role: Role) -> Self {
        self.role_visibilities.insert(role);
        self
    }

    pub fn is_visible_to(&self, role: Role) -> bool {
        self.role_visibilities.contains(&role)
    }

    pub fn kind(&self) -> ContentKind {
        self.content.kind()
    }
}
