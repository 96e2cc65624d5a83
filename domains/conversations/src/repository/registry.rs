//! In-memory conversation registry
//!
//! Conversations are ephemeral: they live for the lifetime of the registry
//! and are never persisted. The map is guarded by an `RwLock` so get-or-create
//! is atomic, and each conversation sits behind its own `Mutex` so appends to
//! one conversation never reorder.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::domain::conversation::Conversation;
use crate::domain::providers::Providers;

/// Handle to a registered conversation
pub type SharedConversation = Arc<Mutex<Conversation>>;

/// Builds a conversation from `(id, name, description)`
///
/// Runs while the registry write lock is held, so it must not call back into
/// the registry; `parking_lot` locks are not reentrant and it would deadlock.
pub type ConversationFactory = Box<dyn Fn(&str, &str, &str) -> Conversation + Send + Sync>;

pub struct ConversationRegistry {
    conversations: RwLock<HashMap<String, SharedConversation>>,
    factory: ConversationFactory,
    default_name: String,
}

impl ConversationRegistry {
    pub fn new(factory: ConversationFactory) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            factory,
            default_name: String::new(),
        }
    }

    /// Registry whose conversations share `providers`
    pub fn with_providers(providers: Providers) -> Self {
        Self::new(Box::new(move |id, name, description| {
            Conversation::new(id, name, description, providers.clone())
        }))
    }

    /// Name used when `get_or_create` is called without one
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Existing conversation for `id`, or a newly built one
    ///
    /// `name` and `description` only apply on creation; the first caller wins.
    pub fn get_or_create(
        &self,
        id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> SharedConversation {
        if let Some(existing) = self.get_by_id(id) {
            return existing;
        }

        let mut conversations = self.conversations.write();
        // Another caller may have created it between the read and write locks
        if let Some(existing) = conversations.get(id) {
            return Arc::clone(existing);
        }

        let name = name.unwrap_or(&self.default_name);
        let conversation = (self.factory)(id, name, description.unwrap_or_default());
        let shared = Arc::new(Mutex::new(conversation));
        conversations.insert(id.to_string(), Arc::clone(&shared));

        tracing::debug!(conversation_id = %id, name = %name, "Created conversation");
        shared
    }

    pub fn get_by_id(&self, id: &str) -> Option<SharedConversation> {
        self.conversations.read().get(id).cloned()
    }

    pub fn has(&self, id: &str) -> bool {
        self.conversations.read().contains_key(id)
    }

    pub fn remove(&self, id: &str) -> bool {
        let removed = self.conversations.write().remove(id).is_some();
        if removed {
            tracing::debug!(conversation_id = %id, "Removed conversation");
        }
        removed
    }

    pub fn all(&self) -> Vec<SharedConversation> {
        self.conversations.read().values().cloned().collect()
    }

    pub fn all_ids(&self) -> Vec<String> {
        self.conversations.read().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.conversations.read().len()
    }

    pub fn clear(&self) {
        let mut conversations = self.conversations.write();
        let dropped = conversations.len();
        conversations.clear();
        tracing::debug!(dropped, "Cleared conversation registry");
    }
}

impl Default for ConversationRegistry {
    fn default() -> Self {
        Self::with_providers(Providers::default())
    }
}

impl std::fmt::Debug for ConversationRegistry {
    #[mutants::skip] // Debug output only
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationRegistry")
            .field("count", &self.count())
            .field("default_name", &self.default_name)
            .finish_non_exhaustive()
    }
}
