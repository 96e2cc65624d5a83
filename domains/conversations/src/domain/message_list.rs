//! Generic envelope store
//!
//! Wraps arbitrary items in an [`Envelope`] carrying a generated id and the
//! insertion timestamp. Items are kept in insertion order; timestamp-based
//! queries fall back to insertion position when timestamps collide, so the
//! later insert counts as newer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::providers::Providers;

/// Fresh ids requested from the generator before falling back to a suffixed id
const MAX_ID_RETRIES: usize = 8;

/// Stored wrapper around an item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub id: String,
    pub inserted_at: DateTime<Utc>,
    pub item: T,
}

#[derive(Debug, Clone)]
pub struct MessageList<T> {
    providers: Providers,
    envelopes: Vec<Envelope<T>>,
    positions: HashMap<String, usize>,
}

impl<T> MessageList<T> {
    pub fn new(providers: Providers) -> Self {
        Self {
            providers,
            envelopes: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Store `item` under a freshly generated id and return that id
    pub fn add(&mut self, item: T) -> String {
        self.append(item).id.clone()
    }

    /// Store `item` and return its envelope
    pub fn append(&mut self, item: T) -> &Envelope<T> {
        let id = self.unique_id();
        let envelope = Envelope {
            id: id.clone(),
            inserted_at: self.providers.clock.now(),
            item,
        };
        let position = self.envelopes.len();
        self.positions.insert(id, position);
        self.envelopes.push(envelope);
        &self.envelopes[position]
    }

    /// Generated id not yet in use
    ///
    /// Duplicates are regenerated up to [`MAX_ID_RETRIES`] times, then the last
    /// candidate gets a `-{position}` suffix, bumped until it is free.
    fn unique_id(&self) -> String {
        let mut id = self.providers.ids.generate();
        for _ in 0..MAX_ID_RETRIES {
            if !self.positions.contains_key(&id) {
                return id;
            }
            tracing::warn!(envelope_id = %id, "Id generator produced a duplicate, regenerating");
            id = self.providers.ids.generate();
        }
        if !self.positions.contains_key(&id) {
            return id;
        }

        let mut suffix = self.envelopes.len();
        let mut candidate = format!("{}-{}", id, suffix);
        while self.positions.contains_key(&candidate) {
            suffix += 1;
            candidate = format!("{}-{}", id, suffix);
        }
        tracing::warn!(
            envelope_id = %candidate,
            retries = MAX_ID_RETRIES,
            "Id generator kept producing duplicates, using suffixed id"
        );
        candidate
    }

    pub fn get_by_id(&self, id: &str) -> Option<&T> {
        self.envelope(id).map(|envelope| &envelope.item)
    }

    pub fn envelope(&self, id: &str) -> Option<&Envelope<T>> {
        self.positions
            .get(id)
            .and_then(|&position| self.envelopes.get(position))
    }

    pub fn has(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn count(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// Items ordered by descending insertion time
    pub fn newest_first(&self) -> Vec<&T> {
        let mut ordered: Vec<&Envelope<T>> = self.envelopes.iter().rev().collect();
        // Stable sort keeps the reversed insertion order for equal timestamps
        ordered.sort_by(|a, b| b.inserted_at.cmp(&a.inserted_at));
        ordered.into_iter().map(|envelope| &envelope.item).collect()
    }

    /// Item with the earliest insertion time
    pub fn oldest(&self) -> Option<&T> {
        // min_by_key returns the first minimum, i.e. the earliest insert on ties
        self.envelopes
            .iter()
            .min_by_key(|envelope| envelope.inserted_at)
            .map(|envelope| &envelope.item)
    }

    /// Items in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.envelopes.iter().map(|envelope| &envelope.item)
    }

    pub fn envelopes(&self) -> &[Envelope<T>] {
        &self.envelopes
    }

    pub fn get_at(&self, position: usize) -> Option<&T> {
        self.envelopes.get(position).map(|envelope| &envelope.item)
    }

    pub fn last(&self) -> Option<&T> {
        self.envelopes.last().map(|envelope| &envelope.item)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let Some(position) = self.positions.remove(id) else {
            return false;
        };
        self.envelopes.remove(position);
        for (offset, envelope) in self.envelopes.iter().enumerate().skip(position) {
            self.positions.insert(envelope.id.clone(), offset);
        }
        true
    }

    pub fn clear(&mut self) {
        self.envelopes.clear();
        self.positions.clear();
    }
}

impl<T> Default for MessageList<T> {
    fn default() -> Self {
        Self::new(Providers::default())
    }
}
