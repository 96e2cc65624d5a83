//! Conversations domain layer: entities, visibility rules, the conversation aggregate

pub mod conversation;
pub mod entities;
pub mod message_list;
pub mod providers;
pub mod visibility;
