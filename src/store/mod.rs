//! In-memory chat storage.
//!
//! - [`types`] - Chat, message and collection types shared with the host API
//! - [`chats`] - [`ChatStore`], the single owner of the loaded chat buckets

mod chats;
mod types;

pub use chats::ChatStore;
pub use types::{Chat, ChatCollections, ChatId, Message, MessageId, Reaction};
