//! Host data API.
//!
//! The host owns the real chat data; this crate only consumes it through
//! [`HostApi`]. The bundled [`FixtureHost`] serves data from a JSON file or
//! built-in seed data so the client runs on its own.

mod fixture;

use crate::store::{Chat, ChatId, Message, MessageId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::watch;

pub use fixture::{FixtureError, FixtureHost};

#[derive(Debug, Error)]
pub enum HostError {
    /// The host API has not finished starting up.
    #[error("Host API is not available")]
    Unavailable,

    /// A host call rejected or reported failure.
    #[error("Host call '{call}' failed: {message}")]
    Call { call: &'static str, message: String },

    #[error("Invalid host payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// `{ok, error?}` result shape returned by host actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }

    /// Turn `ok == false` into a [`HostError::Call`].
    pub fn into_result(self, call: &'static str) -> Result<(), HostError> {
        if self.ok {
            Ok(())
        } else {
            Err(HostError::Call {
                call,
                message: self.error.unwrap_or_else(|| "Unknown error".to_string()),
            })
        }
    }
}

/// Asynchronous host data API.
///
/// Collection getters return an empty collection when the host has nothing.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Whether the host can serve calls yet.
    fn is_ready(&self) -> bool;

    /// Push notification of readiness. Hosts without one are polled via
    /// [`HostApi::is_ready`].
    fn ready_signal(&self) -> Option<watch::Receiver<bool>> {
        None
    }

    async fn get_direct_messages(&self) -> Result<Vec<Chat>, HostError>;

    async fn get_categorized_chats(&self) -> Result<HashMap<String, Vec<Chat>>, HostError>;

    async fn get_uncategorized_chats(&self) -> Result<Vec<Chat>, HostError>;

    async fn get_unread_chats(&self) -> Result<Vec<Chat>, HostError>;

    async fn get_categories(&self) -> Result<Vec<String>, HostError>;

    async fn get_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, HostError> {
        let _ = chat_id;
        Ok(Vec::new())
    }

    async fn mark_chat_as_read(&self, chat_id: &ChatId) -> Result<ActionResponse, HostError>;

    async fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        user_id: Option<&str>,
    ) -> Result<ActionResponse, HostError>;

    async fn delete_message(&self, message_id: &MessageId) -> Result<ActionResponse, HostError>;
}
