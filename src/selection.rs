//! Selection state and the controller that changes it.
//!
//! The controller is the only writer of `selected_chat_id`. Every successful
//! selection or nickname change is announced as a [`ChatEvent`] so the header
//! and message pane can rebuild themselves without reaching into the sidebar.

use crate::sidebar::SectionId;
use crate::store::{ChatId, ChatStore};
use std::collections::HashSet;
use tokio::sync::mpsc;

/// Interaction state that lives next to the store. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub selected_chat_id: Option<ChatId>,
    pub search_term: String,
    pub collapsed_sections: HashSet<SectionId>,
}

impl SelectionState {
    pub fn is_collapsed(&self, id: &SectionId) -> bool {
        self.collapsed_sections.contains(id)
    }

    /// Flip a section between collapsed and expanded. Returns the new collapsed state.
    pub fn toggle_collapsed(&mut self, id: &SectionId) -> bool {
        if self.collapsed_sections.remove(id) {
            false
        } else {
            self.collapsed_sections.insert(id.clone());
            true
        }
    }

    pub fn is_selected(&self, id: &ChatId) -> bool {
        self.selected_chat_id.as_ref() == Some(id)
    }
}

/// Payload of a selection-changed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSelected {
    pub chat_id: ChatId,
    pub chat_name: String,
    pub is_online: bool,
}

/// Payload of a nickname change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatNickname {
    pub chat_id: ChatId,
    pub chat_name: String,
    pub new_name: String,
}

/// Notifications for collaborators outside the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Selected(ChatSelected),
    Nickname(ChatNickname),
}

pub struct SelectionController {
    events: mpsc::UnboundedSender<ChatEvent>,
}

impl SelectionController {
    pub fn new(events: mpsc::UnboundedSender<ChatEvent>) -> Self {
        Self { events }
    }

    /// Controller plus the receiving end of its notifications.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn emit(&self, event: ChatEvent) {
        if let Err(e) = self.events.send(event) {
            tracing::debug!(error = %e, "No listeners for chat event");
        }
    }

    /// Open a chat.
    ///
    /// Unknown ids change nothing and emit nothing. Re-selecting the open chat
    /// emits again so listeners can resync.
    pub fn select(&self, store: &ChatStore, state: &mut SelectionState, chat_id: &ChatId) -> bool {
        let Some(chat) = store.find_by_id(chat_id) else {
            tracing::debug!(chat_id = %chat_id, "Ignoring selection of unknown chat");
            return false;
        };

        state.selected_chat_id = Some(chat.id.clone());
        tracing::debug!(chat_id = %chat.id, "Chat selected");
        self.emit(ChatEvent::Selected(ChatSelected {
            chat_id: chat.id.clone(),
            chat_name: chat.title.clone(),
            is_online: chat.is_online,
        }));
        true
    }

    /// Give a chat a new display name. Blank names are rejected.
    pub fn rename(&self, store: &mut ChatStore, chat_id: &ChatId, new_name: &str) -> bool {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return false;
        }
        let Some(old_name) = store.find_by_id(chat_id).map(|c| c.title.clone()) else {
            return false;
        };
        store.rename(chat_id, new_name);
        self.emit(ChatEvent::Nickname(ChatNickname {
            chat_id: chat_id.clone(),
            chat_name: old_name,
            new_name: new_name.to_owned(),
        }));
        true
    }
}
