//! Application event handling.
//!
//! Applies background task results and chat notifications to the
//! application state.

use crate::app::{App, AppEvent};
use crate::selection::ChatEvent;
use tokio::sync::mpsc;

use super::helpers::{open_thread, refresh_thread};

/// Handle an event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::HostReady { generation } => app.on_host_ready(generation),
        AppEvent::ChatsLoaded { generation, data } => {
            if app.apply_loaded(generation, data) {
                tracing::info!(generation, "Chat list refreshed");
            }
        }
        AppEvent::LoadFailed {
            generation,
            attempt,
            error,
        } => app.on_load_failed(generation, attempt, error),
        AppEvent::MessagesLoaded {
            chat_id,
            generation,
            result,
        } => {
            app.apply_messages(chat_id, generation, result);
        }
        AppEvent::MarkedRead { chat_id, result } => app.apply_marked_read(&chat_id, result),
        AppEvent::MessageSent {
            chat_id,
            text,
            result,
        } => {
            if app.apply_message_sent(chat_id, text, result) {
                refresh_thread(app, event_tx);
            }
        }
        AppEvent::MessageDeleted { message_id, result } => {
            app.apply_message_deleted(&message_id, result)
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

/// Handle a selection or nickname notification.
pub(super) fn handle_chat_event(app: &mut App, event: ChatEvent, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(chat_id) = app.on_chat_event(event) {
        open_thread(app, chat_id, event_tx);
    }
}
