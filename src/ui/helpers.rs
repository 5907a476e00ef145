//! Background host calls for the UI layer.
//!
//! Every host call runs in its own task and reports back through the
//! `AppEvent` channel; state is only touched when the event is handled.

use crate::app::{App, AppEvent};
use crate::host::{ActionResponse, HostApi, HostError};
use crate::store::{ChatId, MessageId};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wraps a future to catch panics and convert them to errors.
///
/// Returns `Ok(result)` if the future completes normally, or
/// `Err(panic_message)` if it panics.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Run `work` in a task and deliver the event it produces.
fn spawn_host_task<F>(task: &'static str, tx: mpsc::Sender<AppEvent>, work: F) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    tokio::spawn(async move {
        match catch_task_panic(work).await {
            Ok(event) => {
                if let Err(e) = tx.send(event).await {
                    tracing::warn!(error = %e, task, "Channel send failed (receiver dropped)");
                }
            }
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Background task panicked");
                let _ = tx
                    .send(AppEvent::TaskPanicked {
                        task,
                        error: panic_msg,
                    })
                    .await;
            }
        }
    })
}

/// Collapse transport errors and `{ok: false}` responses into one message.
fn action_result(
    call: &'static str,
    response: Result<ActionResponse, HostError>,
) -> Result<(), String> {
    response
        .and_then(|r| r.into_result(call))
        .map_err(|e| e.to_string())
}

pub(super) fn spawn_messages_load(
    host: Arc<dyn HostApi>,
    chat_id: ChatId,
    generation: u64,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    tracing::debug!(chat_id = %chat_id, generation, "Spawning messages load");
    spawn_host_task("messages_load", tx, async move {
        let result = host
            .get_messages(&chat_id)
            .await
            .map_err(|e| e.to_string());
        AppEvent::MessagesLoaded {
            chat_id,
            generation,
            result,
        }
    })
}

pub(super) fn spawn_mark_read(
    host: Arc<dyn HostApi>,
    chat_id: ChatId,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_host_task("mark_read", tx, async move {
        let result = action_result("mark_chat_as_read", host.mark_chat_as_read(&chat_id).await);
        AppEvent::MarkedRead { chat_id, result }
    })
}

pub(super) fn spawn_send_message(
    host: Arc<dyn HostApi>,
    chat_id: ChatId,
    text: String,
    user_id: Option<String>,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_host_task("send_message", tx, async move {
        let result = action_result(
            "send_message",
            host.send_message(&chat_id, &text, user_id.as_deref()).await,
        );
        AppEvent::MessageSent {
            chat_id,
            text,
            result,
        }
    })
}

pub(super) fn spawn_delete_message(
    host: Arc<dyn HostApi>,
    message_id: MessageId,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    spawn_host_task("delete_message", tx, async move {
        let result = action_result("delete_message", host.delete_message(&message_id).await);
        AppEvent::MessageDeleted { message_id, result }
    })
}

/// Show the thread of `chat_id` as loading and fetch it.
pub(super) fn open_thread(app: &mut App, chat_id: ChatId, tx: &mpsc::Sender<AppEvent>) {
    let generation = app.begin_messages_load(chat_id.clone());
    app.messages_handle = Some(spawn_messages_load(
        Arc::clone(&app.host),
        chat_id,
        generation,
        tx.clone(),
    ));
}

/// Refetch the open thread without clearing it.
pub(super) fn refresh_thread(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if let Some((chat_id, generation)) = app.begin_messages_refresh() {
        app.messages_handle = Some(spawn_messages_load(
            Arc::clone(&app.host),
            chat_id,
            generation,
            tx.clone(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_passes_value() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_captures_message() {
        let result: Result<(), String> = catch_task_panic(async {
            panic!("boom");
        })
        .await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[test]
    fn test_action_result_maps_failure_response() {
        let err = action_result("delete_message", Ok(ActionResponse::failure("gone"))).unwrap_err();
        assert!(err.contains("gone"));
        assert!(action_result("delete_message", Ok(ActionResponse::success())).is_ok());
        assert!(action_result("delete_message", Err(HostError::Unavailable)).is_err());
    }
}
