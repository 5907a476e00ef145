//! Background loading of chat data from the host.
//!
//! A load waits for the host to become ready, then fetches all five
//! collections in one joined call. A failed fetch is retried after a fixed
//! delay, forever; nothing from a failed attempt is ever delivered.

use crate::app::AppEvent;
use crate::config::Config;
use crate::host::{HostApi, HostError};
use crate::store::ChatCollections;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct DataLoader {
    host: Arc<dyn HostApi>,
    poll_interval: Duration,
    retry_delay: Duration,
}

impl DataLoader {
    pub fn new(host: Arc<dyn HostApi>, config: &Config) -> Self {
        Self::with_intervals(host, config.poll_interval(), config.retry_delay())
    }

    pub fn with_intervals(
        host: Arc<dyn HostApi>,
        poll_interval: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            host,
            poll_interval,
            retry_delay,
        }
    }

    /// Spawn a full load tagged with `generation`.
    ///
    /// Sends `HostReady` once the host answers, `LoadFailed` after each failed
    /// attempt and finally `ChatsLoaded`. The receiver decides whether the
    /// generation is still current.
    pub fn start(&self, generation: u64, event_tx: mpsc::Sender<AppEvent>) -> JoinHandle<()> {
        let loader = self.clone();
        tokio::spawn(async move {
            loader.wait_until_ready().await;
            if let Err(e) = event_tx.send(AppEvent::HostReady { generation }).await {
                tracing::warn!(error = %e, event = "HostReady", "Channel send failed (receiver dropped)");
                return;
            }

            let failure_tx = event_tx.clone();
            let data = loader
                .load_with(|attempt, error| {
                    let event = AppEvent::LoadFailed {
                        generation,
                        attempt,
                        error: error.to_string(),
                    };
                    if let Err(e) = failure_tx.try_send(event) {
                        tracing::debug!(error = %e, "Dropped LoadFailed notification");
                    }
                })
                .await;

            if let Err(e) = event_tx
                .send(AppEvent::ChatsLoaded { generation, data })
                .await
            {
                tracing::warn!(error = %e, event = "ChatsLoaded", "Channel send failed (receiver dropped)");
            }
        })
    }

    /// Resolve once the host reports ready.
    ///
    /// Uses the host's readiness signal when it has one and falls back to
    /// polling `is_ready` every `poll_interval`.
    pub async fn wait_until_ready(&self) {
        if self.host.is_ready() {
            return;
        }

        if let Some(mut signal) = self.host.ready_signal() {
            if signal.wait_for(|ready| *ready).await.is_ok() {
                tracing::info!("Host API ready (signalled)");
                return;
            }
            tracing::warn!("Host readiness signal closed, falling back to polling");
        }

        loop {
            tracing::debug!(
                retry_in_ms = self.poll_interval.as_millis() as u64,
                "Host API not available yet"
            );
            tokio::time::sleep(self.poll_interval).await;
            if self.host.is_ready() {
                tracing::info!("Host API ready");
                return;
            }
        }
    }

    /// One combined fetch of all five collections. Any failure fails the whole fetch.
    pub async fn fetch_all(&self) -> Result<ChatCollections, HostError> {
        let host = &self.host;
        let (direct_messages, categorized, uncategorized, unread, categories) = futures::try_join!(
            host.get_direct_messages(),
            host.get_categorized_chats(),
            host.get_uncategorized_chats(),
            host.get_unread_chats(),
            host.get_categories(),
        )?;

        Ok(ChatCollections {
            unread,
            direct_messages,
            categorized,
            uncategorized,
            categories,
        })
    }

    /// Fetch until one attempt succeeds, sleeping `retry_delay` between attempts.
    ///
    /// `on_failure` sees the 1-based attempt number of every failed attempt.
    pub async fn load_with(&self, mut on_failure: impl FnMut(u32, &HostError)) -> ChatCollections {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match self.fetch_all().await {
                Ok(data) => {
                    tracing::info!(attempt, "Chat data loaded");
                    return data;
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        retry_in_ms = self.retry_delay.as_millis() as u64,
                        "Failed to load chat data, retrying"
                    );
                    on_failure(attempt, &e);
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}
