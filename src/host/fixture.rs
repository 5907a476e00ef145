use super::{ActionResponse, HostApi, HostError};
use crate::store::{Chat, ChatCollections, ChatId, Message, MessageId};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in fixture file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Fixture file too large: {0}")]
    TooLarge(String),
}

/// On-disk fixture layout: the five chat collections plus threads keyed by chat id.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Fixture {
    #[serde(flatten)]
    chats: ChatCollections,
    messages: HashMap<ChatId, Vec<Message>>,
}

struct FixtureState {
    fixture: Fixture,
    next_message_id: u64,
}

/// In-process host serving a fixed data set.
///
/// Actions mutate the data set, so a reload after "mark as read" or "send"
/// reflects the change the same way a real host would.
pub struct FixtureHost {
    state: Mutex<FixtureState>,
    ready: watch::Sender<bool>,
    display_name: String,
}

impl FixtureHost {
    /// Maximum fixture file size (4 MB).
    const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

    fn from_fixture(fixture: Fixture) -> Self {
        let (ready, _) = watch::channel(true);
        Self {
            state: Mutex::new(FixtureState {
                fixture,
                next_message_id: 1,
            }),
            ready,
            display_name: "You".to_string(),
        }
    }

    pub fn new(chats: ChatCollections, messages: HashMap<ChatId, Vec<Message>>) -> Self {
        Self::from_fixture(Fixture { chats, messages })
    }

    /// Load a JSON fixture file.
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > Self::MAX_FILE_SIZE {
            return Err(FixtureError::TooLarge(format!(
                "Fixture file is {} bytes (max {} bytes)",
                meta.len(),
                Self::MAX_FILE_SIZE
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let fixture: Fixture = serde_json::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            direct_messages = fixture.chats.direct_messages.len(),
            categories = fixture.chats.categories.len(),
            "Loaded fixture host data"
        );
        Ok(Self::from_fixture(fixture))
    }

    /// Built-in demo data.
    pub fn seeded() -> Self {
        let (chats, messages) = seed_data();
        Self::new(chats, messages)
    }

    /// Name that authors messages sent through this host.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Flip readiness. Calls made while not ready fail with [`HostError::Unavailable`].
    pub fn set_ready(&self, ready: bool) {
        self.ready.send_replace(ready);
    }

    fn lock(&self) -> MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_ready(&self) -> Result<(), HostError> {
        if *self.ready.borrow() {
            Ok(())
        } else {
            Err(HostError::Unavailable)
        }
    }
}

#[async_trait]
impl HostApi for FixtureHost {
    fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    fn ready_signal(&self) -> Option<watch::Receiver<bool>> {
        Some(self.ready.subscribe())
    }

    async fn get_direct_messages(&self) -> Result<Vec<Chat>, HostError> {
        self.ensure_ready()?;
        Ok(self.lock().fixture.chats.direct_messages.clone())
    }

    async fn get_categorized_chats(&self) -> Result<HashMap<String, Vec<Chat>>, HostError> {
        self.ensure_ready()?;
        Ok(self.lock().fixture.chats.categorized.clone())
    }

    async fn get_uncategorized_chats(&self) -> Result<Vec<Chat>, HostError> {
        self.ensure_ready()?;
        Ok(self.lock().fixture.chats.uncategorized.clone())
    }

    async fn get_unread_chats(&self) -> Result<Vec<Chat>, HostError> {
        self.ensure_ready()?;
        Ok(self.lock().fixture.chats.unread.clone())
    }

    async fn get_categories(&self) -> Result<Vec<String>, HostError> {
        self.ensure_ready()?;
        Ok(self.lock().fixture.chats.categories.clone())
    }

    async fn get_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, HostError> {
        self.ensure_ready()?;
        Ok(self
            .lock()
            .fixture
            .messages
            .get(chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn mark_chat_as_read(&self, chat_id: &ChatId) -> Result<ActionResponse, HostError> {
        self.ensure_ready()?;
        let mut state = self.lock();
        let chats = &mut state.fixture.chats;
        let before = chats.unread.len();
        chats.unread.retain(|c| &c.id != chat_id);
        if chats.unread.len() == before {
            return Ok(ActionResponse::failure(format!(
                "Chat {} has no unread messages",
                chat_id
            )));
        }
        for chat in chats
            .direct_messages
            .iter_mut()
            .chain(chats.categorized.values_mut().flatten())
            .chain(chats.uncategorized.iter_mut())
            .filter(|c| &c.id == chat_id)
        {
            chat.unread = false;
        }
        Ok(ActionResponse::success())
    }

    async fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        user_id: Option<&str>,
    ) -> Result<ActionResponse, HostError> {
        self.ensure_ready()?;
        let mut state = self.lock();
        let id = state.next_message_id;
        state.next_message_id += 1;
        tracing::debug!(chat_id = %chat_id, user_id = ?user_id, "Fixture host received message");
        state
            .fixture
            .messages
            .entry(chat_id.clone())
            .or_default()
            .push(Message::new(
                format!("local-{}", id),
                self.display_name.clone(),
                text,
                Some(chrono::Utc::now().timestamp()),
            ));
        Ok(ActionResponse::success())
    }

    async fn delete_message(&self, message_id: &MessageId) -> Result<ActionResponse, HostError> {
        self.ensure_ready()?;
        let mut state = self.lock();
        for thread in state.fixture.messages.values_mut() {
            if let Some(pos) = thread.iter().position(|m| &m.id == message_id) {
                thread.remove(pos);
                return Ok(ActionResponse::success());
            }
        }
        Ok(ActionResponse::failure(format!(
            "Message {} not found",
            message_id
        )))
    }
}

fn seed_data() -> (ChatCollections, HashMap<ChatId, Vec<Message>>) {
    fn chat(id: i64, title: &str, online: bool, category: Option<&str>) -> Chat {
        let mut chat = Chat::new(id, title);
        chat.is_online = online;
        chat.category = category.map(str::to_owned);
        chat
    }

    let mut release = chat(5, "Release Train", true, Some("Work"));
    release.unread = true;
    let mut book_club = chat(8, "Book Club", false, None);
    book_club.unread = true;

    let mut categorized = HashMap::new();
    categorized.insert(
        "Work".to_string(),
        vec![
            release.clone(),
            chat(6, "Design Reviews", false, Some("Work")),
        ],
    );
    categorized.insert(
        "Family".to_string(),
        vec![chat(7, "Sunday Dinner", true, Some("Family"))],
    );

    let chats = ChatCollections {
        unread: vec![release, book_club.clone()],
        direct_messages: vec![
            chat(1, "John Doe", true, None),
            chat(2, "Jane Smith", false, None),
            chat(3, "Alex Johnson", true, None),
        ],
        categorized,
        uncategorized: vec![book_club, chat(9, "Climbing Crew", false, None)],
        categories: vec!["Work".to_string(), "Family".to_string()],
    };

    let base = 1_700_000_000;
    let mut messages = HashMap::new();
    messages.insert(
        ChatId::from(1),
        vec![
            Message::new(101, "John Doe", "Hey, are we still on for lunch?", Some(base)),
            Message::new(102, "You", "Yes! 12:30 at the usual place.", Some(base + 90)),
        ],
    );
    let mut edited = Message::new(501, "Alex Johnson", "Release branch is cut.", Some(base + 30));
    edited.edit_count = 1;
    edited.reactions = vec![crate::store::Reaction {
        emoji: "\u{1F680}".to_string(),
        count: 3,
    }];
    messages.insert(
        ChatId::from(5),
        vec![
            Message::new(502, "Jane Smith", "Smoke tests are green.", Some(base + 60)),
            edited,
        ],
    );

    (chats, messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_seeded_host_serves_collections() {
        let host = FixtureHost::seeded();
        assert!(host.is_ready());
        assert_eq!(host.get_direct_messages().await.unwrap().len(), 3);
        assert_eq!(
            host.get_categories().await.unwrap(),
            vec!["Work".to_string(), "Family".to_string()]
        );
        assert_eq!(host.get_unread_chats().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_not_ready_host_rejects_calls() {
        let host = FixtureHost::seeded();
        host.set_ready(false);
        assert!(!host.is_ready());
        assert!(matches!(
            host.get_direct_messages().await,
            Err(HostError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_mark_as_read_clears_unread_overlay() {
        let host = FixtureHost::seeded();
        let response = host.mark_chat_as_read(&ChatId::from(5)).await.unwrap();
        assert!(response.ok);
        assert_eq!(host.get_unread_chats().await.unwrap().len(), 1);

        let again = host.mark_chat_as_read(&ChatId::from(5)).await.unwrap();
        assert!(!again.ok);
    }

    #[tokio::test]
    async fn test_send_then_delete_message() {
        let host = FixtureHost::seeded();
        let chat_id = ChatId::from(2);
        assert!(host.send_message(&chat_id, "hello", None).await.unwrap().ok);

        let thread = host.get_messages(&chat_id).await.unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].author, "You");
        assert_eq!(thread[0].content, "hello");

        assert!(host.delete_message(&thread[0].id).await.unwrap().ok);
        assert!(host.get_messages(&chat_id).await.unwrap().is_empty());
        assert!(!host.delete_message(&thread[0].id).await.unwrap().ok);
    }

    #[tokio::test]
    async fn test_sent_message_authored_by_display_name() {
        let host = FixtureHost::seeded().with_display_name("Alice");
        let chat_id = ChatId::from(2);
        assert!(host.send_message(&chat_id, "hi", Some("u-42")).await.unwrap().ok);

        let thread = host.get_messages(&chat_id).await.unwrap();
        assert_eq!(thread[0].author, "Alice");
    }

    #[test]
    fn test_from_path_reads_fixture() {
        let dir = std::env::temp_dir().join("bubbles_fixture_test_read");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fixture.json");
        std::fs::write(
            &path,
            r#"{
                "directMessages": [{"id": 1, "title": "John Doe"}],
                "categories": [],
                "messages": {"1": [{"message_id": 10, "author": "John Doe", "content": "hi"}]}
            }"#,
        )
        .unwrap();

        let host = FixtureHost::from_path(&path).unwrap();
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let thread = rt
            .block_on(host.get_messages(&ChatId::from(1)))
            .unwrap();
        assert_eq!(thread.len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_path_invalid_json() {
        let dir = std::env::temp_dir().join("bubbles_fixture_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("fixture.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FixtureHost::from_path(&path).err().unwrap();
        assert!(matches!(err, FixtureError::Parse(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = FixtureHost::from_path(Path::new("/tmp/bubbles_no_such_fixture.json"))
            .err()
            .unwrap();
        assert!(matches!(err, FixtureError::Io(_)));
    }
}
