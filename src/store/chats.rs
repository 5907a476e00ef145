use super::types::{Chat, ChatCollections, ChatId};
use std::collections::HashMap;
use std::iter;

/// Owner of the loaded chat buckets.
///
/// Created once at startup and handed by reference to the sidebar renderer
/// and the selection controller. The only bulk write is [`ChatStore::replace_all`],
/// which swaps every bucket at once so a render never observes a half-applied load.
#[derive(Debug, Default)]
pub struct ChatStore {
    data: ChatCollections,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collections(data: ChatCollections) -> Self {
        Self { data }
    }

    pub fn unread(&self) -> &[Chat] {
        &self.data.unread
    }

    pub fn direct_messages(&self) -> &[Chat] {
        &self.data.direct_messages
    }

    pub fn categorized(&self) -> &HashMap<String, Vec<Chat>> {
        &self.data.categorized
    }

    /// Chats filed under `name`, or an empty slice for an unknown category.
    pub fn category(&self, name: &str) -> &[Chat] {
        self.data
            .categorized
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn uncategorized(&self) -> &[Chat] {
        &self.data.uncategorized
    }

    pub fn categories(&self) -> &[String] {
        &self.data.categories
    }

    pub fn is_empty(&self) -> bool {
        self.data.unread.is_empty()
            && self.data.direct_messages.is_empty()
            && self.data.categorized.values().all(Vec::is_empty)
            && self.data.uncategorized.is_empty()
    }

    /// Swap all five collections at once.
    pub fn replace_all(&mut self, data: ChatCollections) {
        tracing::info!(
            unread = data.unread.len(),
            direct_messages = data.direct_messages.len(),
            categories = data.categories.len(),
            uncategorized = data.uncategorized.len(),
            "Chat data replaced"
        );
        self.data = data;
    }

    /// Look a chat up by id.
    ///
    /// Search order follows display priority: unread, direct messages, each
    /// category in `categories` order, then uncategorized. The first match wins.
    pub fn find_by_id(&self, id: &ChatId) -> Option<&Chat> {
        let d = &self.data;
        d.unread
            .iter()
            .chain(d.direct_messages.iter())
            .chain(
                d.categories
                    .iter()
                    .filter_map(|name| d.categorized.get(name))
                    .flatten(),
            )
            .chain(d.uncategorized.iter())
            .find(|chat| &chat.id == id)
    }

    pub fn contains(&self, id: &ChatId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Every bucket, including categorized lists whose name is not in `categories`.
    fn buckets_mut(&mut self) -> impl Iterator<Item = &mut Vec<Chat>> + '_ {
        let d = &mut self.data;
        iter::once(&mut d.unread)
            .chain(iter::once(&mut d.direct_messages))
            .chain(d.categorized.values_mut())
            .chain(iter::once(&mut d.uncategorized))
    }

    /// Apply `f` to every copy of the chat. The unread overlay holds its own
    /// copy, so a flag change must reach both.
    fn update(&mut self, id: &ChatId, mut f: impl FnMut(&mut Chat)) -> bool {
        let mut found = false;
        for bucket in self.buckets_mut() {
            for chat in bucket.iter_mut().filter(|c| &c.id == id) {
                f(chat);
                found = true;
            }
        }
        found
    }

    pub fn set_pinned(&mut self, id: &ChatId, pinned: bool) -> bool {
        self.update(id, |chat| chat.is_pinned = pinned)
    }

    pub fn set_muted(&mut self, id: &ChatId, muted: bool) -> bool {
        self.update(id, |chat| chat.is_muted = muted)
    }

    pub fn set_hidden(&mut self, id: &ChatId, hidden: bool) -> bool {
        self.update(id, |chat| chat.is_hidden = hidden)
    }

    pub fn rename(&mut self, id: &ChatId, title: &str) -> bool {
        self.update(id, |chat| chat.title = title.to_owned())
    }

    /// Clear the unread flag and drop the chat from the unread overlay.
    pub fn mark_read(&mut self, id: &ChatId) -> bool {
        let found = self.update(id, |chat| chat.unread = false);
        self.data.unread.retain(|chat| &chat.id != id);
        found
    }

    /// Remove the chat from every bucket that references it.
    pub fn remove(&mut self, id: &ChatId) -> bool {
        let mut removed = false;
        for bucket in self.buckets_mut() {
            let before = bucket.len();
            bucket.retain(|chat| &chat.id != id);
            removed |= bucket.len() != before;
        }
        if removed {
            tracing::debug!(chat_id = %id, "Removed chat from store");
        }
        removed
    }
}
