//! View models for the open conversation: message thread, header and composer.

use crate::store::{Chat, ChatId, Message, MessageId, Reaction};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

pub const EMPTY_TEXT: &str = "No messages yet";
pub const EMPTY_HINT: &str = "Start the conversation by typing a message below";
pub const LOADING_TEXT: &str = "Loading messages...";
pub const UNKNOWN_AUTHOR: &str = "Unknown User";

/// State of the message pane for the open chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MessagePane {
    /// No chat open yet.
    #[default]
    Empty,
    Loading {
        chat_id: ChatId,
    },
    Loaded {
        chat_id: ChatId,
        messages: Vec<Message>,
    },
}

impl MessagePane {
    pub fn chat_id(&self) -> Option<&ChatId> {
        match self {
            MessagePane::Empty => None,
            MessagePane::Loading { chat_id } | MessagePane::Loaded { chat_id, .. } => Some(chat_id),
        }
    }

    /// Messages in display order (empty unless loaded).
    pub fn messages(&self) -> &[Message] {
        match self {
            MessagePane::Loaded { messages, .. } => messages,
            _ => &[],
        }
    }

    /// Drop a message from the loaded thread. Returns `false` if it was not shown.
    pub fn remove_message(&mut self, id: &MessageId) -> bool {
        match self {
            MessagePane::Loaded { messages, .. } => {
                let before = messages.len();
                messages.retain(|m| &m.id != id);
                messages.len() != before
            }
            _ => false,
        }
    }
}

/// One rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadEntry {
    pub id: MessageId,
    pub author: String,
    pub initials: String,
    /// Stable 0..360 hue derived from the author name.
    pub hue: u16,
    pub sent_by_me: bool,
    /// `HH:MM` in the viewer's time zone.
    pub time: String,
    pub content: String,
    pub edited: bool,
    pub reactions: Vec<Reaction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadView {
    /// Nothing to show: "No messages yet" plus the hint.
    Placeholder,
    Loading,
    Entries(Vec<ThreadEntry>),
}

/// Build the thread view for `pane`, formatting times in `tz`.
pub fn thread_view<Tz>(pane: &MessagePane, display_name: &str, tz: &Tz) -> ThreadView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match pane {
        MessagePane::Empty => ThreadView::Placeholder,
        MessagePane::Loading { .. } => ThreadView::Loading,
        MessagePane::Loaded { messages, .. } if messages.is_empty() => ThreadView::Placeholder,
        MessagePane::Loaded { messages, .. } => ThreadView::Entries(
            messages
                .iter()
                .map(|m| entry(m, display_name, tz))
                .collect(),
        ),
    }
}

fn entry<Tz>(message: &Message, display_name: &str, tz: &Tz) -> ThreadEntry
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let author = if message.author.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        message.author.clone()
    };
    let avatar_name = if message.author.is_empty() {
        "User"
    } else {
        message.author.as_str()
    };

    ThreadEntry {
        id: message.id.clone(),
        initials: initials(avatar_name),
        hue: name_hue(avatar_name),
        sent_by_me: is_sent_by_me(&message.author, display_name),
        time: format_time(message.sent_at, tz),
        content: message.content.clone(),
        edited: message.edit_count > 0,
        reactions: message.reactions.clone(),
        author,
    }
}

/// Sort oldest to newest. Stable; a missing timestamp sorts as 0.
pub fn sort_messages(messages: &mut [Message]) {
    messages.sort_by_key(|m| m.sent_at.unwrap_or(0));
}

/// First letter of the first two words, uppercased.
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Stable hue in `0..360` for a name.
///
/// The running hash is a double; only the shifted term wraps to 32 bits.
/// Negative hashes wrap around the colour wheel.
pub fn name_hue(name: &str) -> u16 {
    let hash = name.encode_utf16().fold(0f64, |hash, unit| {
        let shifted = f64::from(to_int32(hash).wrapping_shl(5));
        f64::from(unit) + (shifted - hash)
    });
    // rem_euclid(360.0) of an integral value is an integer in 0..360
    (hash.rem_euclid(360.0) as u16) % 360
}

fn to_int32(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(4_294_967_296.0) as u32 as i32
}

/// `HH:MM` for a unix timestamp in `tz`, or the current time if missing or out of range.
pub fn format_time<Tz>(sent_at: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let instant = sent_at
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);
    instant.with_timezone(tz).format("%H:%M").to_string()
}

pub fn is_sent_by_me(author: &str, display_name: &str) -> bool {
    author == "You" || (!display_name.is_empty() && author.contains(display_name))
}

/// Text to send for the composer input, or `None` if it is blank.
pub fn compose(input: &str) -> Option<String> {
    let text = input.trim();
    (!text.is_empty()).then(|| text.to_string())
}

// ============================================================================
// Header
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub chat_id: Option<ChatId>,
    pub title: String,
    pub is_online: bool,
}

impl HeaderView {
    pub fn none() -> Self {
        Self {
            chat_id: None,
            title: "Select a chat".to_string(),
            is_online: false,
        }
    }

    pub fn for_chat(chat: &Chat) -> Self {
        Self::named(chat.id.clone(), &chat.title, chat.is_online)
    }

    pub fn named(chat_id: ChatId, name: &str, is_online: bool) -> Self {
        Self {
            chat_id: Some(chat_id),
            title: format!("Chat with {}", name),
            is_online,
        }
    }
}

impl Default for HeaderView {
    fn default() -> Self {
        Self::none()
    }
}
