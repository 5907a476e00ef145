use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Host payloads carry ids as either JSON strings or integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

/// Unix timestamps arrive as integers or fractional seconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
}

/// Whole unix seconds, truncating fractions. Zero counts as missing.
fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    let secs = match Option::<RawTimestamp>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawTimestamp::Int(n)) => n,
        Some(RawTimestamp::Float(f)) => f.trunc() as i64,
    };
    Ok((secs != 0).then_some(secs))
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id.to_string())
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id.to_string())
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

opaque_id!(
    /// Opaque, stable chat identifier. `1` and `"1"` from the host are the same chat.
    ChatId
);

opaque_id!(
    /// Opaque message identifier.
    MessageId
);

// ============================================================================
// Chats
// ============================================================================

/// One conversation thread as shown in the sidebar.
///
/// All flags default to `false` when the host omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_muted: bool,
    #[serde(default)]
    pub is_hidden: bool,
    /// Category label; `None` means uncategorized.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unread: bool,
}

impl Chat {
    pub fn new(id: impl Into<ChatId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            is_online: false,
            is_pinned: false,
            is_muted: false,
            is_hidden: false,
            category: None,
            unread: false,
        }
    }
}

/// The five collections fetched from the host in one combined load.
///
/// `unread` is an overlay: its chats also live in one of the other buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatCollections {
    pub unread: Vec<Chat>,
    pub direct_messages: Vec<Chat>,
    /// Category name -> chats, in display order within the category.
    pub categorized: HashMap<String, Vec<Chat>>,
    pub uncategorized: Vec<Chat>,
    /// Category names in display order.
    pub categories: Vec<String>,
}

// ============================================================================
// Messages
// ============================================================================

fn default_reaction_emoji() -> String {
    "\u{1F44D}".to_string()
}

fn default_reaction_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    #[serde(alias = "type", default = "default_reaction_emoji")]
    pub emoji: String,
    #[serde(default = "default_reaction_count")]
    pub count: u32,
}

/// A single message in a chat thread.
///
/// Accepts both the camelCase names and the older snake_case host names
/// (`message_id`, `time_of_sending`, `edit_count`, `profilepicurl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(alias = "message_id")]
    pub id: MessageId,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
    /// Unix seconds.
    #[serde(
        default,
        alias = "time_of_sending",
        deserialize_with = "deserialize_timestamp"
    )]
    pub sent_at: Option<i64>,
    #[serde(default, alias = "edit_count")]
    pub edit_count: u32,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default, alias = "profilepicurl", skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
}

impl Message {
    pub fn new(
        id: impl Into<MessageId>,
        author: impl Into<String>,
        content: impl Into<String>,
        sent_at: Option<i64>,
    ) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            content: content.into(),
            sent_at,
            edit_count: 0,
            reactions: Vec::new(),
            profile_pic_url: None,
        }
    }
}
