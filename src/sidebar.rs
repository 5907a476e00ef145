//! Sidebar projection.
//!
//! [`render`] turns the store plus selection state into a [`SidebarView`]:
//! a plain description of sections, rows and dropdown menus. It never touches
//! the terminal; `ui::sidebar` draws the result.

use crate::search::{self, AnnotatedText};
use crate::selection::SelectionState;
use crate::store::{Chat, ChatId, ChatStore};
use std::fmt;

/// Placeholder shown when a search term matches nothing.
pub const NO_RESULTS_TEXT: &str = "No chats found matching your search";

// ============================================================================
// Sections
// ============================================================================

/// Stable identity of a sidebar section, used for collapse state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionId {
    Unread,
    DirectMessages,
    /// Slug of the category name (lowercase, whitespace runs as `-`).
    Category(String),
    Uncategorized,
}

impl SectionId {
    pub fn for_category(name: &str) -> Self {
        let slug = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        SectionId::Category(slug)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionId::Unread => f.write_str("unread"),
            SectionId::DirectMessages => f.write_str("dm"),
            SectionId::Category(slug) => write!(f, "category-{}", slug),
            SectionId::Uncategorized => f.write_str("uncategorized"),
        }
    }
}

// ============================================================================
// Dropdown actions
// ============================================================================

/// Per-chat actions offered by the row and header dropdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    MarkAsRead,
    TogglePin,
    ToggleMute,
    Hide,
    Nickname,
    Leave,
}

impl ChatAction {
    pub const ALL: [ChatAction; 6] = [
        ChatAction::MarkAsRead,
        ChatAction::TogglePin,
        ChatAction::ToggleMute,
        ChatAction::Hide,
        ChatAction::Nickname,
        ChatAction::Leave,
    ];

    /// Menu label. Toggle labels follow the chat's current state.
    pub fn label(self, chat: &Chat) -> &'static str {
        match self {
            ChatAction::MarkAsRead => "Mark as Read",
            ChatAction::TogglePin if chat.is_pinned => "Unpin",
            ChatAction::TogglePin => "Pin",
            ChatAction::ToggleMute if chat.is_muted => "Unmute",
            ChatAction::ToggleMute => "Mute",
            ChatAction::Hide => "Hide",
            ChatAction::Nickname => "Nickname",
            ChatAction::Leave => "Leave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub action: ChatAction,
    pub label: &'static str,
}

/// Dropdown entries for a chat. Every action is always available.
pub fn menu_for(chat: &Chat) -> Vec<MenuItem> {
    ChatAction::ALL
        .iter()
        .map(|&action| MenuItem {
            action,
            label: action.label(chat),
        })
        .collect()
}

// ============================================================================
// View tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub chat_id: ChatId,
    pub title: AnnotatedText,
    pub is_online: bool,
    pub is_selected: bool,
    pub is_pinned: bool,
    pub is_muted: bool,
    pub unread: bool,
    pub menu: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    pub name: String,
    /// Post-filter member count; unaffected by collapsing.
    pub count: usize,
    pub collapsed: bool,
    /// Empty while collapsed.
    pub rows: Vec<Row>,
}

impl Section {
    pub fn header(&self) -> String {
        format!("{} ({})", self.name, self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarView {
    Sections(Vec<Section>),
    /// A non-empty search matched nothing.
    NoResults,
}

/// One navigable line of the rendered sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarLine {
    Header(SectionId),
    Row(ChatId),
}

impl SidebarView {
    pub fn sections(&self) -> &[Section] {
        match self {
            SidebarView::Sections(sections) => sections,
            SidebarView::NoResults => &[],
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, SidebarView::NoResults)
    }

    /// Visible rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.sections().iter().flat_map(|s| s.rows.iter())
    }

    pub fn first_row(&self) -> Option<&Row> {
        self.rows().next()
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections().iter().find(|s| &s.id == id)
    }

    /// Headers and visible rows flattened for cursor navigation.
    pub fn lines(&self) -> Vec<SidebarLine> {
        let mut lines = Vec::new();
        for section in self.sections() {
            lines.push(SidebarLine::Header(section.id.clone()));
            lines.extend(
                section
                    .rows
                    .iter()
                    .map(|row| SidebarLine::Row(row.chat_id.clone())),
            );
        }
        lines
    }
}

// ============================================================================
// Projection
// ============================================================================

fn build_row(chat: &Chat, selection: &SelectionState, term: &str) -> Row {
    Row {
        chat_id: chat.id.clone(),
        title: search::highlight(&chat.title, term),
        is_online: chat.is_online,
        is_selected: selection.is_selected(&chat.id),
        is_pinned: chat.is_pinned,
        is_muted: chat.is_muted,
        unread: chat.unread,
        menu: menu_for(chat),
    }
}

fn build_section(
    id: SectionId,
    name: &str,
    chats: &[Chat],
    selection: &SelectionState,
    term: &str,
) -> Option<Section> {
    let matched: Vec<&Chat> = search::filter(chats, term)
        .into_iter()
        .filter(|c| !c.is_hidden)
        .collect();
    if matched.is_empty() {
        return None;
    }

    let collapsed = selection.is_collapsed(&id);
    let rows = if collapsed {
        Vec::new()
    } else {
        matched
            .iter()
            .map(|chat| build_row(chat, selection, term))
            .collect()
    };

    Some(Section {
        id,
        name: name.to_owned(),
        count: matched.len(),
        collapsed,
        rows,
    })
}

/// Project the store into the sidebar view.
///
/// Section order is fixed: Unread, Direct Messages, each category in store
/// order, Uncategorized. Sections left empty by filtering are omitted.
pub fn render(store: &ChatStore, selection: &SelectionState) -> SidebarView {
    let term = selection.search_term.trim();

    let mut sections = Vec::new();
    sections.extend(build_section(
        SectionId::Unread,
        "Unread",
        store.unread(),
        selection,
        term,
    ));
    sections.extend(build_section(
        SectionId::DirectMessages,
        "Direct Messages",
        store.direct_messages(),
        selection,
        term,
    ));
    for name in store.categories() {
        sections.extend(build_section(
            SectionId::for_category(name),
            name,
            store.category(name),
            selection,
            term,
        ));
    }
    sections.extend(build_section(
        SectionId::Uncategorized,
        "Uncategorized",
        store.uncategorized(),
        selection,
        term,
    ));

    if sections.is_empty() && !term.is_empty() {
        return SidebarView::NoResults;
    }
    SidebarView::Sections(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ChatCollections;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn two_chat_store() -> ChatStore {
        ChatStore::from_collections(ChatCollections {
            direct_messages: vec![Chat::new(1, "John Doe")],
            uncategorized: vec![Chat::new(2, "Jane Smith")],
            ..Default::default()
        })
    }

    fn searching(term: &str) -> SelectionState {
        SelectionState {
            search_term: term.to_string(),
            ..Default::default()
        }
    }

    fn headers(view: &SidebarView) -> Vec<String> {
        view.sections().iter().map(Section::header).collect()
    }

    fn full_store() -> ChatStore {
        let mut unread = Chat::new(5, "Release Train");
        unread.unread = true;
        let mut categorized = HashMap::new();
        categorized.insert("Work Stuff".to_string(), vec![Chat::new(5, "Release Train")]);
        categorized.insert("Family".to_string(), vec![Chat::new(6, "Mom")]);
        categorized.insert("Empty".to_string(), vec![]);
        ChatStore::from_collections(ChatCollections {
            unread: vec![unread],
            direct_messages: vec![Chat::new(1, "John Doe")],
            categorized,
            uncategorized: vec![Chat::new(2, "Jane Smith")],
            categories: vec![
                "Family".to_string(),
                "Empty".to_string(),
                "Work Stuff".to_string(),
            ],
        })
    }

    #[test]
    fn test_render_without_search() {
        let view = render(&two_chat_store(), &SelectionState::default());
        assert_eq!(
            headers(&view),
            vec!["Direct Messages (1)", "Uncategorized (1)"]
        );
    }

    #[test]
    fn test_render_search_keeps_matching_section_only() {
        let view = render(&two_chat_store(), &searching("jane"));
        assert_eq!(headers(&view), vec!["Uncategorized (1)"]);
        let row = view.first_row().unwrap();
        assert_eq!(row.title.highlighted().collect::<Vec<_>>(), vec!["Jane"]);
        assert_eq!(row.title.to_string(), "Jane Smith");
    }

    #[test]
    fn test_render_search_without_matches_is_placeholder() {
        let view = render(&two_chat_store(), &searching("zzz"));
        assert_eq!(view, SidebarView::NoResults);
        assert!(view.sections().is_empty());
    }

    #[test]
    fn test_render_empty_store_without_search_is_not_placeholder() {
        let view = render(&ChatStore::new(), &SelectionState::default());
        assert_eq!(view, SidebarView::Sections(Vec::new()));
    }

    #[test]
    fn test_section_order_follows_store_categories() {
        let view = render(&full_store(), &SelectionState::default());
        let ids: Vec<String> = view.sections().iter().map(|s| s.id.to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "unread",
                "dm",
                "category-family",
                "category-work-stuff",
                "uncategorized"
            ]
        );
    }

    #[test]
    fn test_counts_are_post_filter() {
        let mut store = full_store();
        store.replace_all(ChatCollections {
            direct_messages: vec![
                Chat::new(1, "John Doe"),
                Chat::new(3, "Johanna"),
                Chat::new(4, "Bob"),
            ],
            ..Default::default()
        });
        let view = render(&store, &searching("jo"));
        assert_eq!(headers(&view), vec!["Direct Messages (2)"]);
    }

    #[test]
    fn test_collapsed_section_keeps_header_and_count() {
        let mut selection = SelectionState::default();
        selection.toggle_collapsed(&SectionId::DirectMessages);
        let view = render(&two_chat_store(), &selection);

        let dm = view.section(&SectionId::DirectMessages).unwrap();
        assert!(dm.collapsed);
        assert_eq!(dm.count, 1);
        assert!(dm.rows.is_empty());
        assert_eq!(view.rows().count(), 1);
    }

    #[test]
    fn test_hidden_chats_are_excluded() {
        let mut store = two_chat_store();
        store.set_hidden(&ChatId::from(1), true);
        let view = render(&store, &SelectionState::default());
        assert_eq!(headers(&view), vec!["Uncategorized (1)"]);
    }

    #[test]
    fn test_exactly_one_row_selected() {
        let store = full_store();
        let selection = SelectionState {
            selected_chat_id: Some(ChatId::from(6)),
            ..Default::default()
        };
        let view = render(&store, &selection);
        let selected: Vec<&Row> = view.rows().filter(|r| r.is_selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].chat_id, ChatId::from(6));
    }

    #[test]
    fn test_unread_overlay_row_also_selected() {
        // The overlay holds a second copy of chat 5.
        let store = full_store();
        let selection = SelectionState {
            selected_chat_id: Some(ChatId::from(5)),
            ..Default::default()
        };
        let view = render(&store, &selection);
        assert_eq!(view.rows().filter(|r| r.is_selected).count(), 2);
    }

    #[test]
    fn test_mute_label_reflects_state() {
        let mut chat = Chat::new(1, "John Doe");
        let labels: Vec<&str> = menu_for(&chat).iter().map(|m| m.label).collect();
        assert_eq!(
            labels,
            vec!["Mark as Read", "Pin", "Mute", "Hide", "Nickname", "Leave"]
        );

        chat.is_muted = true;
        chat.is_pinned = true;
        let labels: Vec<&str> = menu_for(&chat).iter().map(|m| m.label).collect();
        assert_eq!(
            labels,
            vec!["Mark as Read", "Unpin", "Unmute", "Hide", "Nickname", "Leave"]
        );
    }

    #[test]
    fn test_lines_flatten_headers_and_rows() {
        let view = render(&two_chat_store(), &SelectionState::default());
        assert_eq!(
            view.lines(),
            vec![
                SidebarLine::Header(SectionId::DirectMessages),
                SidebarLine::Row(ChatId::from(1)),
                SidebarLine::Header(SectionId::Uncategorized),
                SidebarLine::Row(ChatId::from(2)),
            ]
        );
    }

    #[test]
    fn test_category_slug() {
        assert_eq!(
            SectionId::for_category("Work  Stuff").to_string(),
            "category-work-stuff"
        );
    }
}
