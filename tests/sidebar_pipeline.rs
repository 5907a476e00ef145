//! Integration tests for the sidebar pipeline: store, search, projection and selection.
//!
//! Each test builds its own store and selection state and drives them only
//! through the public library API.

use bubbles::search;
use bubbles::selection::{ChatEvent, ChatNickname, ChatSelected, SelectionController, SelectionState};
use bubbles::sidebar::{self, SectionId, SidebarView};
use bubbles::store::{Chat, ChatCollections, ChatId, ChatStore};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

fn two_chat_store() -> ChatStore {
    ChatStore::from_collections(ChatCollections {
        direct_messages: vec![Chat::new(1, "John Doe")],
        uncategorized: vec![Chat::new(2, "Jane Smith")],
        ..ChatCollections::default()
    })
}

fn headers(view: &SidebarView) -> Vec<String> {
    view.sections().iter().map(|s| s.header()).collect()
}

fn view_for(store: &ChatStore, term: &str) -> SidebarView {
    let selection = SelectionState {
        search_term: term.to_string(),
        ..SelectionState::default()
    };
    sidebar::render(store, &selection)
}

// ============================================================================
// Search + projection
// ============================================================================

#[test]
fn test_empty_term_shows_every_section() {
    let store = two_chat_store();
    let view = view_for(&store, "");
    assert_eq!(
        headers(&view),
        vec!["Direct Messages (1)", "Uncategorized (1)"]
    );
    assert!(view.rows().all(|row| !row.title.has_highlight()));
}

#[test]
fn test_term_filters_and_highlights() {
    let store = two_chat_store();
    let view = view_for(&store, "jane");
    assert_eq!(headers(&view), vec!["Uncategorized (1)"]);

    let row = view.first_row().unwrap();
    assert_eq!(row.chat_id, ChatId::from(2));
    assert_eq!(row.title.highlighted().collect::<Vec<_>>(), vec!["Jane"]);
    assert_eq!(row.title.to_string(), "Jane Smith");
}

#[test]
fn test_unmatched_term_yields_placeholder_only() {
    let store = two_chat_store();
    let view = view_for(&store, "zzz");
    assert!(view.is_no_results());
    assert!(view.sections().is_empty());
    assert!(view.first_row().is_none());
}

#[test]
fn test_section_order_with_categories_and_unread() {
    let mut work = Chat::new(5, "Release Train");
    work.unread = true;
    let mut categorized = HashMap::new();
    categorized.insert("Work".to_string(), vec![work.clone()]);
    categorized.insert("Family".to_string(), vec![Chat::new(7, "Sunday Dinner")]);
    let store = ChatStore::from_collections(ChatCollections {
        unread: vec![work],
        direct_messages: vec![Chat::new(1, "John Doe")],
        categorized,
        uncategorized: vec![Chat::new(2, "Jane Smith")],
        categories: vec!["Work".to_string(), "Family".to_string()],
    });

    let view = view_for(&store, "");
    let ids: Vec<SectionId> = view.sections().iter().map(|s| s.id.clone()).collect();
    assert_eq!(
        ids,
        vec![
            SectionId::Unread,
            SectionId::DirectMessages,
            SectionId::for_category("Work"),
            SectionId::for_category("Family"),
            SectionId::Uncategorized,
        ]
    );
}

#[test]
fn test_filter_matches_search_module() {
    let store = two_chat_store();
    let all: Vec<Chat> = store
        .direct_messages()
        .iter()
        .chain(store.uncategorized())
        .cloned()
        .collect();
    let kept: Vec<&str> = search::filter(&all, "  SMITH ")
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(kept, vec!["Jane Smith"]);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_select_emits_and_marks_row() {
    let store = two_chat_store();
    let mut state = SelectionState::default();
    let (controller, mut rx) = SelectionController::channel();

    assert!(controller.select(&store, &mut state, &ChatId::from(2)));
    assert_eq!(state.selected_chat_id, Some(ChatId::from(2)));
    assert_eq!(
        rx.try_recv().unwrap(),
        ChatEvent::Selected(ChatSelected {
            chat_id: ChatId::from(2),
            chat_name: "Jane Smith".to_string(),
            is_online: false,
        })
    );

    let view = sidebar::render(&store, &state);
    let selected: Vec<&ChatId> = view
        .rows()
        .filter(|r| r.is_selected)
        .map(|r| &r.chat_id)
        .collect();
    assert_eq!(selected, vec![&ChatId::from(2)]);
}

#[test]
fn test_select_unknown_changes_nothing() {
    let store = two_chat_store();
    let mut state = SelectionState::default();
    let (controller, mut rx) = SelectionController::channel();
    controller.select(&store, &mut state, &ChatId::from(1));
    rx.try_recv().unwrap();

    assert!(!controller.select(&store, &mut state, &ChatId::from(42)));
    assert_eq!(state.selected_chat_id, Some(ChatId::from(1)));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_rename_updates_sidebar_and_emits() {
    let mut store = two_chat_store();
    let (controller, mut rx) = SelectionController::channel();

    assert!(controller.rename(&mut store, &ChatId::from(1), "Johnny"));
    assert_eq!(
        rx.try_recv().unwrap(),
        ChatEvent::Nickname(ChatNickname {
            chat_id: ChatId::from(1),
            chat_name: "John Doe".to_string(),
            new_name: "Johnny".to_string(),
        })
    );

    let view = view_for(&store, "johnny");
    assert_eq!(headers(&view), vec!["Direct Messages (1)"]);
}

#[test]
fn test_collapse_keeps_count_and_hides_rows() {
    let store = two_chat_store();
    let mut state = SelectionState::default();
    state.toggle_collapsed(&SectionId::Uncategorized);

    let view = sidebar::render(&store, &state);
    let section = view.section(&SectionId::Uncategorized).unwrap();
    assert!(section.collapsed);
    assert!(section.rows.is_empty());
    assert_eq!(section.header(), "Uncategorized (1)");
}
