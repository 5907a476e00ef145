use crate::config::Config;
use crate::host::HostApi;
use crate::loader::DataLoader;
use crate::selection::{ChatEvent, SelectionController, SelectionState};
use crate::sidebar::{self, ChatAction, MenuItem, SidebarLine, SidebarView};
use crate::store::{ChatCollections, ChatId, ChatStore, Message, MessageId};
use crate::thread::{self, HeaderView, MessagePane};
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Which panel receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Messages,
    Composer,
}

/// Progress of the chat list load, shown in the status bar until loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    WaitingForHost,
    Loading,
    Retrying { attempt: u32, error: String },
    Loaded,
}

// ============================================================================
// Confirmation Dialog
// ============================================================================

/// Pending confirmation for destructive operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    LeaveChat { chat_id: ChatId, title: String },
    DeleteMessage { message_id: MessageId, preview: String },
}

// ============================================================================
// Dropdown Menu State
// ============================================================================

/// Where a dropdown was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSource {
    Row,
    Header,
}

/// Open per-chat dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub chat_id: ChatId,
    pub chat_title: String,
    pub source: MenuSource,
    pub items: Vec<MenuItem>,
    pub selected_item: usize,
    pub sub_state: MenuSubState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuSubState {
    Main,
    /// Editing a nickname for the chat.
    Nickname { input: String },
}

/// Events from background tasks.
///
/// Host action results carry `Err(message)` both for transport errors and
/// for `{ok: false}` responses.
#[derive(Debug)]
pub enum AppEvent {
    HostReady {
        generation: u64,
    },
    ChatsLoaded {
        generation: u64,
        data: ChatCollections,
    },
    LoadFailed {
        generation: u64,
        attempt: u32,
        error: String,
    },
    MessagesLoaded {
        chat_id: ChatId,
        generation: u64,
        result: Result<Vec<Message>, String>,
    },
    MarkedRead {
        chat_id: ChatId,
        result: Result<(), String>,
    },
    MessageSent {
        chat_id: ChatId,
        text: String,
        result: Result<(), String>,
    },
    MessageDeleted {
        message_id: MessageId,
        result: Result<(), String>,
    },
    /// A background task panicked.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state. Only the UI task touches it.
pub struct App {
    pub host: Arc<dyn HostApi>,
    pub config: Config,
    pub loader: DataLoader,

    // Data
    pub store: ChatStore,
    pub selection: SelectionState,
    pub controller: SelectionController,

    // UI State
    pub focus: Focus,
    pub search_mode: bool,
    /// Index into `SidebarView::lines()`.
    pub sidebar_cursor: usize,
    pub header: HeaderView,
    pub messages: MessagePane,
    pub selected_message: usize,
    pub composer_input: String,
    pub load_state: LoadState,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub show_help: bool,
    /// Frame of the loading spinner, advanced on each tick while loading.
    pub spinner_frame: usize,
    /// Sequence for ids of locally echoed sends.
    local_echo_seq: u64,

    /// Skip frame renders when nothing changed.
    pub needs_redraw: bool,

    pub pending_confirm: Option<ConfirmAction>,
    pub menu: Option<MenuState>,

    /// Generation of the latest chat load. Older `ChatsLoaded` events are dropped.
    pub load_generation: u64,
    pub load_handle: Option<JoinHandle<()>>,

    /// Generation of the latest thread fetch. Older `MessagesLoaded` events are dropped.
    pub messages_generation: u64,
    pub messages_handle: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(host: Arc<dyn HostApi>, config: Config, controller: SelectionController) -> Self {
        let loader = DataLoader::new(Arc::clone(&host), &config);
        Self {
            host,
            config,
            loader,
            store: ChatStore::new(),
            selection: SelectionState::default(),
            controller,
            focus: Focus::Sidebar,
            search_mode: false,
            sidebar_cursor: 0,
            header: HeaderView::none(),
            messages: MessagePane::Empty,
            selected_message: 0,
            composer_input: String::new(),
            load_state: LoadState::WaitingForHost,
            status_message: None,
            show_help: false,
            spinner_frame: 0,
            local_echo_seq: 0,
            needs_redraw: true,
            pending_confirm: None,
            menu: None,
            load_generation: 0,
            load_handle: None,
            messages_generation: 0,
            messages_handle: None,
        }
    }

    pub fn sidebar_view(&self) -> SidebarView {
        sidebar::render(&self.store, &self.selection)
    }

    /// Line under the sidebar cursor.
    pub fn cursor_line(&self) -> Option<SidebarLine> {
        self.sidebar_view().lines().into_iter().nth(self.sidebar_cursor)
    }

    fn clamp_cursor(&mut self) {
        let len = self.sidebar_view().lines().len();
        self.sidebar_cursor = self.sidebar_cursor.min(len.saturating_sub(1));
    }

    fn clamp_selected_message(&mut self) {
        let len = self.messages.messages().len();
        self.selected_message = self.selected_message.min(len.saturating_sub(1));
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Start a fresh chat load, superseding any load in flight.
    pub fn start_loading(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted previous chat load");
        }
        self.load_generation = self.load_generation.wrapping_add(1);
        self.load_state = LoadState::WaitingForHost;
        tracing::debug!(generation = self.load_generation, "Starting chat load");
        self.load_handle = Some(self.loader.start(self.load_generation, event_tx.clone()));
    }

    fn is_current_load(&self, generation: u64, event: &'static str) -> bool {
        if generation != self.load_generation {
            tracing::debug!(
                generation,
                current = self.load_generation,
                event,
                "Dropping stale load event"
            );
            return false;
        }
        true
    }

    pub fn on_host_ready(&mut self, generation: u64) {
        if self.is_current_load(generation, "HostReady") {
            self.load_state = LoadState::Loading;
        }
    }

    pub fn on_load_failed(&mut self, generation: u64, attempt: u32, error: String) {
        if self.is_current_load(generation, "LoadFailed") {
            self.load_state = LoadState::Retrying { attempt, error };
        }
    }

    /// Commit a completed load. Returns `false` for a superseded generation.
    ///
    /// An open chat that no longer exists is closed.
    pub fn apply_loaded(&mut self, generation: u64, data: ChatCollections) -> bool {
        if !self.is_current_load(generation, "ChatsLoaded") {
            return false;
        }
        self.store.replace_all(data);
        self.load_state = LoadState::Loaded;
        self.load_handle = None;

        if let Some(id) = self.selection.selected_chat_id.clone() {
            if !self.store.contains(&id) {
                tracing::debug!(chat_id = %id, "Open chat vanished after reload");
                self.close_chat();
            }
        }
        self.clamp_cursor();
        true
    }

    /// Whether a chat load or thread fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.load_state != LoadState::Loaded || matches!(self.messages, MessagePane::Loading { .. })
    }

    /// Status bar text while the chat list is not loaded yet.
    pub fn load_banner(&self) -> Option<String> {
        match &self.load_state {
            LoadState::WaitingForHost => Some("Waiting for host\u{2026}".to_string()),
            LoadState::Loading => Some("Loading chats\u{2026}".to_string()),
            LoadState::Retrying { attempt, error } => Some(format!(
                "Failed to load chats (attempt {}): {}. Retrying in {}s",
                attempt,
                error,
                self.config.retry_delay().as_secs_f32()
            )),
            LoadState::Loaded => None,
        }
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    pub fn push_search_char(&mut self, c: char) {
        if self.selection.search_term.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
            self.set_status(format!(
                "Search query too long (max {} chars)",
                MAX_SEARCH_QUERY_LENGTH
            ));
            return;
        }
        self.selection.search_term.push(c);
        self.sidebar_cursor = 0;
    }

    pub fn pop_search_char(&mut self) {
        self.selection.search_term.pop();
        self.sidebar_cursor = 0;
    }

    pub fn clear_search(&mut self) {
        self.selection.search_term.clear();
        self.search_mode = false;
        self.clamp_cursor();
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Sidebar => self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1),
            Focus::Messages => self.selected_message = self.selected_message.saturating_sub(1),
            Focus::Composer => {}
        }
    }

    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Sidebar => {
                let len = self.sidebar_view().lines().len();
                if len > 0 {
                    self.sidebar_cursor = self.sidebar_cursor.saturating_add(1).min(len - 1);
                }
            }
            Focus::Messages => {
                let len = self.messages.messages().len();
                if len > 0 {
                    self.selected_message = self.selected_message.saturating_add(1).min(len - 1);
                }
            }
            Focus::Composer => {}
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Messages,
            Focus::Messages => Focus::Composer,
            Focus::Composer => Focus::Sidebar,
        };
    }

    /// Enter on the sidebar: toggle a header or open a chat.
    pub fn activate_cursor(&mut self) -> bool {
        match self.cursor_line() {
            Some(SidebarLine::Header(id)) => {
                let collapsed = self.selection.toggle_collapsed(&id);
                tracing::debug!(section = %id, collapsed, "Toggled section");
                self.clamp_cursor();
                true
            }
            Some(SidebarLine::Row(chat_id)) => self.select_chat(&chat_id),
            None => false,
        }
    }

    pub fn select_chat(&mut self, chat_id: &ChatId) -> bool {
        self.controller
            .select(&self.store, &mut self.selection, chat_id)
    }

    /// Open the first row the sidebar currently shows.
    pub fn select_first_visible(&mut self) -> bool {
        let view = self.sidebar_view();
        let Some(chat_id) = view.first_row().map(|row| row.chat_id.clone()) else {
            return false;
        };
        if let Some(pos) = view
            .lines()
            .iter()
            .position(|line| line == &SidebarLine::Row(chat_id.clone()))
        {
            self.sidebar_cursor = pos;
        }
        self.select_chat(&chat_id)
    }

    fn close_chat(&mut self) {
        self.selection.selected_chat_id = None;
        self.header = HeaderView::none();
        self.messages = MessagePane::Empty;
        self.selected_message = 0;
        if let Some(handle) = self.messages_handle.take() {
            handle.abort();
        }
    }

    // ------------------------------------------------------------------------
    // Chat events
    // ------------------------------------------------------------------------

    /// React to a selection or nickname notification.
    ///
    /// Returns the chat whose thread should be fetched.
    pub fn on_chat_event(&mut self, event: ChatEvent) -> Option<ChatId> {
        match event {
            ChatEvent::Selected(selected) => {
                self.header = HeaderView::named(
                    selected.chat_id.clone(),
                    &selected.chat_name,
                    selected.is_online,
                );
                Some(selected.chat_id)
            }
            ChatEvent::Nickname(nickname) => {
                if self.header.chat_id.as_ref() == Some(&nickname.chat_id) {
                    self.header = HeaderView::named(
                        nickname.chat_id.clone(),
                        &nickname.new_name,
                        self.header.is_online,
                    );
                }
                self.set_status(format!(
                    "Renamed \"{}\" to \"{}\"",
                    nickname.chat_name, nickname.new_name
                ));
                None
            }
        }
    }

    /// Mark the thread of `chat_id` as loading. Returns the fetch generation.
    pub fn begin_messages_load(&mut self, chat_id: ChatId) -> u64 {
        if let Some(handle) = self.messages_handle.take() {
            handle.abort();
            tracing::debug!("Aborted previous messages load");
        }
        self.messages_generation = self.messages_generation.wrapping_add(1);
        self.messages = MessagePane::Loading { chat_id };
        self.messages_generation
    }

    /// Refetch the loaded thread in place, keeping it on screen meanwhile.
    pub fn begin_messages_refresh(&mut self) -> Option<(ChatId, u64)> {
        let MessagePane::Loaded { chat_id, .. } = &self.messages else {
            return None;
        };
        let chat_id = chat_id.clone();
        if let Some(handle) = self.messages_handle.take() {
            handle.abort();
        }
        self.messages_generation = self.messages_generation.wrapping_add(1);
        Some((chat_id, self.messages_generation))
    }

    pub fn apply_messages(
        &mut self,
        chat_id: ChatId,
        generation: u64,
        result: Result<Vec<Message>, String>,
    ) -> bool {
        if generation != self.messages_generation
            || self.messages.chat_id() != Some(&chat_id)
        {
            tracing::debug!(chat_id = %chat_id, generation, "Dropping stale messages");
            return false;
        }
        self.messages_handle = None;
        let mut messages = match result {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, error = %e, "Failed to load messages");
                self.set_status(format!("Failed to load messages: {}", e));
                Vec::new()
            }
        };
        thread::sort_messages(&mut messages);
        self.selected_message = messages.len().saturating_sub(1);
        self.messages = MessagePane::Loaded { chat_id, messages };
        true
    }

    // ------------------------------------------------------------------------
    // Dropdown menus
    // ------------------------------------------------------------------------

    fn open_menu(&mut self, chat_id: &ChatId, source: MenuSource) -> bool {
        let Some(chat) = self.store.find_by_id(chat_id) else {
            return false;
        };
        self.menu = Some(MenuState {
            chat_id: chat.id.clone(),
            chat_title: chat.title.clone(),
            source,
            items: sidebar::menu_for(chat),
            selected_item: 0,
            sub_state: MenuSubState::Main,
        });
        true
    }

    /// Dropdown for the row under the cursor.
    pub fn open_row_menu(&mut self) -> bool {
        match self.cursor_line() {
            Some(SidebarLine::Row(chat_id)) => self.open_menu(&chat_id, MenuSource::Row),
            _ => false,
        }
    }

    /// Dropdown for the open chat.
    pub fn open_header_menu(&mut self) -> bool {
        match self.selection.selected_chat_id.clone() {
            Some(chat_id) => self.open_menu(&chat_id, MenuSource::Header),
            None => {
                self.set_status("No chat open");
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Local chat actions
    // ------------------------------------------------------------------------

    /// Apply an action that needs no host round trip.
    ///
    /// Returns `false` for host-backed actions and for unknown chats.
    pub fn apply_local_action(&mut self, action: ChatAction, chat_id: &ChatId) -> bool {
        let Some(chat) = self.store.find_by_id(chat_id) else {
            return false;
        };
        let title = chat.title.clone();
        let (pinned, muted) = (chat.is_pinned, chat.is_muted);

        match action {
            ChatAction::TogglePin => {
                self.store.set_pinned(chat_id, !pinned);
                self.set_status(if pinned {
                    format!("Unpinned {}", title)
                } else {
                    format!("Pinned {}", title)
                });
            }
            ChatAction::ToggleMute => {
                self.store.set_muted(chat_id, !muted);
                self.set_status(if muted {
                    format!("Unmuted {}", title)
                } else {
                    format!("Muted {}", title)
                });
            }
            ChatAction::Hide => {
                self.store.set_hidden(chat_id, true);
                self.set_status(format!("Hid {}", title));
            }
            ChatAction::Leave => {
                self.pending_confirm = Some(ConfirmAction::LeaveChat {
                    chat_id: chat_id.clone(),
                    title,
                });
            }
            ChatAction::Nickname | ChatAction::MarkAsRead => return false,
        }
        tracing::debug!(chat_id = %chat_id, ?action, "Applied chat action");
        self.clamp_cursor();
        true
    }

    pub fn rename_chat(&mut self, chat_id: &ChatId, new_name: &str) -> bool {
        if new_name.trim().is_empty() {
            self.set_status("Nickname cannot be empty");
            return false;
        }
        let renamed = self.controller.rename(&mut self.store, chat_id, new_name);
        if !renamed {
            self.set_status("Chat no longer exists");
        }
        renamed
    }

    /// Remove a chat after the user confirmed leaving it.
    pub fn leave_chat(&mut self, chat_id: &ChatId) -> bool {
        let title = self.store.find_by_id(chat_id).map(|c| c.title.clone());
        if !self.store.remove(chat_id) {
            return false;
        }
        if self.selection.is_selected(chat_id) {
            self.close_chat();
        }
        tracing::info!(chat_id = %chat_id, "Left chat");
        self.set_status(format!("Left {}", title.unwrap_or_default()));
        self.clamp_cursor();
        true
    }

    // ------------------------------------------------------------------------
    // Host-backed action results
    // ------------------------------------------------------------------------

    /// Mark-as-read result. The store changes only on success.
    pub fn apply_marked_read(&mut self, chat_id: &ChatId, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.store.mark_read(chat_id);
                let title = self
                    .store
                    .find_by_id(chat_id)
                    .map(|c| c.title.clone())
                    .unwrap_or_else(|| chat_id.to_string());
                self.set_status(format!("Marked {} as read", title));
                self.clamp_cursor();
            }
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, error = %e, "Mark as read failed");
                self.set_status(format!("Failed to mark as read: {}", e));
            }
        }
    }

    /// Validate and take the composer text for sending.
    pub fn take_composer_message(&mut self) -> Option<(ChatId, String)> {
        let text = thread::compose(&self.composer_input)?;
        let Some(chat_id) = self.selection.selected_chat_id.clone() else {
            self.set_status("Open a chat before sending");
            return None;
        };
        self.composer_input.clear();
        Some((chat_id, text))
    }

    /// Send result. On success the message is appended to the open thread;
    /// returns whether the thread should be refetched.
    pub fn apply_message_sent(
        &mut self,
        chat_id: ChatId,
        text: String,
        result: Result<(), String>,
    ) -> bool {
        match result {
            Ok(()) => {
                let MessagePane::Loaded {
                    chat_id: open,
                    messages,
                } = &mut self.messages
                else {
                    return false;
                };
                if open != &chat_id {
                    return false;
                }
                self.local_echo_seq += 1;
                let now = chrono::Utc::now().timestamp();
                messages.push(Message::new(
                    format!("pending-{}", self.local_echo_seq),
                    self.config.display_name.clone(),
                    text,
                    Some(now),
                ));
                self.selected_message = messages.len() - 1;
                true
            }
            Err(e) => {
                tracing::warn!(chat_id = %chat_id, error = %e, "Send failed");
                self.set_status(format!("Failed to send message: {}", e));
                if self.composer_input.is_empty() {
                    self.composer_input = text;
                }
                false
            }
        }
    }

    /// Ask before deleting the highlighted message.
    pub fn request_delete_selected_message(&mut self) -> bool {
        let Some(message) = self.messages.messages().get(self.selected_message) else {
            return false;
        };
        let preview = crate::util::truncate_to_width(&message.content, 40).into_owned();
        self.pending_confirm = Some(ConfirmAction::DeleteMessage {
            message_id: message.id.clone(),
            preview,
        });
        true
    }

    /// Delete result. The thread changes only on success.
    pub fn apply_message_deleted(&mut self, message_id: &MessageId, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.messages.remove_message(message_id);
                self.clamp_selected_message();
                self.set_status("Message deleted");
            }
            Err(e) => {
                tracing::warn!(message_id = %message_id, error = %e, "Delete failed");
                self.set_status(format!("Failed to delete message: {}", e));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// Abort in-flight tasks so nothing outlives the event loop.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted chat load task on App drop");
        }
        if let Some(handle) = self.messages_handle.take() {
            handle.abort();
            tracing::debug!("Aborted messages load task on App drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FixtureHost;
    use crate::selection::ChatSelected;
    use crate::sidebar::SectionId;
    use crate::store::Chat;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time::{self, Duration};

    fn collections() -> ChatCollections {
        let mut john = Chat::new(1, "John Doe");
        john.is_online = true;
        john.unread = true;
        ChatCollections {
            unread: vec![john.clone()],
            direct_messages: vec![john],
            uncategorized: vec![Chat::new(2, "Jane Smith")],
            ..ChatCollections::default()
        }
    }

    fn test_app() -> (App, UnboundedReceiver<ChatEvent>) {
        let (controller, rx) = SelectionController::channel();
        let mut app = App::new(
            Arc::new(FixtureHost::seeded()),
            Config::default(),
            controller,
        );
        assert!(app.apply_loaded(app.load_generation, collections()));
        (app, rx)
    }

    #[test]
    fn test_apply_loaded_rejects_stale_generation() {
        let (mut app, _rx) = test_app();
        app.load_generation = 5;
        assert!(!app.apply_loaded(4, ChatCollections::default()));
        assert!(app.store.contains(&ChatId::from(2)));
        assert!(app.apply_loaded(5, ChatCollections::default()));
        assert!(app.store.is_empty());
    }

    #[test]
    fn test_reload_closes_vanished_chat() {
        let (mut app, _rx) = test_app();
        assert!(app.select_chat(&ChatId::from(2)));
        app.on_chat_event(ChatEvent::Selected(ChatSelected {
            chat_id: ChatId::from(2),
            chat_name: "Jane Smith".to_string(),
            is_online: false,
        }));

        app.apply_loaded(app.load_generation, ChatCollections::default());
        assert!(app.selection.selected_chat_id.is_none());
        assert_eq!(app.header, HeaderView::none());
    }

    #[test]
    fn test_load_banner_tracks_state() {
        let (controller, _rx) = SelectionController::channel();
        let mut app = App::new(Arc::new(FixtureHost::seeded()), Config::default(), controller);
        assert_eq!(app.load_banner().as_deref(), Some("Waiting for host\u{2026}"));

        app.on_load_failed(0, 2, "boom".to_string());
        assert!(app.load_banner().unwrap().contains("attempt 2"));

        app.on_load_failed(9, 3, "stale".to_string());
        assert!(app.load_banner().unwrap().contains("attempt 2"));
    }

    #[test]
    fn test_activate_header_toggles_collapse() {
        let (mut app, _rx) = test_app();
        // Lines: [Unread], John, [DMs], John, [Uncategorized], Jane
        app.sidebar_cursor = 2;
        assert!(app.activate_cursor());
        assert!(app.selection.is_collapsed(&SectionId::DirectMessages));
        let view = app.sidebar_view();
        let dms = view.section(&SectionId::DirectMessages).unwrap();
        assert_eq!(dms.header(), "Direct Messages (1)");
        assert!(dms.rows.is_empty());
    }

    #[test]
    fn test_activate_row_selects_and_emits() {
        let (mut app, mut rx) = test_app();
        app.sidebar_cursor = 5;
        assert!(app.activate_cursor());
        assert!(app.selection.is_selected(&ChatId::from(2)));
        assert_eq!(
            rx.try_recv().unwrap(),
            ChatEvent::Selected(ChatSelected {
                chat_id: ChatId::from(2),
                chat_name: "Jane Smith".to_string(),
                is_online: false,
            })
        );
    }

    #[test]
    fn test_search_then_select_first_visible() {
        let (mut app, _rx) = test_app();
        for c in "jane".chars() {
            app.push_search_char(c);
        }
        assert!(app.select_first_visible());
        assert!(app.selection.is_selected(&ChatId::from(2)));
        assert_eq!(app.cursor_line(), Some(SidebarLine::Row(ChatId::from(2))));

        app.clear_search();
        assert!(app.selection.search_term.is_empty());
        assert!(!app.search_mode);
    }

    #[test]
    fn test_select_first_visible_with_no_results() {
        let (mut app, mut rx) = test_app();
        for c in "zzz".chars() {
            app.push_search_char(c);
        }
        assert!(app.sidebar_view().is_no_results());
        assert!(!app.select_first_visible());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_search_length_capped() {
        let (mut app, _rx) = test_app();
        for _ in 0..MAX_SEARCH_QUERY_LENGTH + 10 {
            app.push_search_char('a');
        }
        assert_eq!(app.selection.search_term.len(), MAX_SEARCH_QUERY_LENGTH);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_nickname_event_updates_header() {
        let (mut app, mut rx) = test_app();
        app.select_chat(&ChatId::from(1));
        let event = rx.try_recv().unwrap();
        assert_eq!(app.on_chat_event(event), Some(ChatId::from(1)));
        assert_eq!(app.header.title, "Chat with John Doe");

        assert!(app.rename_chat(&ChatId::from(1), "  Johnny  "));
        let event = rx.try_recv().unwrap();
        assert_eq!(app.on_chat_event(event), None);
        assert_eq!(app.header.title, "Chat with Johnny");
        assert!(app.header.is_online);
    }

    #[test]
    fn test_blank_nickname_rejected() {
        let (mut app, mut rx) = test_app();
        assert!(!app.rename_chat(&ChatId::from(1), "   "));
        assert!(rx.try_recv().is_err());
        assert_eq!(app.store.find_by_id(&ChatId::from(1)).unwrap().title, "John Doe");
        assert_eq!(app.status_message.as_ref().unwrap().0, "Nickname cannot be empty");
    }

    #[test]
    fn test_nickname_for_missing_chat_reports_it() {
        let (mut app, mut rx) = test_app();
        assert!(app.leave_chat(&ChatId::from(2)));
        assert!(!app.rename_chat(&ChatId::from(2), "Janey"));
        assert!(rx.try_recv().is_err());
        assert_eq!(app.status_message.as_ref().unwrap().0, "Chat no longer exists");
    }

    #[test]
    fn test_local_actions_apply_immediately() {
        let (mut app, _rx) = test_app();
        let id = ChatId::from(1);

        assert!(app.apply_local_action(ChatAction::TogglePin, &id));
        assert!(app.store.find_by_id(&id).unwrap().is_pinned);
        assert_eq!(
            ChatAction::TogglePin.label(app.store.find_by_id(&id).unwrap()),
            "Unpin"
        );

        assert!(app.apply_local_action(ChatAction::ToggleMute, &id));
        assert!(app.store.find_by_id(&id).unwrap().is_muted);

        assert!(app.apply_local_action(ChatAction::Hide, &ChatId::from(2)));
        assert!(app.sidebar_view().section(&SectionId::Uncategorized).is_none());

        assert!(!app.apply_local_action(ChatAction::MarkAsRead, &id));
        assert!(!app.apply_local_action(ChatAction::TogglePin, &ChatId::from(99)));
    }

    #[test]
    fn test_leave_requires_confirmation() {
        let (mut app, _rx) = test_app();
        let id = ChatId::from(2);
        app.select_chat(&id);

        assert!(app.apply_local_action(ChatAction::Leave, &id));
        assert!(app.store.contains(&id));
        assert!(matches!(
            app.pending_confirm,
            Some(ConfirmAction::LeaveChat { .. })
        ));

        assert!(app.leave_chat(&id));
        assert!(!app.store.contains(&id));
        assert!(app.selection.selected_chat_id.is_none());
        assert!(!app.leave_chat(&id));
    }

    #[test]
    fn test_mark_read_applies_only_on_success() {
        let (mut app, _rx) = test_app();
        let id = ChatId::from(1);

        app.apply_marked_read(&id, Err("host said no".to_string()));
        assert_eq!(app.store.unread().len(), 1);
        assert!(app.store.find_by_id(&id).unwrap().unread);

        app.apply_marked_read(&id, Ok(()));
        assert!(app.store.unread().is_empty());
        assert!(!app.store.find_by_id(&id).unwrap().unread);
        assert!(app.sidebar_view().section(&SectionId::Unread).is_none());
    }

    #[test]
    fn test_messages_generation_guard() {
        let (mut app, _rx) = test_app();
        let first = app.begin_messages_load(ChatId::from(1));
        let second = app.begin_messages_load(ChatId::from(2));
        assert_ne!(first, second);

        assert!(!app.apply_messages(ChatId::from(1), first, Ok(Vec::new())));
        assert!(matches!(app.messages, MessagePane::Loading { .. }));

        let messages = vec![
            Message::new(2, "Jane Smith", "second", Some(20)),
            Message::new(1, "Jane Smith", "first", Some(10)),
        ];
        assert!(app.apply_messages(ChatId::from(2), second, Ok(messages)));
        let contents: Vec<&str> = app
            .messages
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(app.selected_message, 1);
    }

    fn open_thread(app: &mut App, chat_id: i64) {
        let chat_id = ChatId::from(chat_id);
        app.select_chat(&chat_id);
        let generation = app.begin_messages_load(chat_id.clone());
        app.apply_messages(
            chat_id,
            generation,
            Ok(vec![Message::new(10, "Jane Smith", "hello", Some(10))]),
        );
    }

    #[test]
    fn test_composer_requires_open_chat_and_text() {
        let (mut app, _rx) = test_app();
        app.composer_input = "hi".to_string();
        assert_eq!(app.take_composer_message(), None);
        assert_eq!(app.composer_input, "hi");

        open_thread(&mut app, 2);
        app.composer_input = "   ".to_string();
        assert_eq!(app.take_composer_message(), None);

        app.composer_input = "  hi there ".to_string();
        assert_eq!(
            app.take_composer_message(),
            Some((ChatId::from(2), "hi there".to_string()))
        );
        assert!(app.composer_input.is_empty());
    }

    #[test]
    fn test_send_appends_only_on_success() {
        let (mut app, _rx) = test_app();
        open_thread(&mut app, 2);

        assert!(!app.apply_message_sent(ChatId::from(2), "oops".to_string(), Err("offline".to_string())));
        assert_eq!(app.messages.messages().len(), 1);
        assert_eq!(app.composer_input, "oops");

        app.composer_input.clear();
        assert!(app.apply_message_sent(ChatId::from(2), "hey".to_string(), Ok(())));
        let last = app.messages.messages().last().unwrap();
        assert_eq!(last.content, "hey");
        assert_eq!(last.author, "You");
    }

    #[test]
    fn test_local_echo_ids_are_unique() {
        let (mut app, _rx) = test_app();
        open_thread(&mut app, 2);

        assert!(app.apply_message_sent(ChatId::from(2), "one".to_string(), Ok(())));
        assert!(app.apply_message_sent(ChatId::from(2), "two".to_string(), Ok(())));
        let thread = app.messages.messages();
        let (one, two) = (thread[1].id.clone(), thread[2].id.clone());
        assert_ne!(one, two);

        app.messages.remove_message(&one);
        let contents: Vec<&str> = app
            .messages
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["hello", "two"]);
    }

    #[test]
    fn test_delete_removes_only_on_success() {
        let (mut app, _rx) = test_app();
        open_thread(&mut app, 2);

        assert!(app.request_delete_selected_message());
        let Some(ConfirmAction::DeleteMessage { message_id, preview }) = app.pending_confirm.clone()
        else {
            panic!("expected delete confirmation");
        };
        assert_eq!(preview, "hello");

        app.apply_message_deleted(&message_id, Err("forbidden".to_string()));
        assert_eq!(app.messages.messages().len(), 1);

        app.apply_message_deleted(&message_id, Ok(()));
        assert!(app.messages.messages().is_empty());
    }

    #[test]
    fn test_row_menu_uses_cursor_chat() {
        let (mut app, _rx) = test_app();
        app.sidebar_cursor = 0;
        assert!(!app.open_row_menu());

        app.sidebar_cursor = 5;
        assert!(app.open_row_menu());
        let menu = app.menu.as_ref().unwrap();
        assert_eq!(menu.chat_id, ChatId::from(2));
        assert_eq!(menu.source, MenuSource::Row);
        assert_eq!(menu.items.len(), 6);
    }

    #[test]
    fn test_header_menu_needs_open_chat() {
        let (mut app, _rx) = test_app();
        assert!(!app.open_header_menu());
        app.select_chat(&ChatId::from(1));
        assert!(app.open_header_menu());
        assert_eq!(app.menu.as_ref().unwrap().source, MenuSource::Header);
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let (mut app, _rx) = test_app();
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }
}
