//! Input handling for the TUI.
//!
//! Routes key presses to overlays first (help, confirmation, dropdown), then
//! to search or composer text entry, then to panel navigation.

use crate::app::{App, AppEvent, ConfirmAction, Focus, MenuSubState};
use crate::sidebar::ChatAction;
use crossterm::event::{KeyCode, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::helpers::{spawn_delete_message, spawn_mark_read, spawn_send_message};
use super::Action;

/// Maximum length of nickname and composer input.
const MAX_INPUT_LENGTH: usize = 4096;
const MAX_NICKNAME_LENGTH: usize = 256;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return Action::Continue;
    }

    if app.pending_confirm.is_some() {
        handle_confirm_input(app, code, event_tx);
        return Action::Continue;
    }

    if app.menu.is_some() {
        handle_menu_input(app, code, event_tx);
        return Action::Continue;
    }

    if app.search_mode {
        handle_search_input(app, code);
        return Action::Continue;
    }

    if app.focus == Focus::Composer {
        handle_composer_input(app, code, event_tx);
        return Action::Continue;
    }

    handle_browse_input(app, code, modifiers, event_tx)
}

fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('f') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_mode = true;
            app.focus = Focus::Sidebar;
        }
        KeyCode::Char('/') => {
            app.search_mode = true;
            app.focus = Focus::Sidebar;
        }
        KeyCode::Esc => {
            if !app.selection.search_term.is_empty() {
                app.clear_search();
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Enter | KeyCode::Char(' ') if app.focus == Focus::Sidebar => {
            app.activate_cursor();
        }
        KeyCode::Char('m') => {
            if !app.open_row_menu() {
                app.set_status("Move the cursor to a chat to open its menu");
            }
        }
        KeyCode::Char('M') => {
            app.open_header_menu();
        }
        KeyCode::Char('d') if app.focus == Focus::Messages => {
            if !app.request_delete_selected_message() {
                app.set_status("No message selected");
            }
        }
        KeyCode::Char('i') => {
            if app.selection.selected_chat_id.is_some() {
                app.focus = Focus::Composer;
            } else {
                app.set_status("Open a chat before sending");
            }
        }
        KeyCode::Char('r') => {
            app.set_status("Reloading chats...");
            app.start_loading(event_tx);
        }
        KeyCode::Char('?') => app.show_help = true,
        _ => {}
    }
    Action::Continue
}

/// Search box: typing filters live, Enter opens the first visible chat.
fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.clear_search(),
        KeyCode::Enter => {
            app.search_mode = false;
            if !app.select_first_visible() {
                app.set_status("No chats match your search");
            }
        }
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Char(c) => app.push_search_char(c),
        KeyCode::Down => app.nav_down(),
        KeyCode::Up => app.nav_up(),
        _ => {}
    }
}

fn handle_composer_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Esc => app.focus = Focus::Sidebar,
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Enter => {
            if let Some((chat_id, text)) = app.take_composer_message() {
                tracing::debug!(chat_id = %chat_id, len = text.len(), "Sending message");
                spawn_send_message(
                    Arc::clone(&app.host),
                    chat_id,
                    text,
                    app.config.user_id.clone(),
                    event_tx.clone(),
                );
            }
        }
        KeyCode::Backspace => {
            app.composer_input.pop();
        }
        KeyCode::Char(c) => {
            if app.composer_input.len() < MAX_INPUT_LENGTH {
                app.composer_input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_confirm_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => match app.pending_confirm.take() {
            Some(ConfirmAction::LeaveChat { chat_id, .. }) => {
                app.leave_chat(&chat_id);
            }
            Some(ConfirmAction::DeleteMessage { message_id, .. }) => {
                app.set_status("Deleting message...");
                spawn_delete_message(Arc::clone(&app.host), message_id, event_tx.clone());
            }
            None => {}
        },
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.pending_confirm = None;
            app.set_status("Cancelled");
        }
        _ => {}
    }
}

fn handle_menu_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    // Take ownership temporarily to match on sub_state
    let Some(mut menu) = app.menu.take() else {
        return;
    };

    match menu.sub_state {
        MenuSubState::Main => match code {
            KeyCode::Char('k') | KeyCode::Up => {
                menu.selected_item = menu.selected_item.saturating_sub(1);
                app.menu = Some(menu);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                menu.selected_item =
                    (menu.selected_item + 1).min(menu.items.len().saturating_sub(1));
                app.menu = Some(menu);
            }
            KeyCode::Enter => {
                let Some(item) = menu.items.get(menu.selected_item).copied() else {
                    return;
                };
                match item.action {
                    ChatAction::MarkAsRead => {
                        app.set_status(format!("Marking {} as read...", menu.chat_title));
                        spawn_mark_read(Arc::clone(&app.host), menu.chat_id, event_tx.clone());
                    }
                    ChatAction::Nickname => {
                        menu.sub_state = MenuSubState::Nickname {
                            input: menu.chat_title.clone(),
                        };
                        app.menu = Some(menu);
                    }
                    action => {
                        app.apply_local_action(action, &menu.chat_id);
                    }
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => {}
            _ => app.menu = Some(menu),
        },
        MenuSubState::Nickname { ref mut input } => match code {
            KeyCode::Char(c) => {
                if input.chars().count() < MAX_NICKNAME_LENGTH {
                    input.push(c);
                }
                app.menu = Some(menu);
            }
            KeyCode::Backspace => {
                input.pop();
                app.menu = Some(menu);
            }
            KeyCode::Enter => {
                let name = input.clone();
                if !app.rename_chat(&menu.chat_id, &name) {
                    app.menu = Some(menu);
                }
            }
            KeyCode::Esc => {
                menu.sub_state = MenuSubState::Main;
                app.menu = Some(menu);
            }
            _ => app.menu = Some(menu),
        },
    }
}
