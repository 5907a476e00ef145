//! Render functions for the TUI.
//!
//! Lays out the sidebar next to the conversation (header, thread, composer)
//! above a one-line status bar, then draws any open overlay on top.

use crate::app::{App, ConfirmAction, MenuSource, MenuSubState};
use crate::util::single_line;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{composer, header, help, messages, sidebar, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

/// Host text made safe for a single terminal line.
pub(super) fn clean_line(text: &str) -> String {
    single_line(text).into_owned()
}

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    let conversation = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(columns[1]);

    sidebar::render(f, app, columns[0]);
    header::render(f, app, conversation[0]);
    messages::render(f, app, conversation[1]);
    composer::render(f, app, conversation[2]);
    status::render(f, app, rows[1]);

    if app.show_help {
        help::render(f, app);
    }

    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, confirm);
    }

    if app.menu.is_some() {
        render_menu_overlay(f, app, columns[0], conversation[0]);
    }
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, confirm: &ConfirmAction) {
    let area = f.area();

    let text = match confirm {
        ConfirmAction::LeaveChat { title, .. } => format!(
            "Leave \"{}\"?\n\nThe chat is removed from your list.\n\n(y) Confirm  (n/Esc) Cancel",
            clean_line(title)
        ),
        ConfirmAction::DeleteMessage { preview, .. } => format!(
            "Delete message?\n\n\"{}\"\n\n(y) Confirm  (n/Esc) Cancel",
            clean_line(preview)
        ),
    };

    let width = 50u16.min(area.width.saturating_sub(4));
    let height = 7u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center);

    f.render_widget(paragraph, overlay);
}

/// Render the chat dropdown next to where it was opened.
///
/// Row menus drop down from the sidebar, header menus from the header's
/// right edge.
fn render_menu_overlay(f: &mut Frame, app: &App, sidebar_area: Rect, header_area: Rect) {
    let Some(menu) = &app.menu else {
        return;
    };

    let (title, text) = match &menu.sub_state {
        MenuSubState::Main => {
            let items = menu
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    if i == menu.selected_item {
                        format!("> {}", item.label)
                    } else {
                        format!("  {}", item.label)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            (
                format!(" {} ", clean_line(&menu.chat_title)),
                format!("{}\n\n(Enter) Select  (Esc) Close", items),
            )
        }
        MenuSubState::Nickname { input } => (
            " Nickname ".to_string(),
            format!(
                "New name:\n\n> {}_\n\n(Enter) Save  (Esc) Back",
                clean_line(input)
            ),
        ),
    };

    let area = f.area();
    let content_lines = text.lines().count() as u16 + 2;
    let width = 34u16.min(area.width.saturating_sub(4));
    let height = content_lines.min(area.height.saturating_sub(2));
    let (x, y) = match menu.source {
        MenuSource::Row => (
            sidebar_area.x + sidebar_area.width.saturating_sub(width) / 2,
            sidebar_area.y + 3,
        ),
        MenuSource::Header => (
            (header_area.x + header_area.width).saturating_sub(width + 1),
            header_area.y + header_area.height,
        ),
    };
    let overlay = Rect::new(x, y, width, height).intersection(area);

    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );

    f.render_widget(paragraph, overlay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::host::FixtureHost;
    use crate::selection::SelectionController;
    use crate::store::{Chat, ChatCollections, ChatId};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app() -> App {
        let (controller, _rx) = SelectionController::channel();
        let mut app = App::new(Arc::new(FixtureHost::seeded()), Config::default(), controller);
        let mut john = Chat::new(1, "John Doe");
        john.is_online = true;
        app.apply_loaded(
            app.load_generation,
            ChatCollections {
                direct_messages: vec![john],
                ..ChatCollections::default()
            },
        );
        app
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_small_terminal_message() {
        let mut app = app();
        let screen = draw(&mut app, 40, 8);
        assert!(screen.contains("Terminal too small"));
    }

    #[test]
    fn test_main_layout_shows_sidebar_and_placeholders() {
        let mut app = app();
        let screen = draw(&mut app, 100, 24);
        assert!(screen.contains("Direct Messages (1)"));
        assert!(screen.contains("John Doe"));
        assert!(screen.contains("Select a chat"));
        assert!(screen.contains("No messages yet"));
    }

    #[test]
    fn test_no_results_placeholder() {
        let mut app = app();
        app.selection.search_term = "zzz".to_string();
        let screen = draw(&mut app, 100, 24);
        // The sidebar is narrower than the full placeholder.
        assert!(screen.contains("No chats found"));
    }

    #[test]
    fn test_menu_overlay_lists_actions() {
        let mut app = app();
        app.select_chat(&ChatId::from(1));
        app.open_header_menu();
        let screen = draw(&mut app, 100, 24);
        assert!(screen.contains("> Mark as Read"));
        assert!(screen.contains("Leave"));
    }
}
