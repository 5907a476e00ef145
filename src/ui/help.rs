//! Help overlay with the keybinding table.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

/// Bindings grouped by context, in display order.
const BINDINGS: [(&str, &[(&str, &str)]); 4] = [
    (
        "General",
        &[
            ("q / Ctrl+c", "Quit"),
            ("Tab", "Cycle focus"),
            ("r", "Reload chats"),
            ("?", "Toggle help"),
        ],
    ),
    (
        "Sidebar",
        &[
            ("j/k, Up/Down", "Move cursor"),
            ("Enter / Space", "Open chat or toggle section"),
            ("m", "Chat menu"),
            ("/ / Ctrl+f", "Search chats"),
            ("Esc", "Clear search"),
        ],
    ),
    (
        "Conversation",
        &[
            ("M", "Menu for open chat"),
            ("i", "Write a message"),
            ("d", "Delete selected message"),
            ("Enter", "Send (while writing)"),
        ],
    ),
    (
        "Search",
        &[
            ("Enter", "Open first match"),
            ("Esc", "Clear and close"),
        ],
    ),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, _app: &App) {
    let area = f.area();

    let overlay = centered_rect(70, 80, area);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut rows: Vec<Row> = Vec::new();
    for (label, bindings) in BINDINGS {
        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    format!("-- {} --", label),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
            .style(Style::default().fg(Color::Cyan)),
        );
        for (key, description) in bindings {
            rows.push(Row::new(vec![format!("  {}", key), description.to_string()]));
        }
        rows.push(Row::new(vec![String::new(), String::new()]));
    }
    rows.pop();

    let widths = [Constraint::Length(18), Constraint::Min(20)];
    let table = Table::new(rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (? to close) "),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        );

    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
