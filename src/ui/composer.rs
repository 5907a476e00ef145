use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::render::clean_line;

/// Render the message input box.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Composer;

    let (text, style) = if app.selection.selected_chat_id.is_none() {
        (
            "Select a chat to start messaging".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else if is_focused {
        (format!("{}_", clean_line(&app.composer_input)), Style::default())
    } else if app.composer_input.is_empty() {
        (
            "Type a message... (i)".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (clean_line(&app.composer_input), Style::default())
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    // Keep the end of long input in view
    let inner = area.width.saturating_sub(2) as usize;
    let scroll = crate::util::display_width(&text).saturating_sub(inner);
    let paragraph = Paragraph::new(text)
        .style(style)
        .scroll((0, scroll.min(u16::MAX as usize) as u16))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title("Message"),
        );
    f.render_widget(paragraph, area);
}
