use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::render::clean_line;

/// Render the conversation header: title, presence and the menu hint.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let header = &app.header;

    let mut spans = Vec::new();
    if header.chat_id.is_some() {
        spans.push(if header.is_online {
            Span::styled("● ", Style::default().fg(Color::Green))
        } else {
            Span::styled("○ ", Style::default().fg(Color::DarkGray))
        });
    }
    spans.push(Span::styled(
        clean_line(&header.title),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    if header.chat_id.is_some() {
        let presence = if header.is_online { "  online" } else { "  offline" };
        spans.push(Span::styled(presence, Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled("  [M] menu", Style::default().fg(Color::DarkGray)));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
