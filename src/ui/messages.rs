use crate::app::{App, Focus};
use crate::thread::{self, ThreadEntry, ThreadView, EMPTY_HINT, EMPTY_TEXT, LOADING_TEXT};
use crate::util::strip_control_chars;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::loop_runner::SPINNER_FRAMES;
use super::render::clean_line;

const SPINNER: [&str; SPINNER_FRAMES] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the message thread of the open chat.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Messages;
    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("Messages");

    let view = thread::thread_view(&app.messages, &app.config.display_name, &chrono::Local);
    let entries = match view {
        ThreadView::Placeholder => {
            let text = Text::from(vec![
                Line::from(""),
                Line::from(Span::styled(EMPTY_TEXT, Style::default().add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(EMPTY_HINT, Style::default().fg(Color::DarkGray))),
            ]);
            let paragraph = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(paragraph, area);
            return;
        }
        ThreadView::Loading => {
            let spinner = SPINNER[app.spinner_frame % SPINNER_FRAMES];
            let paragraph = Paragraph::new(format!("\n{} {}", spinner, LOADING_TEXT))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(paragraph, area);
            return;
        }
        ThreadView::Entries(entries) => entries,
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| ListItem::new(entry_text(entry, inner_width)))
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.selected_message));

    let highlight = if is_focused {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };
    let list = List::new(items).block(block).highlight_style(highlight);
    f.render_stateful_widget(list, area, &mut state);
}

fn entry_text(entry: &ThreadEntry, width: usize) -> Text<'static> {
    let color = hue_color(entry.hue);
    let name_style = if entry.sent_by_me {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!(" {} ", entry.initials),
            Style::default().bg(color).fg(Color::Black),
        ),
        Span::raw(" "),
        Span::styled(clean_line(&entry.author), name_style),
        Span::styled(format!("  {}", entry.time), Style::default().fg(Color::DarkGray)),
    ])];

    let body = strip_control_chars(&entry.content);
    let mut body_lines: Vec<Line> = body
        .lines()
        .flat_map(|line| wrap(line, width.saturating_sub(2)))
        .map(|line| Line::from(format!("  {}", line)))
        .collect();
    if entry.edited {
        let edited = Span::styled(" (edited)", Style::default().fg(Color::DarkGray));
        match body_lines.last_mut() {
            Some(last) => last.spans.push(edited),
            None => body_lines.push(Line::from(vec![Span::raw("  "), edited])),
        }
    }
    lines.extend(body_lines);

    if !entry.reactions.is_empty() {
        let reactions = entry
            .reactions
            .iter()
            .map(|r| format!("{} {}", clean_line(&r.emoji), r.count))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::from(Span::styled(
            format!("  {}", reactions),
            Style::default().fg(Color::Yellow),
        )));
    }

    lines.push(Line::from(""));
    Text::from(lines)
}

/// Split one line into chunks of at most `width` columns on word boundaries.
fn wrap(line: &str, width: usize) -> Vec<String> {
    if width == 0 || crate::util::display_width(line) <= width {
        return vec![line.to_string()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split(' ') {
        let needed = crate::util::display_width(word) + usize::from(!current.is_empty());
        if !current.is_empty() && crate::util::display_width(&current) + needed > width {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    out.push(current);
    out
}

/// Avatar color for a `0..360` hue at fixed saturation and lightness.
fn hue_color(hue: u16) -> Color {
    const SATURATION: f32 = 0.6;
    const LIGHTNESS: f32 = 0.6;

    let h = f32::from(hue % 360) / 60.0;
    let c = (1.0 - (2.0 * LIGHTNESS - 1.0).abs()) * SATURATION;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = LIGHTNESS - c / 2.0;
    let channel = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb(channel(r), channel(g), channel(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MessageId, Reaction};

    fn entry(content: &str) -> ThreadEntry {
        ThreadEntry {
            id: MessageId::from(1),
            author: "John Doe".to_string(),
            initials: "JD".to_string(),
            hue: 120,
            sent_by_me: false,
            time: "09:30".to_string(),
            content: content.to_string(),
            edited: false,
            reactions: Vec::new(),
        }
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| &*s.content).collect()
    }

    #[test]
    fn test_hue_color_primaries() {
        assert_eq!(hue_color(0), Color::Rgb(214, 92, 92));
        assert_eq!(hue_color(120), Color::Rgb(92, 214, 92));
        assert_eq!(hue_color(240), Color::Rgb(92, 92, 214));
    }

    #[test]
    fn test_entry_marks_edits_and_reactions() {
        let mut e = entry("fixed it");
        e.edited = true;
        e.reactions = vec![Reaction {
            emoji: "👍".to_string(),
            count: 2,
        }];
        let text = entry_text(&e, 80);
        assert_eq!(plain(&text.lines[0]), " JD  John Doe  09:30");
        assert_eq!(plain(&text.lines[1]), "  fixed it (edited)");
        assert_eq!(plain(&text.lines[2]), "  👍 2");
    }

    #[test]
    fn test_entry_keeps_line_breaks_and_strips_escapes() {
        let text = entry_text(&entry("one\n\x1b[2Jtwo"), 80);
        assert_eq!(plain(&text.lines[1]), "  one");
        assert_eq!(plain(&text.lines[2]), "  two");
    }

    #[test]
    fn test_wrap_on_words() {
        assert_eq!(wrap("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap("short", 20), vec!["short"]);
    }
}
