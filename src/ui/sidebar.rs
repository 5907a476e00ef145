use crate::app::{App, Focus};
use crate::search::AnnotatedText;
use crate::sidebar::{Row, SidebarView, NO_RESULTS_TEXT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::render::clean_line;

/// Render the search box and the sectioned chat list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_search_box(f, app, chunks[0]);
    render_list(f, app, chunks[1]);
}

fn render_search_box(f: &mut Frame, app: &App, area: Rect) {
    let term = clean_line(&app.selection.search_term);
    let (text, style) = if app.search_mode {
        (format!("{}_", term), Style::default().fg(Color::White))
    } else if term.is_empty() {
        ("Search chats (/)".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (term, Style::default().fg(Color::Yellow))
    };

    let border_style = if app.search_mode {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title("Search"),
    );
    f.render_widget(paragraph, area);
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Sidebar && !app.search_mode;
    let view = app.sidebar_view();

    let items: Vec<ListItem> = match &view {
        SidebarView::NoResults => vec![ListItem::new(Span::styled(
            NO_RESULTS_TEXT,
            Style::default().fg(Color::DarkGray),
        ))],
        SidebarView::Sections(sections) if sections.is_empty() => {
            vec![ListItem::new(Span::styled(
                "No chats",
                Style::default().fg(Color::DarkGray),
            ))]
        }
        SidebarView::Sections(sections) => sections
            .iter()
            .flat_map(|section| {
                let arrow = if section.collapsed { "▸ " } else { "▾ " };
                let header = ListItem::new(Line::from(vec![
                    Span::raw(arrow),
                    Span::styled(
                        clean_line(&section.header()),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]));
                std::iter::once(header).chain(section.rows.iter().map(row_item))
            })
            .collect(),
    };

    let mut state = ListState::default();
    if !view.sections().is_empty() {
        state.select(Some(app.sidebar_cursor));
    }

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = format!("Chats ({})", view.rows().count());
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    f.render_stateful_widget(list, area, &mut state);
}

fn row_item(row: &Row) -> ListItem<'static> {
    let mut spans = vec![Span::raw("  ")];

    spans.push(if row.is_online {
        Span::styled("● ", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ ", Style::default().fg(Color::DarkGray))
    });

    if row.is_pinned {
        spans.push(Span::styled("📌", Style::default().fg(Color::Yellow)));
    }

    let base = if row.is_selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if row.unread {
        Style::default().add_modifier(Modifier::BOLD)
    } else if row.is_muted {
        Style::default().fg(Color::Gray)
    } else {
        Style::default()
    };
    spans.extend(title_spans(&row.title, base));

    if row.is_muted {
        spans.push(Span::styled(" (muted)", Style::default().fg(Color::DarkGray)));
    }

    ListItem::new(Line::from(spans))
}

/// Plain segments in `base`, matches in black on yellow.
fn title_spans(title: &AnnotatedText, base: Style) -> Vec<Span<'static>> {
    title
        .segments()
        .iter()
        .map(|segment| {
            let text = clean_line(&segment.text);
            if segment.highlighted {
                Span::styled(text, base.bg(Color::Yellow).fg(Color::Black))
            } else {
                Span::styled(text, base)
            }
        })
        .collect()
}
