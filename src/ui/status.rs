use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

use super::loop_runner::SPINNER_FRAMES;

const SPINNER: [char; SPINNER_FRAMES] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if let Some(banner) = app.load_banner() {
        Cow::Owned(format!(
            "{} {}",
            SPINNER[app.spinner_frame % SPINNER_FRAMES],
            banner
        ))
    } else {
        Cow::Borrowed(hints(app))
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}

fn hints(app: &App) -> &'static str {
    if app.search_mode {
        return "Type to search | ESC clear | ENTER open first match";
    }
    match app.focus {
        Focus::Sidebar => "[j/k]move [Enter]open [m]enu [/]search [i]write [Tab]focus [?]help [q]uit",
        Focus::Messages => "[j/k]move [d]elete [M]enu [i]write [Tab]focus [?]help [q]uit",
        Focus::Composer => "Type a message | ENTER send | ESC back",
    }
}
