//! Text helpers shared by the view models and the terminal widgets.

mod text;

pub use text::{display_width, single_line, strip_control_chars, truncate_to_width};

/// Maximum number of characters accepted in the sidebar search box.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
