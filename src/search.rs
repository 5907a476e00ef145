//! Chat title search: filtering and match highlighting.
//!
//! Both functions trim the term and compare per character after folding to
//! lowercase, so every title kept by [`filter`] has at least one highlighted
//! segment from [`highlight`]. The term is always literal text; characters
//! like `.` or `*` match themselves.

use crate::store::Chat;
use std::fmt;

/// A run of title text, either plain or part of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// Title text split into plain and highlighted segments.
///
/// Concatenating the segments in order always reproduces the original text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedText {
    segments: Vec<Segment>,
}

impl AnnotatedText {
    /// Unmarked text.
    pub fn plain(text: &str) -> Self {
        let mut annotated = Self::default();
        annotated.push(text, false);
        annotated
    }

    fn push(&mut self, text: &str, highlighted: bool) {
        if !text.is_empty() {
            self.segments.push(Segment {
                text: text.to_owned(),
                highlighted,
            });
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_highlight(&self) -> bool {
        self.segments.iter().any(|s| s.highlighted)
    }

    /// Text of each highlighted segment, left to right.
    pub fn highlighted(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter(|s| s.highlighted)
            .map(|s| s.text.as_str())
    }
}

impl fmt::Display for AnnotatedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            f.write_str(&segment.text)?;
        }
        Ok(())
    }
}

/// One lowercase char per input char, keeping indices aligned with the source.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Char-index starts of every non-overlapping match, scanning left to right.
fn match_starts(haystack: &[char], needle: &[char]) -> Vec<usize> {
    let mut starts = Vec::new();
    if needle.is_empty() || needle.len() > haystack.len() {
        return starts;
    }
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if haystack[i..i + needle.len()] == *needle {
            starts.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    starts
}

fn folded(s: &str) -> Vec<char> {
    s.chars().map(fold).collect()
}

/// Case-insensitive literal substring test. An empty term matches everything.
pub fn matches(title: &str, term: &str) -> bool {
    let needle = folded(term.trim());
    needle.is_empty() || !match_starts(&folded(title), &needle).is_empty()
}

/// Keep the chats whose title contains `term`, preserving order.
///
/// A blank term keeps every chat.
pub fn filter<'a>(chats: &'a [Chat], term: &str) -> Vec<&'a Chat> {
    let term = term.trim();
    if term.is_empty() {
        return chats.iter().collect();
    }
    chats.iter().filter(|c| matches(&c.title, term)).collect()
}

/// Mark every occurrence of `term` in `title`.
pub fn highlight(title: &str, term: &str) -> AnnotatedText {
    let needle = folded(term.trim());
    if needle.is_empty() {
        return AnnotatedText::plain(title);
    }

    // Byte offset of each char, plus the end, for slicing the original text.
    let mut offsets: Vec<usize> = title.char_indices().map(|(i, _)| i).collect();
    offsets.push(title.len());

    let mut annotated = AnnotatedText::default();
    let mut last = 0;
    for start in match_starts(&folded(title), &needle) {
        let end = start + needle.len();
        annotated.push(&title[offsets[last]..offsets[start]], false);
        annotated.push(&title[offsets[start]..offsets[end]], true);
        last = end;
    }
    annotated.push(&title[offsets[last]..], false);
    annotated
}
