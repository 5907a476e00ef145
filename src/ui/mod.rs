//! Terminal User Interface module.
//!
//! This module provides the TUI for the chat client, including:
//! - Main event loop (`run`)
//! - Input handling for browsing, search, dropdowns and the composer
//! - Rendering for the sidebar, conversation header, thread and composer
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task and chat event processing
//! - `helpers` - Host calls spawned as background tasks
//! - `render` - Layout and overlays
//! - `sidebar`, `header`, `messages`, `composer`, `status`, `help` - Widgets

mod composer;
mod events;
mod header;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod messages;
mod render;
mod sidebar;
mod status;

pub use loop_runner::{run, Action};
