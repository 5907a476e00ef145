//! Terminal chat client built around a searchable, categorized sidebar.
//!
//! The pure layers ([`store`], [`search`], [`sidebar`], [`selection`],
//! [`thread`]) hold no terminal state and are usable on their own; [`ui`]
//! draws them with ratatui and [`loader`] fills the store from a [`host`].

pub mod app;
pub mod config;
pub mod host;
pub mod loader;
pub mod search;
pub mod selection;
pub mod sidebar;
pub mod store;
pub mod thread;
pub mod ui;
pub mod util;
