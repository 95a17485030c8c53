//! Terminal User Interface (TUI) module.
//!
//! The interactive window: activation status, DNS profile selector, stats
//! line and action keys, built on `ratatui`.

mod app;

pub use app::App;
