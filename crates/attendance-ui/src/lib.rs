//! Terminal UI layer for the attendance monitor.
//!
//! Provides themes, the header and performance-bar components, the weekly
//! table view, and the interactive application loop built on top of
//! [`ratatui`].

pub mod app;
pub mod components;
pub mod table_view;
pub mod themes;

pub use attendance_core as core;
