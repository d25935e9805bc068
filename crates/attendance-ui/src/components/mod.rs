//! Reusable line-level widgets: the dashboard header and performance bars.

pub mod header;
pub mod progress_bar;
