//! Data layer for the attendance monitor.
//!
//! Discovers and reads badge-export CSV files, resolves badge events into
//! daily sessions, aggregates them into weekly compliance records, runs the
//! top-level analysis pipeline and writes reports.

pub mod aggregator;
pub mod analysis;
pub mod export;
pub mod extractor;
pub mod reader;

pub use attendance_core as core;
