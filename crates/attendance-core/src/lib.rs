//! Core types for the attendance monitor.
//!
//! Domain models, timestamp and direction parsing, weekly compliance
//! arithmetic, display formatting, and the CLI settings layer.

pub mod calculations;
pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{AttendanceError, Result};
