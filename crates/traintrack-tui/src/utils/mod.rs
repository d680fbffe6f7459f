//! Utility functions for string formatting and manipulation.

pub mod format;

pub use format::{attendance_bar, contains_ignore_case, truncate};
