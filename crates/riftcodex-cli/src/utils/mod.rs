//! Utility functions for terminal output formatting.

pub mod format;

pub use format::{format_price, strip_markup, truncate_string};
