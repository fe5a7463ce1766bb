//! Browsing history.
//!
//! A browser-style back/forward log of `ViewState` values plus a flat line
//! log for carrying the history across sessions. Nothing here looks inside
//! the catalog; view states are opaque tokens resolved elsewhere.

pub mod log;
pub mod navigation;
pub mod view;

pub use log::{decode_line, encode_line, read_log, write_log, HistoryError};
pub use navigation::NavigationHistory;
pub use view::ViewState;
