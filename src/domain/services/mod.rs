//! # Domain Services
//!
//! - **HistoryProcessor**: bounded recent-message window and per-user
//!   pending mentions, replayed when a user logs in

mod history;

pub use history::*;
