//! # Domain Layer
//!
//! Message and user types plus the history processor. Nothing here knows
//! about sockets or HTTP.
//!
//! ## Structure
//!
//! - **entities**: `Message`, `MessageKind`, `User`
//! - **services**: `HistoryProcessor` (recent window and pending mentions)

pub mod entities;
pub mod services;

pub use entities::*;
