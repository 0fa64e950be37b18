//! # Domain Entities
//!
//! - **Message**: an immutable chat or system event
//! - **User**: a connected participant with a bounded outbox

mod message;
mod user;

pub use message::{extract_mentions, Message, MessageKind};
pub use user::{Outbox, User, SYSTEM_USER};
