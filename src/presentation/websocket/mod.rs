//! WebSocket Session Shell
//!
//! Turns socket events into hub operations.

pub mod handler;
pub mod messages;
pub mod session;

pub use handler::ws_handler;
pub use messages::{parse_client_frame, ClientCommand};
pub use session::SessionState;
