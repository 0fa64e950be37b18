//! Presentation Layer
//!
//! HTTP routes and the WebSocket session shell.

pub mod http;
pub mod middleware;
pub mod websocket;
