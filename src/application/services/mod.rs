//! Application Services
//!
//! ## Available Services
//!
//! - **Hub**: membership table and fan-out control loop, driven through a
//!   cloneable `HubHandle`

pub mod hub;

pub use hub::{Hub, HubHandle};
