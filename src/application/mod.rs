//! Application Layer
//!
//! Coordinates the domain types at runtime. The broadcast hub lives here:
//! it owns membership and history and serializes every change to them.

pub mod services;
