//! HTTP Surface
//!
//! Health probes, the online user list and metrics.

pub mod handlers;
pub mod routes;
