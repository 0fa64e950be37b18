//! Infrastructure Layer
//!
//! Process-level collaborators that sit outside the chat core.

pub mod metrics;
