//! WebSocket Session State

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::User;

/// Per-connection bookkeeping for a logged-in user.
#[derive(Debug)]
pub struct SessionState {
    pub user: Arc<User>,
    pub connected_at: Instant,
    /// Text frames received from the client
    pub frames_received: u64,
    /// Chat messages accepted by the hub
    pub published: u64,
    /// Chat messages the hub refused (queue full)
    pub dropped: u64,
}

impl SessionState {
    pub fn new(user: Arc<User>) -> Self {
        Self {
            user,
            connected_at: Instant::now(),
            frames_received: 0,
            published: 0,
            dropped: 0,
        }
    }

    pub fn record_publish(&mut self, accepted: bool) {
        if accepted {
            self.published += 1;
        } else {
            self.dropped += 1;
        }
    }

    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
