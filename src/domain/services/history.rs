//! Recent history and pending mentions.
//!
//! Owned by the hub's control loop; every call is already serialized there,
//! so the processor carries no locking of its own.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::domain::entities::{Message, User};

/// Default size of the recent-message window.
pub const DEFAULT_HISTORY_SIZE: usize = 10;

/// Outcome of a [`HistoryProcessor::replay`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Recent messages queued to the user
    pub recent: usize,
    /// Pending mentions queued to the user
    pub mentions: usize,
    /// Recent messages the user's outbox refused
    pub dropped: usize,
    /// Mentions left queued because the outbox filled up
    pub deferred: usize,
}

/// Bounded window of recent `Normal` messages plus a mention queue per name.
#[derive(Debug)]
pub struct HistoryProcessor {
    capacity: usize,
    /// Oldest at the front.
    recent: VecDeque<Arc<Message>>,
    pending: HashMap<String, VecDeque<Arc<Message>>>,
}

impl HistoryProcessor {
    /// A `capacity` of zero disables the recent window; mentions are still
    /// recorded.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            recent: VecDeque::with_capacity(capacity),
            pending: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a message. Anything other than a `Normal` message is ignored.
    pub fn save(&mut self, message: &Arc<Message>) {
        if !message.is_normal() {
            return;
        }

        if self.capacity > 0 {
            self.recent.push_back(Arc::clone(message));
            while self.recent.len() > self.capacity {
                self.recent.pop_front();
            }
        }

        for name in message.mentions() {
            self.pending
                .entry(name.clone())
                .or_default()
                .push_back(Arc::clone(message));
        }
    }

    /// Queue the recent window to `user`, oldest first. Pending mentions are
    /// drained only when the user is online, and only as far as the outbox
    /// accepts them; the rest stay queued for a later replay.
    pub fn replay(&mut self, user: &User) -> ReplayReport {
        let mut report = ReplayReport::default();

        for message in &self.recent {
            match user.deliver(Arc::clone(message)) {
                Ok(()) => report.recent += 1,
                Err(e) => {
                    report.dropped += 1;
                    tracing::warn!(user = %user.name, error = %e, "History replay dropped");
                }
            }
        }

        if !user.is_online() {
            return report;
        }

        if let Some(mut queue) = self.pending.remove(&user.name) {
            while let Some(message) = queue.pop_front() {
                if let Err(e) = user.deliver(Arc::clone(&message)) {
                    // Undelivered mentions stay queued for the next login.
                    queue.push_front(message);
                    report.deferred = queue.len();
                    tracing::warn!(
                        user = %user.name,
                        error = %e,
                        deferred = report.deferred,
                        "Mention replay stopped, remainder kept"
                    );
                    self.pending.insert(user.name.clone(), queue);
                    break;
                }
                report.mentions += 1;
            }
        }

        report
    }

    /// Recent messages, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &Arc<Message>> {
        self.recent.iter()
    }

    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    /// Number of undelivered mentions queued for `name`.
    pub fn pending_len(&self, name: &str) -> usize {
        self.pending.get(name).map(VecDeque::len).unwrap_or(0)
    }

    pub fn has_pending(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }
}

impl Default for HistoryProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}
