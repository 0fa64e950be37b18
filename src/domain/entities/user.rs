//! Connected chat participant.
//!
//! A `User` lives for one WebSocket connection. It owns the sending half of a
//! bounded outbox; the session shell owns the receiving half and writes each
//! queued message to the transport.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::message::Message;
use crate::shared::error::DeliveryError;

/// Id 0 is reserved for the system user.
static NEXT_USER_ID: AtomicU64 = AtomicU64::new(1);

/// Author of every server-generated notice. Has no outbox.
pub static SYSTEM_USER: Lazy<Arc<User>> = Lazy::new(|| {
    Arc::new(User {
        id: 0,
        name: "system".to_string(),
        created_at: Utc::now(),
        addr: String::new(),
        outbox: Mutex::new(None),
        online: AtomicBool::new(false),
    })
});

/// Receiving half of a user's outbox, drained by the session's send loop.
pub type Outbox = mpsc::Receiver<Arc<Message>>;

/// A participant in the chat room.
#[derive(Debug, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "address")]
    pub addr: String,
    #[serde(skip)]
    outbox: Mutex<Option<mpsc::Sender<Arc<Message>>>>,
    #[serde(skip)]
    online: AtomicBool,
}

impl User {
    /// Create a user with a fresh id and an outbox of `outbox_capacity`
    /// (at least one slot).
    pub fn new(
        name: impl Into<String>,
        addr: impl Into<String>,
        outbox_capacity: usize,
    ) -> (Arc<Self>, Outbox) {
        let (tx, rx) = mpsc::channel(outbox_capacity.max(1));
        let user = Arc::new(Self {
            id: NEXT_USER_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            created_at: Utc::now(),
            addr: addr.into(),
            outbox: Mutex::new(Some(tx)),
            online: AtomicBool::new(false),
        });
        (user, rx)
    }

    /// The shared system user.
    pub fn system() -> Arc<Self> {
        Arc::clone(&SYSTEM_USER)
    }

    pub fn is_system(&self) -> bool {
        self.id == 0
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }

    /// Queue a message without waiting for outbox space.
    pub fn deliver(&self, message: Arc<Message>) -> Result<(), DeliveryError> {
        let guard = self.outbox.lock();
        let Some(tx) = guard.as_ref() else {
            return Err(DeliveryError::Closed);
        };
        tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Close the outbox. Returns `false` if it was already closed.
    ///
    /// Messages already queued stay readable; the receiver sees the end of
    /// the stream once they are drained.
    pub fn close_outbox(&self) -> bool {
        self.outbox.lock().take().is_some()
    }

    pub fn is_outbox_closed(&self) -> bool {
        self.outbox.lock().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MessageKind;

    #[test]
    fn test_ids_are_unique_and_nonzero() {
        let (a, _rx_a) = User::new("alice", "127.0.0.1", 4);
        let (b, _rx_b) = User::new("bob", "127.0.0.1", 4);
        assert_ne!(a.id, 0);
        assert!(b.id > a.id);
        assert!(User::system().is_system());
    }

    #[test]
    fn test_deliver_reports_full_outbox() {
        let (user, _rx) = User::new("alice", "127.0.0.1", 1);
        let msg = Arc::new(Message::new(User::system(), MessageKind::Error, "x"));
        assert_eq!(user.deliver(msg.clone()), Ok(()));
        assert_eq!(user.deliver(msg), Err(DeliveryError::Full));
    }

    #[tokio::test]
    async fn test_close_outbox_is_one_shot() {
        let (user, mut rx) = User::new("alice", "127.0.0.1", 4);
        let msg = Arc::new(Message::new(User::system(), MessageKind::Error, "bye"));
        user.deliver(msg).unwrap();

        assert!(user.close_outbox());
        assert!(!user.close_outbox());
        assert!(user.is_outbox_closed());

        let queued = rx.recv().await.expect("queued message survives close");
        assert_eq!(queued.content(), "bye");
        assert!(rx.recv().await.is_none());

        let late = Arc::new(Message::new(User::system(), MessageKind::Error, "late"));
        assert_eq!(user.deliver(late), Err(DeliveryError::Closed));
    }

    #[test]
    fn test_system_user_has_no_outbox() {
        let system = User::system();
        let msg = Arc::new(Message::new(User::system(), MessageKind::Error, "x"));
        assert_eq!(system.deliver(msg), Err(DeliveryError::Closed));
    }

    #[test]
    fn test_serialization_hides_outbox() {
        let (user, _rx) = User::new("alice", "10.0.0.1:5000", 4);
        let json = serde_json::to_value(&*user).unwrap();
        assert_eq!(json["name"], "alice");
        assert_eq!(json["address"], "10.0.0.1:5000");
        assert!(json.get("outbox").is_none());
        assert!(json.get("online").is_none());
    }
}
