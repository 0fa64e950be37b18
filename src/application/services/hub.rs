//! Broadcast Hub
//!
//! A single task owns the membership table and the history processor. Every
//! other component talks to it through a [`HubHandle`]: control operations go
//! over an unbounded queue, chat messages over a bounded fan-out queue. The
//! loop handles one item at a time, so membership changes and fan-out are
//! linearized without any locks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::config::ChatroomSettings;
use crate::domain::entities::{Message, User};
use crate::domain::services::HistoryProcessor;
use crate::infrastructure::metrics;
use crate::shared::error::{DeliveryError, HubError};

/// Operations processed by the control loop.
enum HubOp {
    Admit(Arc<User>),
    Evict(Arc<User>),
    Login {
        user: Arc<User>,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    Logout {
        user: Arc<User>,
        reply: oneshot::Sender<Result<(), HubError>>,
    },
    CanLogin {
        name: String,
        reply: oneshot::Sender<bool>,
    },
    CanLogout {
        name: String,
        reply: oneshot::Sender<bool>,
    },
    ListUsers {
        reply: oneshot::Sender<Vec<Arc<User>>>,
    },
    UserCount {
        reply: oneshot::Sender<usize>,
    },
}

/// State owned by the control loop.
pub struct Hub {
    users: HashMap<String, Arc<User>>,
    history: HistoryProcessor,
    ops_rx: mpsc::UnboundedReceiver<HubOp>,
    messages_rx: mpsc::Receiver<Arc<Message>>,
}

/// Cloneable client side of the hub.
#[derive(Clone)]
pub struct HubHandle {
    ops_tx: mpsc::UnboundedSender<HubOp>,
    messages_tx: mpsc::Sender<Arc<Message>>,
}

impl Hub {
    /// Build the loop state and its handle without starting the loop.
    pub fn new(settings: &ChatroomSettings) -> (Self, HubHandle) {
        let (ops_tx, ops_rx) = mpsc::unbounded_channel();
        let (messages_tx, messages_rx) = mpsc::channel(settings.message_queue_length.max(1));

        let hub = Self {
            users: HashMap::new(),
            history: HistoryProcessor::new(settings.history_size),
            ops_rx,
            messages_rx,
        };

        (hub, HubHandle { ops_tx, messages_tx })
    }

    /// Start the control loop on the tokio runtime.
    pub fn spawn(settings: &ChatroomSettings) -> HubHandle {
        let (hub, handle) = Self::new(settings);
        tokio::spawn(hub.run());
        handle
    }

    /// Run until every handle has been dropped.
    pub async fn run(mut self) {
        tracing::debug!(history_size = self.history.capacity(), "Broadcast hub started");

        loop {
            tokio::select! {
                Some(op) = self.ops_rx.recv() => self.handle_op(op),
                Some(message) = self.messages_rx.recv() => self.fan_out(message),
                else => break,
            }
        }

        tracing::debug!("Broadcast hub stopped");
    }

    fn handle_op(&mut self, op: HubOp) {
        match op {
            HubOp::Admit(user) => self.admit(user),
            HubOp::Evict(user) => self.evict(user),
            HubOp::Login { user, reply } => {
                let result = if self.users.contains_key(&user.name) {
                    Err(HubError::NameTaken(user.name.clone()))
                } else {
                    self.admit(user);
                    Ok(())
                };
                let _ = reply.send(result);
            }
            HubOp::Logout { user, reply } => {
                let is_member = self
                    .users
                    .get(&user.name)
                    .is_some_and(|current| current.id == user.id);
                let result = if is_member {
                    self.evict(user);
                    Ok(())
                } else {
                    Err(HubError::NotOnline(user.name.clone()))
                };
                let _ = reply.send(result);
            }
            HubOp::CanLogin { name, reply } => {
                let _ = reply.send(!self.users.contains_key(&name));
            }
            HubOp::CanLogout { name, reply } => {
                let _ = reply.send(self.users.contains_key(&name));
            }
            HubOp::ListUsers { reply } => {
                let _ = reply.send(self.users.values().cloned().collect());
            }
            HubOp::UserCount { reply } => {
                let _ = reply.send(self.users.len());
            }
        }
    }

    /// Insert, replay history, then announce. The join notice is fanned out
    /// after the replay so the new user sees history first.
    fn admit(&mut self, user: Arc<User>) {
        user.set_online(true);
        if let Some(previous) = self.users.insert(user.name.clone(), Arc::clone(&user)) {
            tracing::warn!(
                name = %user.name,
                previous_id = previous.id,
                user_id = user.id,
                "Admission replaced an online user"
            );
        }

        let report = self.history.replay(&user);
        metrics::record_delivered((report.recent + report.mentions) as u64);
        if report.dropped > 0 {
            metrics::record_dropped("delivery", report.dropped as u64);
        }

        tracing::info!(
            name = %user.name,
            user_id = user.id,
            replayed = report.recent,
            mentions = report.mentions,
            deferred = report.deferred,
            "User admitted"
        );

        self.fan_out(Arc::new(Message::user_joined(&user)));
        metrics::set_users_online(self.users.len());
    }

    fn evict(&mut self, user: Arc<User>) {
        self.users.remove(&user.name);

        if !user.close_outbox() {
            tracing::error!(name = %user.name, user_id = user.id, "Evicted user outbox was already closed");
        }
        user.set_online(false);

        tracing::info!(name = %user.name, user_id = user.id, "User evicted");

        self.fan_out(Arc::new(Message::user_left(&user)));
        metrics::set_users_online(self.users.len());
    }

    /// Deliver to every member except the author, then record in history.
    fn fan_out(&mut self, message: Arc<Message>) {
        let author_id = message.author().id;
        let mut delivered = 0u64;
        let mut dropped = 0u64;

        for user in self.users.values() {
            if user.id == author_id {
                continue;
            }
            match user.deliver(Arc::clone(&message)) {
                Ok(()) => delivered += 1,
                Err(DeliveryError::Full) => {
                    dropped += 1;
                    tracing::warn!(
                        recipient = %user.name,
                        kind = %message.kind(),
                        "Outbox full, message dropped"
                    );
                }
                Err(DeliveryError::Closed) => {
                    dropped += 1;
                    tracing::debug!(recipient = %user.name, "Outbox closed, message dropped");
                }
            }
        }

        metrics::record_delivered(delivered);
        if dropped > 0 {
            metrics::record_dropped("delivery", dropped);
        }

        self.history.save(&message);
    }
}

impl HubHandle {
    /// Insert `user` without a name check. Callers must have reserved the
    /// name with [`can_login`](Self::can_login); prefer [`login`](Self::login).
    pub fn admit(&self, user: Arc<User>) -> Result<(), HubError> {
        self.ops_tx
            .send(HubOp::Admit(user))
            .map_err(|_| HubError::Unavailable)
    }

    /// Remove `user`, close its outbox and announce the departure. Callers
    /// must have checked [`can_logout`](Self::can_logout); prefer
    /// [`logout`](Self::logout).
    pub fn evict(&self, user: Arc<User>) -> Result<(), HubError> {
        self.ops_tx
            .send(HubOp::Evict(user))
            .map_err(|_| HubError::Unavailable)
    }

    /// Reserve the name and admit the user in one step.
    pub async fn login(&self, user: Arc<User>) -> Result<(), HubError> {
        self.request(|reply| HubOp::Login { user, reply }).await?
    }

    /// Evict the user if it is still the member holding its name.
    pub async fn logout(&self, user: Arc<User>) -> Result<(), HubError> {
        self.request(|reply| HubOp::Logout { user, reply }).await?
    }

    /// True when no online user holds `name`. Does not reserve it.
    pub async fn can_login(&self, name: &str) -> Result<bool, HubError> {
        let name = name.to_string();
        self.request(|reply| HubOp::CanLogin { name, reply }).await
    }

    /// True when an online user holds `name`.
    pub async fn can_logout(&self, name: &str) -> Result<bool, HubError> {
        let name = name.to_string();
        self.request(|reply| HubOp::CanLogout { name, reply }).await
    }

    /// Snapshot of the online users, in no particular order.
    pub async fn list_users(&self) -> Result<Vec<Arc<User>>, HubError> {
        self.request(|reply| HubOp::ListUsers { reply }).await
    }

    pub async fn user_count(&self) -> Result<usize, HubError> {
        self.request(|reply| HubOp::UserCount { reply }).await
    }

    /// Queue a message for fan-out without waiting. When the queue is full
    /// the message is dropped with a warning. Returns whether it was queued.
    pub fn publish(&self, message: Message) -> bool {
        match self.messages_tx.try_send(Arc::new(message)) {
            Ok(()) => {
                metrics::record_published();
                true
            }
            Err(mpsc::error::TrySendError::Full(message)) => {
                metrics::record_dropped("publish", 1);
                tracing::warn!(
                    author = %message.author().name,
                    "Broadcast queue is full, message dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                metrics::record_dropped("publish", 1);
                tracing::warn!("Broadcast hub is unavailable, message dropped");
                false
            }
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> HubOp,
    ) -> Result<T, HubError> {
        let (reply, rx) = oneshot::channel();
        self.ops_tx
            .send(build(reply))
            .map_err(|_| HubError::Unavailable)?;
        rx.await.map_err(|_| HubError::Unavailable)
    }
}
