//! Chat and system message entity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::user::User;

/// `@` followed by 2-20 characters that are neither whitespace nor `@`.
static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[^\s@]{2,20}").expect("Invalid mention pattern regex"));

/// Kind of a message, as seen by clients in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Chat text written by a user
    Normal,
    /// Greeting sent only to the user who just connected
    Welcome,
    /// Someone entered the room
    UserJoined,
    /// Someone left the room
    UserLeft,
    /// Error notice from the server
    Error,
    /// Reply to a user-list request
    UserListing,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Welcome => "welcome",
            Self::UserJoined => "user_joined",
            Self::UserLeft => "user_left",
            Self::Error => "error",
            Self::UserListing => "user_listing",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable chat event.
///
/// Fields are private so that `mentions` always agrees with `content` and
/// `kind`.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    #[serde(rename = "from_user")]
    author: Arc<User>,
    #[serde(rename = "type")]
    kind: MessageKind,
    content: String,
    created_at: DateTime<Utc>,
    mentions: Vec<String>,
}

impl Message {
    /// Build a message. Mentions are extracted only for `Normal` messages.
    pub fn new(author: Arc<User>, kind: MessageKind, content: impl Into<String>) -> Self {
        let content = content.into();
        let mentions = if kind == MessageKind::Normal {
            extract_mentions(&content)
        } else {
            Vec::new()
        };

        Self {
            author,
            kind,
            content,
            created_at: Utc::now(),
            mentions,
        }
    }

    pub fn normal(author: Arc<User>, content: impl Into<String>) -> Self {
        Self::new(author, MessageKind::Normal, content)
    }

    pub fn welcome(user: &Arc<User>) -> Self {
        Self::new(
            Arc::clone(user),
            MessageKind::Welcome,
            format!("hello: {} ,welcome to the chatroom!", user.name),
        )
    }

    pub fn user_joined(user: &Arc<User>) -> Self {
        Self::new(
            Arc::clone(user),
            MessageKind::UserJoined,
            format!("{} has entered the chatroom!", user.name),
        )
    }

    pub fn user_left(user: &Arc<User>) -> Self {
        Self::new(
            Arc::clone(user),
            MessageKind::UserLeft,
            format!("{} has exited the chatroom!", user.name),
        )
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(User::system(), MessageKind::Error, content)
    }

    pub fn user_listing(users: &[Arc<User>]) -> Self {
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        Self::new(
            User::system(),
            MessageKind::UserListing,
            format!("Current users: {}", names.join(", ")),
        )
    }

    pub fn author(&self) -> &Arc<User> {
        &self.author
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Mentioned names without the leading `@`, in order of appearance.
    pub fn mentions(&self) -> &[String] {
        &self.mentions
    }

    pub fn is_normal(&self) -> bool {
        self.kind == MessageKind::Normal
    }
}

/// Scan `content` left to right for non-overlapping `@name` tokens.
/// Duplicates are kept.
pub fn extract_mentions(content: &str) -> Vec<String> {
    MENTION_PATTERN
        .find_iter(content)
        .map(|m| m.as_str()[1..].to_string())
        .collect()
}
