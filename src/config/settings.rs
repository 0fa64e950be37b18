//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Chat room queue and history sizing
    pub chatroom: ChatroomSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Broadcast hub and history sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatroomSettings {
    /// Capacity of the shared fan-out queue; publishes beyond it are dropped
    pub message_queue_length: usize,

    /// Number of recent chat messages replayed to joining users (0 disables)
    pub history_size: usize,

    /// Capacity of each user's outbox
    pub outbox_capacity: usize,
}

impl Default for ChatroomSettings {
    fn default() -> Self {
        Self {
            message_queue_length: 1024,
            history_size: 10,
            outbox_capacity: 32,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 64KB)
    pub max_message_size: usize,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// if a queue capacity is zero, or if an outbox cannot hold the welcome
    /// plus the history window.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("chatroom.message_queue_length", 1024_i64)?
            .set_default("chatroom.history_size", 10_i64)?
            .set_default("chatroom.outbox_capacity", 32_i64)?
            .set_default("cors.allowed_origins", vec!["http://localhost:8080"])?
            .set_default("websocket.max_message_size", 65536_i64)? // 64KB
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__CHATROOM__HISTORY_SIZE=20 -> chatroom.history_size = 20
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.chatroom.message_queue_length == 0 {
            return Err(ConfigError::Message(
                "chatroom.message_queue_length must be at least 1".into(),
            ));
        }
        if self.chatroom.outbox_capacity == 0 {
            return Err(ConfigError::Message(
                "chatroom.outbox_capacity must be at least 1".into(),
            ));
        }
        // The welcome plus the whole history window must fit in one outbox.
        if self.chatroom.outbox_capacity <= self.chatroom.history_size {
            return Err(ConfigError::Message(format!(
                "chatroom.outbox_capacity ({}) must exceed chatroom.history_size ({})",
                self.chatroom.outbox_capacity, self.chatroom.history_size
            )));
        }
        Ok(self)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerSettings {
    /// Get the socket address for binding.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
