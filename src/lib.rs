//! # Chatroom Library
//!
//! A single-room WebSocket chat server. Clients connect with a unique name,
//! send text, and receive everyone else's messages, join/leave notices, a
//! window of recent history and any mentions they missed.
//!
//! ## Architecture
//!
//! - **Domain Layer**: `Message`, `User` and the history processor
//! - **Application Layer**: the broadcast hub control loop
//! - **Infrastructure Layer**: Prometheus metrics
//! - **Presentation Layer**: HTTP handlers and the WebSocket session shell
//!
//! ## Module Structure
//!
//! ```text
//! chatroom/
//! +-- config/         Configuration management
//! +-- domain/         Entities and the history processor
//! +-- application/    Broadcast hub
//! +-- infrastructure/ Metrics
//! +-- presentation/   HTTP routes and WebSocket handler
//! +-- shared/         Errors and validation
//! ```

// Configuration module
pub mod config;

// Domain layer - Messages, users, history
pub mod domain;

// Application layer - Broadcast hub
pub mod application;

// Infrastructure layer - Metrics
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
