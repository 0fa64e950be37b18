//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Published, delivered and dropped chat messages
//! - Users currently admitted to the room
//! - Active WebSocket connection gauge

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Messages accepted onto the fan-out queue
pub static MESSAGES_PUBLISHED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("messages_published_total", "Messages accepted for fan-out")
            .namespace("chatroom"),
    )
    .expect("Failed to create MESSAGES_PUBLISHED_TOTAL metric")
});

/// Messages written into a recipient's outbox
pub static MESSAGES_DELIVERED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("messages_delivered_total", "Messages queued to user outboxes")
            .namespace("chatroom"),
    )
    .expect("Failed to create MESSAGES_DELIVERED_TOTAL metric")
});

/// Messages lost because a queue was full or closed
pub static MESSAGES_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_dropped_total", "Messages dropped by a full or closed queue")
            .namespace("chatroom"),
        &["stage"], // "publish", "delivery"
    )
    .expect("Failed to create MESSAGES_DROPPED_TOTAL metric")
});

/// Users in the membership table
pub static USERS_ONLINE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("users_online", "Users currently admitted to the room").namespace("chatroom"),
    )
    .expect("Failed to create USERS_ONLINE metric")
});

/// Open WebSocket connections, logged in or not
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace("chatroom"),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(MESSAGES_PUBLISHED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_PUBLISHED_TOTAL");
    registry
        .register(Box::new(MESSAGES_DELIVERED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_DELIVERED_TOTAL");
    registry
        .register(Box::new(MESSAGES_DROPPED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_DROPPED_TOTAL");
    registry
        .register(Box::new(USERS_ONLINE.clone()))
        .expect("Failed to register USERS_ONLINE");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_published() {
    MESSAGES_PUBLISHED_TOTAL.inc();
}

pub fn record_delivered(count: u64) {
    MESSAGES_DELIVERED_TOTAL.inc_by(count);
}

/// `stage` is "publish" for the hub queue, "delivery" for a user outbox.
pub fn record_dropped(stage: &str, count: u64) {
    MESSAGES_DROPPED_TOTAL.with_label_values(&[stage]).inc_by(count);
}

pub fn set_users_online(count: usize) {
    USERS_ONLINE.set(count as i64);
}

pub fn websocket_connected() {
    WEBSOCKET_CONNECTIONS_ACTIVE.inc();
}

pub fn websocket_disconnected() {
    WEBSOCKET_CONNECTIONS_ACTIVE.dec();
}
