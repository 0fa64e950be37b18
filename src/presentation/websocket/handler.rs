//! WebSocket Connection Handler
//!
//! Drives one client connection: validate the name, log in through the hub,
//! forward chat frames, and log out when the socket closes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message as WsMessage, WebSocket},
        ConnectInfo, Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};

use super::messages::{parse_client_frame, ClientCommand};
use super::session::SessionState;
use crate::application::services::HubHandle;
use crate::domain::{Message, Outbox, User};
use crate::infrastructure::metrics;
use crate::shared::error::HubError;
use crate::shared::validation::{validate_username, LoginQuery};
use crate::startup::AppState;

type WsSink = SplitSink<WebSocket, WsMessage>;

/// WebSocket upgrade handler for `GET /ws?name=<username>`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<LoginQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    ws.max_message_size(state.settings.websocket.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, state, query.name, addr))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState, name: String, addr: SocketAddr) {
    metrics::websocket_connected();
    run_session(socket, &state, name, addr).await;
    metrics::websocket_disconnected();
}

async fn run_session(socket: WebSocket, state: &AppState, name: String, addr: SocketAddr) {
    let (mut sink, mut stream) = socket.split();

    if let Err(e) = validate_username(&name) {
        tracing::info!(name = %name, error = %e, "Illegal username");
        reject(&mut sink, "invalid user input", close_code::UNSUPPORTED, "user login error").await;
        return;
    }

    match state.hub.can_login(&name).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!(name = %name, "User already exists");
            reject(&mut sink, "duplicate login", close_code::UNSUPPORTED, "user login error").await;
            return;
        }
        Err(e) => {
            tracing::error!(name = %name, error = %e, "Login check failed");
            reject(&mut sink, "server unavailable", close_code::ERROR, "user login error").await;
            return;
        }
    }

    let (user, outbox) = User::new(
        name,
        addr.to_string(),
        state.settings.chatroom.outbox_capacity,
    );
    let send_task = tokio::spawn(write_outbox(sink, outbox));

    notify(&user, Message::welcome(&user));

    if let Err(e) = state.hub.login(Arc::clone(&user)).await {
        tracing::info!(name = %user.name, error = %e, "Login rejected");
        notify(&user, Message::error(e.to_string()));
        user.close_outbox();
        finish(send_task, close_code::UNSUPPORTED, "user login error").await;
        return;
    }

    tracing::info!(name = %user.name, user_id = user.id, addr = %addr, "User entered the chatroom");

    let mut session = SessionState::new(Arc::clone(&user));
    let mut failed = false;

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                session.frames_received += 1;
                handle_frame(text.as_str(), &mut session, &state.hub).await;
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(name = %user.name, error = %e, "WebSocket read error");
                failed = true;
                break;
            }
        }
    }

    let (code, reason) = match state.hub.logout(Arc::clone(&user)).await {
        Ok(()) if failed => (close_code::ERROR, "message handling error"),
        Ok(()) => (close_code::NORMAL, ""),
        Err(e @ HubError::NotOnline(_)) => {
            tracing::error!(name = %user.name, error = %e, "User already logged out");
            (close_code::ERROR, "user logout error")
        }
        Err(e) => {
            tracing::error!(name = %user.name, error = %e, "Logout failed");
            (close_code::ERROR, "user logout error")
        }
    };
    // No-op when the hub already closed it.
    user.close_outbox();

    finish(send_task, code, reason).await;

    tracing::info!(
        name = %user.name,
        user_id = user.id,
        frames = session.frames_received,
        published = session.published,
        dropped = session.dropped,
        duration_ms = session.duration().as_millis() as u64,
        "User exited the chatroom"
    );
}

/// Handle one inbound text frame
async fn handle_frame(text: &str, session: &mut SessionState, hub: &HubHandle) {
    let command = match parse_client_frame(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(name = %session.user.name, error = %e, "Ignoring client frame");
            return;
        }
    };

    match command {
        ClientCommand::Chat { content } => {
            if content.trim().is_empty() {
                return;
            }
            let accepted = hub.publish(Message::normal(Arc::clone(&session.user), content));
            session.record_publish(accepted);
        }
        ClientCommand::ListUsers => match hub.list_users().await {
            Ok(users) => {
                notify(&session.user, Message::user_listing(&users));
            }
            Err(e) => {
                tracing::warn!(name = %session.user.name, error = %e, "User listing failed");
            }
        },
    }
}

/// Queue a notice addressed to this connection only. Returns whether it
/// was queued; a refusal is logged.
fn notify(user: &User, message: Message) -> bool {
    let kind = message.kind();
    match user.deliver(Arc::new(message)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(name = %user.name, kind = %kind, error = %e, "Notice dropped");
            false
        }
    }
}

/// Write every queued message to the socket until the outbox closes.
async fn write_outbox(mut sink: WsSink, mut outbox: Outbox) -> WsSink {
    while let Some(message) = outbox.recv().await {
        let text = match serde_json::to_string(&*message) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("Failed to serialize message: {}", e);
                continue;
            }
        };
        if sink.send(WsMessage::Text(text.into())).await.is_err() {
            break;
        }
    }
    sink
}

/// Wait for the writer to drain, then close the socket.
async fn finish(send_task: tokio::task::JoinHandle<WsSink>, code: u16, reason: &'static str) {
    match send_task.await {
        Ok(mut sink) => close(&mut sink, code, reason).await,
        Err(e) => tracing::error!("Outbox writer failed: {}", e),
    }
}

/// Send an error notice and close before any user exists.
async fn reject(sink: &mut WsSink, notice: &str, code: u16, reason: &'static str) {
    if let Ok(text) = serde_json::to_string(&Message::error(notice)) {
        let _ = sink.send(WsMessage::Text(text.into())).await;
    }
    close(sink, code, reason).await;
}

async fn close(sink: &mut WsSink, code: u16, reason: &'static str) {
    let frame = CloseFrame {
        code,
        reason: reason.into(),
    };
    let _ = sink.send(WsMessage::Close(Some(frame))).await;
    let _ = sink.close().await;
}
