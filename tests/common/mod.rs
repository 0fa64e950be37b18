//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::net::SocketAddr;
use std::time::Duration;

use axum_test::TestServer;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use chatroom::config::{
    ChatroomSettings, CorsSettings, ServerSettings, Settings, WebSocketSettings,
};
use chatroom::startup::{build_router, AppState};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Settings for tests, independent of config files and environment
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        chatroom: ChatroomSettings::default(),
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        websocket: WebSocketSettings {
            max_message_size: 65536,
        },
        environment: "test".into(),
    }
}

/// Test application driven in-process through axum-test
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::new(test_settings());
        let server = TestServer::new(build_router(state.clone())).expect("test server");
        Self { server, state }
    }
}

/// Serve the full router on an ephemeral port
pub async fn spawn_app() -> SocketAddr {
    let state = AppState::new(test_settings());
    let router = build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .ok();
    });

    addr
}

/// Open a chat connection as `name`
pub async fn connect(addr: SocketAddr, name: &str) -> WsClient {
    let url = format!("ws://{}/ws?name={}", addr, name);
    let (ws, _) = connect_async(url).await.expect("websocket connect");
    ws
}

/// Next JSON text frame, or `None` once the server closes the socket
pub async fn next_json(ws: &mut WsClient) -> Option<Value> {
    tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(text.as_str()).expect("json frame"));
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => continue,
            }
        }
        None
    })
    .await
    .expect("timed out waiting for a frame")
}

/// Skip frames until one with the given `type`
pub async fn next_of_type(ws: &mut WsClient, kind: &str) -> Value {
    loop {
        let frame = next_json(ws).await.expect("connection closed");
        if frame["type"] == kind {
            return frame;
        }
    }
}

pub async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send frame");
}
