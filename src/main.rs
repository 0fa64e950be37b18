//! # Chatroom
//!
//! Application entry point: tracing, configuration, then the HTTP/WebSocket
//! server with its broadcast hub.

use anyhow::Result;
use tracing::info;

use chatroom::config::Settings;
use chatroom::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    chatroom::telemetry::init_tracing();

    info!("Welcome to ChatRoom!");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
