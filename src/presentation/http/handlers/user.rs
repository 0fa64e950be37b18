//! User Handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::domain::User;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// List users currently in the chat room
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Arc<User>>>, AppError> {
    let mut users = state.hub.list_users().await?;
    users.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(users))
}
