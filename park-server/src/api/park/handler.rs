//! Public Content Handlers

use axum::{Json, extract::State};

use crate::content::ContentSnapshot;
use crate::core::ServerState;

/// Full content snapshot for the public site: settings (or null before the
/// first successful load), gallery, loading flag and last error.
pub async fn snapshot(State(state): State<ServerState>) -> Json<ContentSnapshot> {
    Json(state.content.snapshot().await)
}
