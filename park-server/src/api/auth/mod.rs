//! 认证 API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/logo-click", post(handler::logo_click))
        .route("/dismiss", post(handler::dismiss))
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
}
