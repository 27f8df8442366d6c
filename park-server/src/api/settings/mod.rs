//! 设置 API 模块

mod handler;

use axum::{
    Router,
    routing::{post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/settings", put(handler::update))
        .route("/api/settings/{section}/edit", post(handler::start_edit))
        .route("/api/settings/{section}/draft", put(handler::set_draft))
        .route("/api/settings/{section}/save", post(handler::save))
        .route("/api/settings/{section}/cancel", post(handler::cancel))
}
