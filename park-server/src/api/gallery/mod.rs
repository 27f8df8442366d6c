//! 图库 API 模块

mod handler;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;
use crate::media::MAX_VIDEO_BYTES;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/gallery", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::upload))
        .route("/url", post(handler::add_from_url))
        .route("/{id}", put(handler::patch).delete(handler::remove))
        // Raise the body ceiling so the validation layer, not the framework
        // default (2MB), decides what is too large
        .layer(DefaultBodyLimit::max(MAX_VIDEO_BYTES + 1024 * 1024))
}
