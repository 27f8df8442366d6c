//! 媒体文件服务模块
//!
//! 对外提供上传文件的读取入口；图库记录里的托管 URL 指向这里。

use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::{Router, routing::get};

use crate::core::ServerState;
use crate::media::PUBLIC_PREFIX;
use crate::utils::{AppError, AppResult};

pub fn router() -> Router<ServerState> {
    Router::new().route("/media/{file}", get(serve))
}

/// Serve a stored media file by its managed URL
async fn serve(
    State(state): State<ServerState>,
    Path(file): Path<String>,
) -> AppResult<Response> {
    let url = format!("{PUBLIC_PREFIX}/{file}");
    let path = state
        .media
        .resolve(&url)
        .ok_or_else(|| AppError::not_found(format!("Media file {file}")))?;

    let data = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found(format!("Media file {file}")))?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Response::builder()
        .header(http::header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(e.to_string()))
}
