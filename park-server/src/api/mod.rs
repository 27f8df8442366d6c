//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`park`] - 公开内容快照
//! - [`auth`] - 隐藏入口与管理员登录
//! - [`settings`] - 设置更新与编辑会话接口
//! - [`gallery`] - 图库管理接口
//! - [`media`] - 上传文件读取接口

pub mod auth;
pub mod gallery;
pub mod health;
pub mod media;
pub mod park;
pub mod settings;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Public content
        .merge(park::router())
        // Admin entry + login
        .merge(auth::router())
        // Settings editing - admin token required
        .merge(settings::router())
        // Gallery - list public, mutation admin
        .merge(gallery::router())
        // Stored media files - public
        .merge(media::router())
        // Health - public route
        .merge(health::router())
}

/// Build a fully configured application with all middleware
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // JWT authentication - injects CurrentUser for admin routes
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_admin,
        ))
}
