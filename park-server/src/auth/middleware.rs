//! 认证中间件
//!
//! 为管理端接口提供 JWT 认证的 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::core::ServerState;
use crate::utils::AppError;

use super::{CurrentUser, JwtService};

/// 公共路径判定 (无需令牌)
///
/// | 路径 | 说明 |
/// |------|------|
/// | `OPTIONS *` | CORS 预检 |
/// | 非 `/api/` | 静态资源等，交给路由正常 404 |
/// | `/api/health` | 健康检查 |
/// | `/api/park` | 公开内容快照 |
/// | `GET /api/gallery` | 公开图库列表 |
/// | `/api/auth/login` 等 | 登录入口与 logo 计数 |
fn is_public(req: &Request) -> bool {
    if req.method() == http::Method::OPTIONS {
        return true;
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") {
        return true;
    }

    matches!(
        path,
        "/api/health" | "/api/park" | "/api/auth/login" | "/api/auth/logo-click"
            | "/api/auth/dismiss"
    ) || (req.method() == http::Method::GET && path == "/api/gallery")
}

/// 管理端认证中间件
///
/// 从 `Authorization: Bearer <token>` 验证 JWT，成功后将 [`CurrentUser`]
/// 注入请求扩展；要求角色为 `admin`。
pub async fn require_admin(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_public(&req) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?,
        None => {
            tracing::warn!(uri = %req.uri(), "Missing authorization header");
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            if !user.is_admin() {
                return Err(AppError::forbidden("Admin role required".to_string()));
            }
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(super::JwtError::ExpiredToken) => Err(AppError::TokenExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Token validation failed");
            Err(AppError::InvalidToken)
        }
    }
}
