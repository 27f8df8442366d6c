//! 管理端认证
//!
//! - [`gate`] - 隐藏入口 (logo 连击计数) 与管理员凭据校验
//! - [`jwt`] - JWT 令牌服务
//! - [`middleware`] - Axum 认证中间件

pub mod gate;
pub mod jwt;
pub mod middleware;

pub use gate::{AdminCredentials, LogoGate};
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_admin;
