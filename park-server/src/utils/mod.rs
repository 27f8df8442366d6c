//! 工具模块
//!
//! - [`error`] - 应用错误类型和 API 响应结构
//! - [`logger`] - 日志初始化
//! - [`result`] - 常用 Result 别名
//! - [`validation`] - 输入校验辅助函数

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, AppResponse, ok, ok_with_message};
pub use result::AppResult;
