//! 服务器配置
//!
//! # 环境变量
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | WORK_DIR | /var/lib/park/content | 工作目录 (数据库、上传文件、日志) |
//! | HTTP_PORT | 3000 | HTTP 服务端口 |
//! | STORAGE_BACKEND | surreal | 存储后端: surreal \| local |
//! | ENVIRONMENT | development | 运行环境 |
//! | ADMIN_USERNAME | admin | 管理员用户名 |
//! | ADMIN_PASSWORD_HASH | (无) | 管理员密码的 argon2 哈希 |
//!
//! # 示例
//!
//! ```ignore
//! WORK_DIR=/data/park HTTP_PORT=8080 STORAGE_BACKEND=local cargo run
//! ```

use std::path::PathBuf;

use crate::auth::AdminCredentials;

/// 未配置 ADMIN_PASSWORD_HASH 时使用的开发默认口令。
/// 仅用于在本机隐藏编辑入口，不承担真实的安全边界。
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// 存储后端选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// 嵌入式 KV 存储 (redb)，无实时变更通道
    Local,
    /// 嵌入式文档数据库 (SurrealDB)，带变更推送
    Surreal,
}

impl StorageBackend {
    fn from_env() -> Self {
        match std::env::var("STORAGE_BACKEND").as_deref() {
            Ok("local") => Self::Local,
            _ => Self::Surreal,
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传文件等
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 存储后端
    pub backend: StorageBackend,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 管理员用户名
    pub admin_username: String,
    /// 管理员密码哈希 (argon2)；缺省时由默认口令派生
    pub admin_password_hash: Option<String>,
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/park/content".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            backend: StorageBackend::from_env(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            admin_username: std::env::var("ADMIN_USERNAME")
                .unwrap_or_else(|_| DEFAULT_ADMIN_USERNAME.into()),
            admin_password_hash: std::env::var("ADMIN_PASSWORD_HASH").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置，常用于测试场景
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        backend: StorageBackend,
    ) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.backend = backend;
        config
    }

    /// 数据库目录
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(PathBuf::from(&self.work_dir).join("uploads/media"))?;
        Ok(())
    }

    /// 构造管理员凭据
    ///
    /// 配置了 ADMIN_PASSWORD_HASH 时直接使用；否则从默认口令派生哈希并
    /// 记录告警。
    pub fn admin_credentials(&self) -> Result<AdminCredentials, argon2::password_hash::Error> {
        match &self.admin_password_hash {
            Some(hash) => Ok(AdminCredentials::new(&self.admin_username, hash)),
            None => {
                tracing::warn!(
                    "ADMIN_PASSWORD_HASH not set; falling back to the default dev password"
                );
                AdminCredentials::from_plain(&self.admin_username, DEFAULT_ADMIN_PASSWORD)
            }
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
