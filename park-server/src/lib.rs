//! Park Content Server - 水上乐园营销站内容后端
//!
//! # 架构概述
//!
//! - **内容同步** (`content`): 设置与图库状态的权威副本、编辑会话状态机
//! - **存储** (`store`): 可插拔持久层 (redb KV / 嵌入式 SurrealDB + 变更推送)
//! - **媒体** (`media`): 上传校验与按内容寻址的文件存储
//! - **认证** (`auth`): 隐藏入口 + Argon2 + JWT
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! park-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── content/       # 同步服务、编辑会话 (核心)
//! ├── store/         # 持久层抽象与两种实现
//! ├── media/         # 上传文件存储
//! ├── auth/          # 入口计数、凭据、JWT
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod auth;
pub mod content;
pub mod core;
pub mod media;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use auth::{AdminCredentials, CurrentUser, JwtService, LogoGate};
pub use content::{ContentService, EditController, Section, SectionDraft};
pub use core::{Config, Server, ServerState, StorageBackend};
pub use media::MediaStorage;
pub use store::{ContentStore, LocalStore, StoreError, StoreResult, SurrealStore};
pub use utils::{AppError, AppResult};

/// 设置环境: dotenv + 日志
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    utils::logger::init_logger();
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____             __
   / __ \____ ______/ /__
  / /_/ / __ `/ ___/ //_/
 / ____/ /_/ / /  / ,<
/_/    \__,_/_/  /_/|_|
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
