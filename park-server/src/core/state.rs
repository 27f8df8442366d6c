//! 服务器状态
//!
//! [`ServerState`] 持有所有服务的共享引用，使用 Arc 实现浅拷贝。
//!
//! | 字段 | 说明 |
//! |------|------|
//! | config | 配置项 (不可变) |
//! | content | 内容同步服务 (设置 + 图库状态权威副本) |
//! | edit | 编辑流程控制器 (按区块的草稿会话) |
//! | jwt_service | JWT 令牌服务 |
//! | admin | 管理员凭据 |
//! | logo_gate | 隐藏入口连击计数 |

use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::auth::{AdminCredentials, JwtService, LogoGate};
use crate::content::{ContentService, EditController};
use crate::core::{Config, StorageBackend};
use crate::media::MediaStorage;
use crate::store::{ContentStore, LocalStore, SurrealStore};

/// 服务器状态 - 持有所有服务的单例引用
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 内容同步服务
    pub content: ContentService,
    /// 编辑流程控制器
    pub edit: Arc<EditController>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 管理员凭据
    pub admin: Arc<AdminCredentials>,
    /// 隐藏入口连击计数
    pub logo_gate: Arc<Mutex<LogoGate>>,
    /// 媒体文件存储 (上传文件的读取入口)
    pub media: MediaStorage,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：工作目录结构 → 存储后端 → 媒体存储 → 内容同步服务
    /// (含初次加载与推送监听) → 认证组件。
    ///
    /// 初次内容加载失败不会中断启动：错误记录在同步服务的状态里，
    /// 对外表现为全页错误，管理员修复存储后重载即可。
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        config
            .ensure_work_dir_structure()
            .context("Failed to create work directory structure")?;

        let db_dir = config.database_dir();
        let store: Arc<dyn ContentStore> = match config.backend {
            StorageBackend::Local => {
                let path = db_dir.join("content.redb");
                Arc::new(LocalStore::open(&path).context("Failed to open local store")?)
            }
            StorageBackend::Surreal => {
                let path = db_dir.join("content.db");
                Arc::new(
                    SurrealStore::open(&path)
                        .await
                        .context("Failed to open surreal store")?,
                )
            }
        };

        let media = MediaStorage::new(&config.work_dir);
        let content = ContentService::new(store, media.clone());
        content.start_listener();

        if let Err(e) = content.load().await {
            tracing::error!(error = %e, "Initial content load failed");
        }

        let edit = Arc::new(EditController::new(content.clone()));
        let jwt_service = Arc::new(JwtService::default());
        let admin = Arc::new(
            config
                .admin_credentials()
                .map_err(|e| anyhow::anyhow!("Failed to build admin credentials: {e}"))?,
        );

        Ok(Self {
            config: config.clone(),
            content,
            edit,
            jwt_service,
            admin,
            logo_gate: Arc::new(Mutex::new(LogoGate::new())),
            media,
        })
    }

    /// 获取内容同步服务
    pub fn content(&self) -> &ContentService {
        &self.content
    }

    /// 停止后台任务 (推送监听)
    pub fn shutdown(&self) {
        self.content.shutdown();
    }
}
