//! Change notification payloads
//!
//! 当设置记录发生变更时（由某次管理端写入触发），存储层通过变更通道
//! 广播此信号，同步服务以此为准更新内存状态。

use crate::models::ParkSettings;
use serde::{Deserialize, Serialize};

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
}

/// 设置变更信号 (存储层 -> 同步服务)
///
/// `version` 单调递增，接收方据此实现 last-writer-wins。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsChange {
    /// 版本号 (每次发布自动递增)
    pub version: u64,
    /// 变更类型
    pub action: ChangeAction,
    /// 变更后的完整记录
    pub settings: ParkSettings,
}
