// ==========================================
// 产能场景仿真系统 - 场景实体定义
// ==========================================
// 职责: 持久化场景 / 场景摘要 / 审计历史
// 生命周期: 保存时创建, 重命名/整体更新, 显式删除
// ==========================================

use crate::domain::overrides::{CenterConfigMap, ItemOverride};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ScenarioSummary - 场景摘要
// ==========================================
/// 场景列表条目 (管理/对比选择器使用)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: i64,
    pub name: String,
}

// ==========================================
// Scenario - 持久化场景
// ==========================================
/// 持久化场景: 全局参数 + 中心配置 + 覆盖列表的命名快照
///
/// id 由服务端在创建时分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: i64,
    pub name: String,

    /// 可选备注
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 年工作日
    #[serde(rename = "dias_laborales")]
    pub work_days: u32,

    /// 全局班次小时数
    #[serde(rename = "horas_turno_global")]
    pub global_shift_hours: u32,

    /// 各工作中心班次配置
    #[serde(rename = "center_configs", default)]
    pub center_configs: CenterConfigMap,

    /// 单品覆盖列表
    #[serde(default)]
    pub overrides: Vec<ItemOverride>,

    /// 创建时间 (服务端填写)
    #[serde(rename = "created_at", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

// ==========================================
// HistoryEntry - 审计历史记录
// ==========================================
/// 场景历史记录, 只读展示, 核心层不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 记录时间
    pub timestamp: NaiveDateTime,

    /// 保存时的场景名称
    pub name: String,

    /// 覆盖条目数
    #[serde(rename = "changes_count", default)]
    pub changes_count: u32,

    /// 保存时的覆盖快照
    #[serde(rename = "details_snapshot", default)]
    pub snapshot: Vec<ItemOverride>,
}
