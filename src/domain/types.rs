// ==========================================
// 产能场景仿真系统 - 领域类型定义
// ==========================================
// 职责: 场景标识 / 会话模式 / 全局参数
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 全局默认年工作日
pub const DEFAULT_WORK_DAYS: u32 = 238;

/// 全局默认班次小时数 (两班制)
pub const DEFAULT_GLOBAL_SHIFT_HOURS: u32 = 16;

// ==========================================
// 场景标识 (Scenario Id)
// ==========================================
// 红线: "base" 是保留虚拟场景, 永远不会与持久化 id 冲突
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// 基础场景: 无持久化覆盖, 纯默认参数
    Base,
    /// 服务端分配的持久化场景 id
    Saved(i64),
}

impl ScenarioId {
    pub fn is_base(&self) -> bool {
        matches!(self, ScenarioId::Base)
    }

    pub fn as_saved(&self) -> Option<i64> {
        match self {
            ScenarioId::Base => None,
            ScenarioId::Saved(id) => Some(*id),
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioId::Base => write!(f, "base"),
            ScenarioId::Saved(id) => write!(f, "{}", id),
        }
    }
}

// ==========================================
// 会话模式 (Session Mode)
// ==========================================
// 状态机: Base ⇄ LoadedScenario ⇄ LivePreview
// Comparison 为正交叠加态, 退出后一律回到 Base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// 基础场景, 无本地改动
    Base,
    /// 已加载持久化场景, 无本地改动
    LoadedScenario,
    /// 存在本地改动的实时预览
    LivePreview,
    /// 双场景只读对比
    Comparison,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::Base => write!(f, "BASE"),
            SessionMode::LoadedScenario => write!(f, "LOADED_SCENARIO"),
            SessionMode::LivePreview => write!(f, "LIVE_PREVIEW"),
            SessionMode::Comparison => write!(f, "COMPARISON"),
        }
    }
}

// ==========================================
// 全局参数 (Global Params)
// ==========================================
/// 全局仿真参数: 年工作日 + 全局班次小时
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalParams {
    /// 年工作日
    pub work_days: u32,
    /// 全局班次小时数
    pub global_shift_hours: u32,
}

impl GlobalParams {
    /// 是否与基础默认值存在偏差
    pub fn differs_from_default(&self) -> bool {
        self.work_days != DEFAULT_WORK_DAYS || self.global_shift_hours != DEFAULT_GLOBAL_SHIFT_HOURS
    }
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            work_days: DEFAULT_WORK_DAYS,
            global_shift_hours: DEFAULT_GLOBAL_SHIFT_HOURS,
        }
    }
}
