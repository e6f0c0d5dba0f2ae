// ==========================================
// 产能场景仿真系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、线上格式映射
// 红线: 不含服务访问逻辑, 不含会话编排逻辑
// ==========================================

pub mod overrides;
pub mod scenario;
pub mod simulation;
pub mod types;

// 重导出核心类型
pub use overrides::{CenterConfig, CenterConfigMap, ItemOverride, OverrideKey};
pub use scenario::{HistoryEntry, Scenario, ScenarioSummary};
pub use simulation::{
    DetailRow, PreviewRequest, ResultMeta, ScenarioPayload, SimulationResult, SummaryRow,
};
pub use types::{
    GlobalParams, ScenarioId, SessionMode, DEFAULT_GLOBAL_SHIFT_HOURS, DEFAULT_WORK_DAYS,
};
