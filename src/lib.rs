// ==========================================
// 产能场景仿真系统 - 核心库
// ==========================================
// 系统定位: What-If 场景推演核心 (客户端会话层)
// 职责: 覆盖解析 / 本地暂存 / 预览调度 / 结果对账
// 红线: 本库不计算饱和度, 不做渲染, 不做持久化
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 暂存层 - 待定覆盖集合
pub mod store;

// 引擎层 - 解析/差异/对比规则
pub mod engine;

// 服务边界层 - 计算与持久化服务契约
pub mod service;

// 会话层 - 场景会话编排
pub mod session;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    GlobalParams, ScenarioId, SessionMode, DEFAULT_GLOBAL_SHIFT_HOURS, DEFAULT_WORK_DAYS,
};

// 领域实体
pub use domain::{
    CenterConfig, CenterConfigMap, DetailRow, HistoryEntry, ItemOverride, OverrideKey,
    PreviewRequest, ResultMeta, Scenario, ScenarioPayload, ScenarioSummary, SimulationResult,
    SummaryRow,
};

// 暂存
pub use store::OverrideStore;

// 引擎
pub use engine::{
    annotate_detail, AggregateStats, ArticleDelta, ChangedFields, ComparisonEngine,
    ComparisonReport, DiffEngine, ResolvedAssignment, RowAnnotation,
};

// 服务边界
pub use service::{RawSimulationResult, ServiceError, ServiceResult, SimulationService};

// 会话
pub use session::{
    ComparisonSession, LoadOutcome, PreviewOutcome, PreviewScheduler, ScenarioSession,
    ScheduleOutcome, SessionError, SessionResult,
};
