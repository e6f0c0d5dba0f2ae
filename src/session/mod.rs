// ==========================================
// 产能场景仿真系统 - 会话层
// ==========================================
// 职责: 预览调度 / 场景会话编排 / 模式状态机
// ==========================================

pub mod error;
pub mod preview_scheduler;
pub mod scenario_session;

// 重导出核心类型
pub use error::{SessionError, SessionResult};
pub use preview_scheduler::{PreviewScheduler, ScheduleOutcome, PREVIEW_DEBOUNCE};
pub use scenario_session::{
    ComparisonSession, LoadOutcome, PreviewOutcome, ScenarioSession,
};
