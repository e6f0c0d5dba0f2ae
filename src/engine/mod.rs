// ==========================================
// 产能场景仿真系统 - 引擎层
// ==========================================
// 职责: 配置优先级解析 / 差异判定 / 场景对比 / 行注解
// 红线: 引擎均为只读纯逻辑, 不触发重算, 不改暂存
// ==========================================

pub mod annotate;
pub mod comparison;
pub mod diff;
pub mod precedence;

// 重导出核心类型
pub use annotate::{annotate_detail, RowAnnotation};
pub use comparison::{AggregateStats, ArticleDelta, ComparisonEngine, ComparisonReport};
pub use diff::{ChangedFields, DiffEngine, OEE_TOLERANCE};
pub use precedence::{resolve, ResolvedAssignment};
