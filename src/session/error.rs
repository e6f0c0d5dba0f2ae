// ==========================================
// 产能场景仿真系统 - 会话层错误类型
// ==========================================
// 职责: 包装服务边界错误, 附加模式守卫违规
// 工具: thiserror 派生宏
// ==========================================

use crate::service::error::ServiceError;
use thiserror::Error;

/// 会话层错误类型
#[derive(Error, Debug)]
pub enum SessionError {
    // ===== 模式守卫错误 =====
    #[error("对比模式进行中, 实时编辑与预览已挂起")]
    ComparisonModeActive,

    #[error("当前不在对比模式")]
    NotInComparisonMode,

    // ===== 保存守卫错误 =====
    #[error("没有待保存的变更")]
    NothingToSave,

    #[error("基础场景不可覆盖保存, 请另存为新场景")]
    CannotUpdateBase,

    // ===== 场景错误 =====
    #[error("未知场景: id={0}")]
    UnknownScenario(i64),

    // ===== 服务边界错误 =====
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Result 类型别名
pub type SessionResult<T> = Result<T, SessionError>;
