// ==========================================
// 产能场景仿真系统 - 服务边界错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 过期响应 (StaleResponse) 不是错误, 由会话层
//       作为调度结果静默丢弃, 不出现在此枚举中
// ==========================================

use thiserror::Error;

/// 服务边界错误类型
#[derive(Error, Debug)]
pub enum ServiceError {
    // ===== 传输错误 =====
    #[error("传输失败: {0}")]
    Transport(String),

    // ===== 协议错误 =====
    #[error("协议错误: {0}")]
    Protocol(String),

    // ===== 服务端校验错误 (4xx 携带消息) =====
    #[error("服务端校验失败: {0}")]
    Validation(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    /// 结构不完整的响应载荷
    pub fn incomplete_payload(what: &str) -> Self {
        ServiceError::Protocol(format!("响应载荷缺失必需字段: {}", what))
    }
}

/// Result 类型别名
pub type ServiceResult<T> = Result<T, ServiceError>;
