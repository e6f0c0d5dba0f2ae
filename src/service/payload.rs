// ==========================================
// 产能场景仿真系统 - 边界载荷校验
// ==========================================
// 职责: 计算端点的原始载荷 → 结构校验 → 领域结果
// 红线: summary/detail 缺失判定为协议错误;
//       空数组是合法的空结果, 缺字段不是
// ==========================================

use crate::domain::simulation::{DetailRow, ResultMeta, SimulationResult, SummaryRow};
use crate::service::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};

// ==========================================
// RawSimulationResult - 原始仿真载荷
// ==========================================
/// 计算服务的线上响应形态: summary/detail 在线上层面
/// 允许缺失, 进入领域层前必须通过 [`RawSimulationResult::validate`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSimulationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<SummaryRow>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<DetailRow>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResultMeta>,
}

impl RawSimulationResult {
    /// 结构校验并转换为领域结果
    pub fn validate(self) -> ServiceResult<SimulationResult> {
        let summary = self
            .summary
            .ok_or_else(|| ServiceError::incomplete_payload("summary"))?;
        let detail = self
            .detail
            .ok_or_else(|| ServiceError::incomplete_payload("detail"))?;

        Ok(SimulationResult {
            summary,
            detail,
            meta: self.meta,
        })
    }
}

impl From<SimulationResult> for RawSimulationResult {
    fn from(result: SimulationResult) -> Self {
        Self {
            summary: Some(result.summary),
            detail: Some(result.detail),
            meta: result.meta,
        }
    }
}
