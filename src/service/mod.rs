// ==========================================
// 产能场景仿真系统 - 服务边界层
// ==========================================
// 职责: 定义计算/持久化服务契约 (异步 trait)
// 说明: 饱和度公式属于服务端内部, 本层只消费
//       (参数, 覆盖) → 结果 的黑盒函数
// ==========================================

pub mod error;
pub mod payload;

// 重导出核心类型
pub use error::{ServiceError, ServiceResult};
pub use payload::RawSimulationResult;

use crate::domain::scenario::{HistoryEntry, Scenario, ScenarioSummary};
use crate::domain::simulation::{PreviewRequest, ScenarioPayload};
use async_trait::async_trait;

// ==========================================
// SimulationService - 仿真服务契约
// ==========================================
/// 计算与持久化服务的统一契约
///
/// 计算端点返回原始载荷 [`RawSimulationResult`], 调用方
/// 必须经 `validate()` 完成结构校验后才能安装结果。
#[async_trait]
pub trait SimulationService: Send + Sync {
    /// 列出已保存场景 (id + 名称)
    async fn list_scenarios(&self) -> ServiceResult<Vec<ScenarioSummary>>;

    /// 计算基础场景 (无持久化覆盖, 纯默认)
    async fn compute_base(
        &self,
        work_days: u32,
        global_shift_hours: u32,
    ) -> ServiceResult<RawSimulationResult>;

    /// 计算持久化场景, 结果携带 meta (存储的全局参数)
    async fn compute_scenario(
        &self,
        id: i64,
        work_days: u32,
        global_shift_hours: u32,
    ) -> ServiceResult<RawSimulationResult>;

    /// 按待定参数预览重算, 不持久化任何内容
    async fn preview(&self, request: &PreviewRequest) -> ServiceResult<RawSimulationResult>;

    /// 创建新场景, 返回服务端分配 id 的规范副本
    async fn create_scenario(&self, payload: &ScenarioPayload) -> ServiceResult<Scenario>;

    /// 重命名场景
    async fn rename_scenario(&self, id: i64, name: &str) -> ServiceResult<()>;

    /// 整体更新场景存储记录
    async fn update_scenario_full(&self, id: i64, payload: &ScenarioPayload) -> ServiceResult<()>;

    /// 删除场景
    async fn delete_scenario(&self, id: i64) -> ServiceResult<()>;

    /// 查询场景审计历史 (只读展示)
    async fn scenario_history(&self, id: i64) -> ServiceResult<Vec<HistoryEntry>>;
}
