// ==========================================
// 产能场景仿真系统 - 暂存层
// ==========================================
// 职责: 维护待定 (未保存) 的本地编辑状态
// ==========================================

pub mod override_store;

pub use override_store::OverrideStore;
