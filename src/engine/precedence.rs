// ==========================================
// 产能场景仿真系统 - 配置优先级解析
// ==========================================
// 职责: 解析单品生效中心与生效班次小时
// 优先级 (高到低): 单品覆盖 → 中心配置 → 全局默认
// 红线: 优先级逻辑只允许存在于本模块, 其他位置
//       内联重复判断视为缺陷
// ==========================================

use crate::domain::overrides::{CenterConfigMap, ItemOverride};

// ==========================================
// ResolvedAssignment - 解析结果
// ==========================================
/// 单品的生效分派: 生效工作中心 + 生效班次小时
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssignment {
    /// 生效工作中心 (改派目标, 否则原始中心)
    pub effective_center: String,
    /// 生效班次小时数
    pub effective_shift_hours: u32,
}

/// 解析单品的生效中心与生效班次小时
///
/// 纯函数, 对所有输入全定义 (含缺失覆盖字段):
/// - 生效中心 = 覆盖改派目标 ?? 原始中心
/// - 生效班次 = 单品班次覆盖 ?? 中心配置[生效中心] ?? 全局默认
///
/// 注意: 中心配置按 **生效** 中心查表 (改派后按目标中心的
/// 班次配置计算)。
pub fn resolve(
    origin_center: &str,
    item_override: Option<&ItemOverride>,
    global_shift_hours: u32,
    center_configs: &CenterConfigMap,
) -> ResolvedAssignment {
    let effective_center = item_override
        .and_then(|ov| ov.target_center())
        .unwrap_or(origin_center)
        .to_string();

    let effective_shift_hours = item_override
        .and_then(|ov| ov.shift_hours_override)
        .or_else(|| center_configs.get(&effective_center).map(|c| c.shifts))
        .unwrap_or(global_shift_hours);

    ResolvedAssignment {
        effective_center,
        effective_shift_hours,
    }
}
