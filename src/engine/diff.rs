// ==========================================
// 产能场景仿真系统 - 差异判定引擎
// ==========================================
// 职责: 判定覆盖相对解析结果的"已变化"字段标记
// 红线: 数值容差策略集中于此, 其他位置的
//       临时比较视为缺陷
// 输出: 仅用于展示强调, 不参与任何计算
// ==========================================

use crate::domain::overrides::{CenterConfigMap, ItemOverride};
use crate::domain::simulation::DetailRow;
use crate::engine::precedence;

/// OEE 变化判定容差 (小数占比)
pub const OEE_TOLERANCE: f64 = 0.001;

// ==========================================
// ChangedFields - 变化字段标记
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangedFields {
    pub oee: bool,
    pub throughput: bool,
    pub annual_volume: bool,
    pub center: bool,
    pub shift_hours: bool,
}

impl ChangedFields {
    /// 是否存在任一变化
    pub fn any(&self) -> bool {
        self.oee || self.throughput || self.annual_volume || self.center || self.shift_hours
    }
}

// ==========================================
// DiffEngine - 差异判定引擎
// ==========================================
pub struct DiffEngine;

impl DiffEngine {
    /// 判定覆盖相对其解析明细行的变化字段
    ///
    /// 明细行可缺失 (覆盖对应的物品尚未出现在当前结果中),
    /// 此时基准值按 0 处理。
    ///
    /// 判定规则:
    /// - OEE: |解析值 − 覆盖值| > 0.001
    /// - 节拍 / 年需求量: 四舍五入到整数后不相等
    /// - 中心: 改派目标已设置且 ≠ 解析原始中心
    /// - 班次: 覆盖已设置且 ≠ 该行的基线班次解析
    ///   (基线 = 忽略单品覆盖后的中心/全局解析)
    pub fn diff(
        row: Option<&DetailRow>,
        item: &ItemOverride,
        global_shift_hours: u32,
        center_configs: &CenterConfigMap,
    ) -> ChangedFields {
        let resolved_oee = row.map(|r| r.oee).unwrap_or(0.0);
        let resolved_tpm = row.map(|r| r.throughput_per_minute).unwrap_or(0.0);
        let resolved_volume = row.map(|r| r.annual_volume).unwrap_or(0.0);
        let origin_center = row
            .map(|r| r.origin_center())
            .unwrap_or(item.origin_center_id.as_str());

        // 基线班次: 忽略单品覆盖, 仅中心配置与全局默认参与
        let baseline_shift_hours =
            precedence::resolve(origin_center, None, global_shift_hours, center_configs)
                .effective_shift_hours;

        ChangedFields {
            oee: item
                .oee
                .map(|v| (resolved_oee - v).abs() > OEE_TOLERANCE)
                .unwrap_or(false),
            throughput: item
                .throughput_per_minute
                .map(|v| round_to_unit(v) != round_to_unit(resolved_tpm))
                .unwrap_or(false),
            annual_volume: item
                .annual_volume
                .map(|v| round_to_unit(v) != round_to_unit(resolved_volume))
                .unwrap_or(false),
            center: item
                .target_center()
                .map(|c| c != origin_center)
                .unwrap_or(false),
            shift_hours: item
                .shift_hours_override
                .map(|v| v != baseline_shift_hours)
                .unwrap_or(false),
        }
    }
}

fn round_to_unit(value: f64) -> i64 {
    value.round() as i64
}
