// ==========================================
// 产能场景仿真系统 - 明细行注解
// ==========================================
// 职责: 为明细行派生展示就绪的注解 (生效班次 /
//       估算负荷小时 / 需求占比)
// 说明: 班次解析复用 precedence 模块, 不内联重复
// ==========================================

use crate::domain::overrides::{CenterConfigMap, ItemOverride};
use crate::domain::simulation::DetailRow;
use crate::domain::types::GlobalParams;
use crate::engine::precedence;

// ==========================================
// RowAnnotation - 明细行注解
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RowAnnotation {
    /// 物品编号
    pub article: String,
    /// 生效工作中心
    pub effective_center: String,
    /// 生效班次小时数
    pub effective_shift_hours: u32,
    /// 估算年负荷小时 = 饱和度 × 班次 × 工作日
    pub load_hours: f64,
    /// 年需求量占当前明细集合的百分比
    pub impact_pct: f64,
}

/// 为一组明细行派生注解
///
/// 行内的 `Centro` 已是改派后的生效中心, 行内携带的
/// 班次覆盖构成单品层, 与中心配置/全局默认一起参与解析。
pub fn annotate_detail(
    detail: &[DetailRow],
    params: &GlobalParams,
    center_configs: &CenterConfigMap,
) -> Vec<RowAnnotation> {
    let total_volume: f64 = detail.iter().map(|d| d.annual_volume).sum();

    detail
        .iter()
        .map(|row| {
            // 行自带的班次覆盖提升为单品层参与解析
            let row_layer = row.shift_hours_override.map(|shifts| {
                let mut ov = ItemOverride::new(row.article.clone(), row.center.clone());
                ov.shift_hours_override = Some(shifts);
                ov
            });

            let resolved = precedence::resolve(
                &row.center,
                row_layer.as_ref(),
                params.global_shift_hours,
                center_configs,
            );

            let load_hours = row.saturation
                * f64::from(resolved.effective_shift_hours)
                * f64::from(params.work_days);
            let impact_pct = if total_volume > 0.0 {
                row.annual_volume / total_volume * 100.0
            } else {
                0.0
            };

            RowAnnotation {
                article: row.article.clone(),
                effective_center: resolved.effective_center,
                effective_shift_hours: resolved.effective_shift_hours,
                load_hours,
                impact_pct,
            }
        })
        .collect()
}
