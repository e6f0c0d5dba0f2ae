// ==========================================
// 产能场景仿真系统 - 覆盖实体定义
// ==========================================
// 职责: 单品覆盖 / 工作中心班次配置
// 线上格式: 与仿真服务端字段名保持一致 (serde rename)
// 红线: 覆盖键 (article_id, origin_center_id) 不可变
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// OverrideKey - 覆盖键
// ==========================================
/// 单品覆盖的唯一键: 物品编号 + 原始工作中心
///
/// 删除/替换覆盖一律按键寻址, 不按列表下标 (下标在
/// 服务端重建列表后不稳定)。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverrideKey {
    /// 物品编号
    #[serde(rename = "articulo")]
    pub article_id: String,
    /// 原始工作中心 (来自主数据, 非改派后中心)
    #[serde(rename = "centro")]
    pub origin_center_id: String,
}

impl OverrideKey {
    pub fn new(article_id: impl Into<String>, origin_center_id: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            origin_center_id: origin_center_id.into(),
        }
    }
}

impl fmt::Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.article_id, self.origin_center_id)
    }
}

// ==========================================
// ItemOverride - 单品覆盖
// ==========================================
/// 单品待定覆盖: 所有参数字段均可选
///
/// 全部字段为空的覆盖合法 (编辑进行中, 尚无有效变化),
/// 在差异引擎中解析为"无可见变化"。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOverride {
    /// 物品编号
    #[serde(rename = "articulo")]
    pub article_id: String,

    /// 原始工作中心
    #[serde(rename = "centro")]
    pub origin_center_id: String,

    /// OEE 覆盖 (0.0 - 1.0 小数)
    #[serde(rename = "oee_override", skip_serializing_if = "Option::is_none")]
    pub oee: Option<f64>,

    /// 节拍覆盖 (件/分钟)
    #[serde(rename = "ppm_override", skip_serializing_if = "Option::is_none")]
    pub throughput_per_minute: Option<f64>,

    /// 年需求量覆盖 (件)
    #[serde(rename = "demanda_override", skip_serializing_if = "Option::is_none")]
    pub annual_volume: Option<f64>,

    /// 改派目标工作中心
    #[serde(rename = "new_centro", skip_serializing_if = "Option::is_none")]
    pub target_center_id: Option<String>,

    /// 单品班次小时覆盖
    #[serde(rename = "horas_turno_override", skip_serializing_if = "Option::is_none")]
    pub shift_hours_override: Option<u32>,

    /// 换型时间覆盖 (小时)
    #[serde(rename = "setup_time_override", skip_serializing_if = "Option::is_none")]
    pub setup_time_override: Option<f64>,

    /// 人机配比覆盖
    #[serde(
        rename = "personnel_ratio_override",
        skip_serializing_if = "Option::is_none"
    )]
    pub personnel_ratio_override: Option<f64>,
}

impl ItemOverride {
    /// 创建空覆盖 (所有参数字段为 None)
    pub fn new(article_id: impl Into<String>, origin_center_id: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            origin_center_id: origin_center_id.into(),
            oee: None,
            throughput_per_minute: None,
            annual_volume: None,
            target_center_id: None,
            shift_hours_override: None,
            setup_time_override: None,
            personnel_ratio_override: None,
        }
    }

    /// 覆盖键
    pub fn key(&self) -> OverrideKey {
        OverrideKey::new(self.article_id.clone(), self.origin_center_id.clone())
    }

    /// 所有可选字段是否均未设置
    pub fn is_noop(&self) -> bool {
        self.oee.is_none()
            && self.throughput_per_minute.is_none()
            && self.annual_volume.is_none()
            && self.target_center_id.is_none()
            && self.shift_hours_override.is_none()
            && self.setup_time_override.is_none()
            && self.personnel_ratio_override.is_none()
    }

    /// 改派目标中心 (过滤空字符串)
    pub fn target_center(&self) -> Option<&str> {
        self.target_center_id.as_deref().filter(|c| !c.is_empty())
    }
}

// ==========================================
// CenterConfig - 工作中心班次配置
// ==========================================
/// 单个工作中心的班次小时配置
///
/// 线上格式: { "<中心编号>": { "shifts": 8|16|24 } }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterConfig {
    /// 班次小时数
    pub shifts: u32,
}

/// 工作中心 → 班次配置映射
///
/// 缺失条目表示继承全局默认; BTreeMap 保证快照顺序确定
pub type CenterConfigMap = BTreeMap<String, CenterConfig>;
