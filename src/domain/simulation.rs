// ==========================================
// 产能场景仿真系统 - 仿真结果与请求载荷
// ==========================================
// 职责: 仿真结果 (summary/detail/meta) 与请求体定义
// 红线: 结果一经接收视为不可变, 编辑只触发新结果
// 线上格式: 服务端列名为西语主数据列 (serde rename)
// ==========================================

use crate::domain::overrides::{CenterConfigMap, ItemOverride, OverrideKey};
use serde::{Deserialize, Serialize};

// ==========================================
// SummaryRow - 中心汇总行
// ==========================================
/// 每工作中心一行的聚合结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// 工作中心编号
    #[serde(rename = "Centro")]
    pub center: String,

    /// 平均饱和度 (0.0 - 1.0+, 可超过 1)
    #[serde(rename = "Saturacion", default)]
    pub saturation: f64,

    /// 年需求量合计 (件)
    #[serde(rename = "Volumen anual", default)]
    pub annual_volume: f64,
}

// ==========================================
// DetailRow - 单品明细行
// ==========================================
/// 每物品一行的明细结果, 携带计算时解析出的
/// 班次覆盖与原始中心, 供差异/注解引擎复用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    /// 物品编号
    #[serde(rename = "Articulo")]
    pub article: String,

    /// 当前 (改派后生效的) 工作中心
    #[serde(rename = "Centro")]
    pub center: String,

    /// 原始工作中心; 服务端仅在发生改派时填写
    #[serde(rename = "centro_original", default, skip_serializing_if = "Option::is_none")]
    pub origin_center: Option<String>,

    /// OEE (0.0 - 1.0 小数)
    #[serde(rename = "%OEE", default)]
    pub oee: f64,

    /// 节拍 (件/分钟)
    #[serde(rename = "Piezas por minuto", default)]
    pub throughput_per_minute: f64,

    /// 年需求量 (件)
    #[serde(rename = "Volumen anual", default)]
    pub annual_volume: f64,

    /// 饱和度
    #[serde(rename = "Saturacion", default)]
    pub saturation: f64,

    /// 计算时采用的单品班次覆盖
    #[serde(
        rename = "horas_turno_override",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub shift_hours_override: Option<u32>,
}

impl DetailRow {
    /// 原始工作中心 (未填写时即当前中心)
    pub fn origin_center(&self) -> &str {
        self.origin_center.as_deref().unwrap_or(&self.center)
    }

    /// 该行对应的覆盖键
    pub fn key(&self) -> OverrideKey {
        OverrideKey::new(self.article.clone(), self.origin_center().to_string())
    }
}

// ==========================================
// ResultMeta - 场景结果元数据
// ==========================================
/// 持久化场景计算结果附带的全局参数快照,
/// 用于加载场景时回填会话参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMeta {
    /// 年工作日
    #[serde(rename = "dias_laborales")]
    pub work_days: u32,

    /// 全局班次小时数
    #[serde(rename = "horas_turno_global")]
    pub global_shift_hours: u32,

    /// 各工作中心班次配置
    #[serde(rename = "center_configs", default)]
    pub center_configs: CenterConfigMap,
}

// ==========================================
// SimulationResult - 仿真结果
// ==========================================
/// 计算服务输出, 经服务边界校验后的结构
///
/// summary 与 detail 允许为空数组, 但不允许缺失
/// (缺失在边界层判定为协议错误, 见 service::payload)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub summary: Vec<SummaryRow>,
    pub detail: Vec<DetailRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResultMeta>,
}

impl SimulationResult {
    /// 按覆盖键查找明细行 (物品编号 + 原始中心)
    pub fn find_detail(&self, key: &OverrideKey) -> Option<&DetailRow> {
        self.detail
            .iter()
            .find(|d| d.article == key.article_id && d.origin_center() == key.origin_center_id)
    }

    /// 按物品编号查找明细行 (对比引擎使用)
    pub fn find_by_article(&self, article: &str) -> Option<&DetailRow> {
        self.detail.iter().find(|d| d.article == article)
    }
}

// ==========================================
// PreviewRequest - 预览重算请求
// ==========================================
/// 预览请求体: 全局参数 + 中心配置 + 覆盖快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub overrides: Vec<ItemOverride>,

    #[serde(rename = "dias_laborales")]
    pub work_days: u32,

    #[serde(rename = "horas_turno")]
    pub global_shift_hours: u32,

    #[serde(rename = "center_configs")]
    pub center_configs: CenterConfigMap,
}

// ==========================================
// ScenarioPayload - 场景保存载荷
// ==========================================
/// 创建/整体更新场景的请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPayload {
    pub name: String,

    #[serde(rename = "dias_laborales")]
    pub work_days: u32,

    #[serde(rename = "horas_turno_global")]
    pub global_shift_hours: u32,

    #[serde(rename = "center_configs")]
    pub center_configs: CenterConfigMap,

    pub overrides: Vec<ItemOverride>,
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_row_parses_master_data_column_names() {
        // 服务端列名沿用西语主数据列
        let row: DetailRow = serde_json::from_str(
            r#"{
                "Articulo": "A1",
                "Centro": "C2",
                "centro_original": "C1",
                "%OEE": 0.85,
                "Piezas por minuto": 12.5,
                "Volumen anual": 80000,
                "Saturacion": 0.62,
                "horas_turno_override": 8
            }"#,
        )
        .expect("明细行解析失败");

        assert_eq!(row.article, "A1");
        assert_eq!(row.center, "C2");
        assert_eq!(row.origin_center(), "C1");
        assert_eq!(row.key(), OverrideKey::new("A1", "C1"));
        assert_eq!(row.shift_hours_override, Some(8));
    }

    #[test]
    fn detail_row_without_reassignment_omits_origin_center() {
        let row: DetailRow = serde_json::from_str(
            r#"{"Articulo": "A1", "Centro": "C1", "Saturacion": 0.5}"#,
        )
        .expect("明细行解析失败");

        assert_eq!(row.origin_center, None);
        // 未改派时原始中心回退为当前中心
        assert_eq!(row.origin_center(), "C1");
    }

    #[test]
    fn item_override_serializes_only_set_fields() {
        let mut ov = ItemOverride::new("A1", "C1");
        ov.shift_hours_override = Some(8);

        let json = serde_json::to_value(&ov).expect("序列化失败");
        assert_eq!(json["articulo"], "A1");
        assert_eq!(json["centro"], "C1");
        assert_eq!(json["horas_turno_override"], 8);
        // 未设置的可选字段不出现在线上载荷中
        assert!(json.get("oee_override").is_none());
        assert!(json.get("new_centro").is_none());
    }

    #[test]
    fn preview_request_uses_service_parameter_names() {
        let request = PreviewRequest {
            overrides: vec![],
            work_days: 238,
            global_shift_hours: 16,
            center_configs: CenterConfigMap::new(),
        };
        let json = serde_json::to_value(&request).expect("序列化失败");
        assert_eq!(json["dias_laborales"], 238);
        assert_eq!(json["horas_turno"], 16);
    }
}
