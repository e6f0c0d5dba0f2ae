// ==========================================
// 产能场景仿真系统 - 场景对比引擎
// ==========================================
// 职责: 对两份独立计算的结果生成聚合与单品差值
// 红线: 只读, 不改暂存, 不触发重算
// ==========================================

use crate::domain::simulation::{SimulationResult, SummaryRow};

// ==========================================
// AggregateStats - 单侧聚合统计
// ==========================================
/// 汇总行聚合: 平均饱和度 / 中心数 / 年需求量合计
///
/// 同时服务于当前结果的概览展示与对比双侧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateStats {
    pub mean_saturation: f64,
    pub center_count: usize,
    pub total_annual_volume: f64,
}

impl AggregateStats {
    pub fn from_summary(rows: &[SummaryRow]) -> Self {
        let center_count = rows.len();
        let total_annual_volume: f64 = rows.iter().map(|r| r.annual_volume).sum();
        let mean_saturation = if center_count == 0 {
            0.0
        } else {
            rows.iter().map(|r| r.saturation).sum::<f64>() / center_count as f64
        };

        Self {
            mean_saturation,
            center_count,
            total_annual_volume,
        }
    }
}

// ==========================================
// ArticleDelta - 单品差值行
// ==========================================
/// 对比表的单品行: 展示字段优先取 B 侧, 缺失回退 A 侧;
/// 饱和度差值以百分点表示
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDelta {
    pub article: String,
    pub center: String,
    pub annual_volume: f64,
    pub throughput_per_minute: f64,
    pub oee: f64,
    pub saturation_a: f64,
    pub saturation_b: f64,
    /// (satB − satA) × 100, 缺失侧按 0 参与减法
    pub delta_points: f64,
}

// ==========================================
// ComparisonReport - 对比报告
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub aggregate_a: AggregateStats,
    pub aggregate_b: AggregateStats,
    pub rows: Vec<ArticleDelta>,
}

// ==========================================
// ComparisonEngine - 场景对比引擎
// ==========================================
pub struct ComparisonEngine;

impl ComparisonEngine {
    /// 对比两份结果
    ///
    /// 单品行取两侧物品编号并集 (A 侧顺序优先, 再追加仅 B 侧
    /// 出现的物品); 仅单侧存在的物品是显式回退, 不是错误。
    pub fn compare(a: &SimulationResult, b: &SimulationResult) -> ComparisonReport {
        let mut articles: Vec<String> = Vec::new();
        for d in a.detail.iter().chain(b.detail.iter()) {
            if !articles.iter().any(|known| known == &d.article) {
                articles.push(d.article.clone());
            }
        }

        let rows = articles
            .into_iter()
            .map(|article| {
                let row_a = a.find_by_article(&article);
                let row_b = b.find_by_article(&article);
                // 展示字段: B 侧优先, 回退 A 侧
                let display = row_b.or(row_a);

                let saturation_a = row_a.map(|r| r.saturation).unwrap_or(0.0);
                let saturation_b = row_b.map(|r| r.saturation).unwrap_or(0.0);

                ArticleDelta {
                    article,
                    center: display.map(|r| r.center.clone()).unwrap_or_default(),
                    annual_volume: display.map(|r| r.annual_volume).unwrap_or(0.0),
                    throughput_per_minute: display
                        .map(|r| r.throughput_per_minute)
                        .unwrap_or(0.0),
                    oee: display.map(|r| r.oee).unwrap_or(0.0),
                    saturation_a,
                    saturation_b,
                    delta_points: (saturation_b - saturation_a) * 100.0,
                }
            })
            .collect();

        ComparisonReport {
            aggregate_a: AggregateStats::from_summary(&a.summary),
            aggregate_b: AggregateStats::from_summary(&b.summary),
            rows,
        }
    }
}
