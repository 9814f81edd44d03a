// ==========================================
// 供应商 OTIF 监控 - 聚合结果模型
// ==========================================
// 所有指标按筛选窗口即时计算，不落库
// ==========================================

use crate::domain::types::{OtifStatus, Trend};
use serde::{Deserialize, Serialize};

/// 单个供应商在窗口内的指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierMetrics {
    pub supplier_name: String,
    pub otif_count: usize,
    pub total_lines: usize,
    pub total_qty: f64,
    pub delivered_qty: f64,
    pub avg_day_diff: f64,
    pub otif_pct: f64,
    pub fill_rate_pct: f64,
}

/// 月度演进点（按预计到货月分桶）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyEvolutionPoint {
    pub month: String, // YYYY-MM
    pub otif_count: usize,
    pub total_lines: usize,
    pub otif_pct: f64,
}

/// 供应商 × 月度演进点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierMonthlyPoint {
    pub supplier_name: String,
    pub month: String,
    pub otif_count: usize,
    pub total_lines: usize,
    pub otif_pct: f64,
}

/// 窗口汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtifSummary {
    pub total_lines: usize,
    pub otif_lines: usize,
    pub otif_pct: f64,
    pub supplier_count: usize,
}

/// 与上月对比
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub previous_otif_pct: f64,
    pub previous_lines: usize,
    pub current_otif_pct: f64,
    pub delta: f64,
    pub trend: Trend,
}

/// 单状态计数（供应商状态分布）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OtifStatus,
    pub count: usize,
}
