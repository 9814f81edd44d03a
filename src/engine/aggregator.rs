// ==========================================
// 供应商 OTIF 监控 - 指标聚合引擎
// ==========================================
// 职责: 对已分类订单行做纯归约（不修改输入）
// - 供应商指标 / 月度演进 / 供应商 × 月度演进
// - 窗口汇总 / 单供应商状态分布
// ==========================================
// 百分比统一保留 2 位小数；分母为 0 时为 0
// ==========================================

use crate::domain::metrics::{
    MonthlyEvolutionPoint, OtifSummary, StatusCount, SupplierMetrics, SupplierMonthlyPoint,
};
use crate::domain::order::ClassifiedLine;
use crate::domain::types::OtifStatus;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::instrument;

/// 供应商演进图默认取前 N 个供应商
pub const DEFAULT_TOP_N_SUPPLIERS: usize = 10;

/// 保留 2 位小数（四舍五入，远离零）
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 百分比 = part / whole × 100，保留 2 位小数
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        round2(part / whole * 100.0)
    }
}

#[derive(Default)]
struct SupplierAccumulator {
    otif_count: usize,
    total_lines: usize,
    total_qty: f64,
    delivered_qty: f64,
    day_diff_sum: i64,
}

#[derive(Default)]
struct OtifCounter {
    otif: usize,
    total: usize,
}

impl OtifCounter {
    fn push(&mut self, line: &ClassifiedLine) {
        self.total += 1;
        if line.is_otif {
            self.otif += 1;
        }
    }

    fn pct(&self) -> f64 {
        percentage(self.otif as f64, self.total as f64)
    }
}

// ==========================================
// AggregationEngine - 指标聚合
// ==========================================
pub struct AggregationEngine;

impl AggregationEngine {
    /// 按供应商展示名分组计算指标（结果按名称升序）
    #[instrument(skip(lines), fields(count = lines.len()))]
    pub fn supplier_metrics(lines: &[ClassifiedLine]) -> Vec<SupplierMetrics> {
        let mut groups: BTreeMap<&str, SupplierAccumulator> = BTreeMap::new();
        for line in lines {
            let acc = groups.entry(line.supplier_name.as_str()).or_default();
            acc.total_lines += 1;
            if line.is_otif {
                acc.otif_count += 1;
            }
            acc.total_qty += line.order.total_qty;
            acc.delivered_qty += line.delivered_qty;
            acc.day_diff_sum += line.day_diff;
        }

        groups
            .into_iter()
            .map(|(name, acc)| SupplierMetrics {
                supplier_name: name.to_string(),
                otif_count: acc.otif_count,
                total_lines: acc.total_lines,
                total_qty: acc.total_qty,
                delivered_qty: acc.delivered_qty,
                avg_day_diff: acc.day_diff_sum as f64 / acc.total_lines as f64,
                otif_pct: percentage(acc.otif_count as f64, acc.total_lines as f64),
                fill_rate_pct: percentage(acc.delivered_qty, acc.total_qty),
            })
            .collect()
    }

    /// 按预计到货月（YYYY-MM）分桶，结果按时间顺序
    pub fn monthly_evolution(lines: &[ClassifiedLine]) -> Vec<MonthlyEvolutionPoint> {
        let mut buckets: BTreeMap<String, OtifCounter> = BTreeMap::new();
        for line in lines {
            buckets.entry(line.month_key()).or_default().push(line);
        }

        buckets
            .into_iter()
            .map(|(month, counter)| MonthlyEvolutionPoint {
                otif_pct: counter.pct(),
                otif_count: counter.otif,
                total_lines: counter.total,
                month,
            })
            .collect()
    }

    /// 订单行数最多的前 N 个供应商（同数量按名称升序）
    pub fn top_suppliers_by_volume(lines: &[ClassifiedLine], top_n: usize) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for line in lines {
            *counts.entry(line.supplier_name.as_str()).or_insert(0) += 1;
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
            .into_iter()
            .take(top_n)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// 前 N 个供应商的 供应商 × 月度 演进（按供应商、月份排序）
    #[instrument(skip(lines), fields(count = lines.len()))]
    pub fn supplier_monthly_evolution(
        lines: &[ClassifiedLine],
        top_n: usize,
    ) -> Vec<SupplierMonthlyPoint> {
        let top: HashSet<String> = Self::top_suppliers_by_volume(lines, top_n)
            .into_iter()
            .collect();

        let mut buckets: BTreeMap<(&str, String), OtifCounter> = BTreeMap::new();
        for line in lines.iter().filter(|l| top.contains(&l.supplier_name)) {
            buckets
                .entry((line.supplier_name.as_str(), line.month_key()))
                .or_default()
                .push(line);
        }

        buckets
            .into_iter()
            .map(|((supplier, month), counter)| SupplierMonthlyPoint {
                supplier_name: supplier.to_string(),
                month,
                otif_count: counter.otif,
                total_lines: counter.total,
                otif_pct: counter.pct(),
            })
            .collect()
    }

    /// 窗口汇总
    pub fn summary(lines: &[ClassifiedLine]) -> OtifSummary {
        let otif_lines = lines.iter().filter(|l| l.is_otif).count();
        let suppliers: BTreeSet<&str> = lines.iter().map(|l| l.supplier_name.as_str()).collect();

        OtifSummary {
            total_lines: lines.len(),
            otif_lines,
            otif_pct: percentage(otif_lines as f64, lines.len() as f64),
            supplier_count: suppliers.len(),
        }
    }

    /// 单个供应商的状态分布（仅列出出现过的状态，按固定顺序）
    pub fn status_breakdown(lines: &[ClassifiedLine], supplier_name: &str) -> Vec<StatusCount> {
        let mut counts: HashMap<OtifStatus, usize> = HashMap::new();
        for line in lines.iter().filter(|l| l.supplier_name == supplier_name) {
            *counts.entry(line.status).or_insert(0) += 1;
        }

        OtifStatus::ALL
            .iter()
            .filter_map(|status| {
                counts.get(status).map(|count| StatusCount {
                    status: *status,
                    count: *count,
                })
            })
            .collect()
    }

    // ==========================================
    // 排序辅助
    // ==========================================

    /// %OTIF 降序（同值按名称升序）
    pub fn sort_by_otif_desc(metrics: &mut [SupplierMetrics]) {
        metrics.sort_by(|a, b| {
            b.otif_pct
                .partial_cmp(&a.otif_pct)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.supplier_name.cmp(&b.supplier_name))
        });
    }

    /// 订单行数降序（同值按名称升序）
    pub fn sort_by_volume_desc(metrics: &mut [SupplierMetrics]) {
        metrics.sort_by(|a, b| {
            b.total_lines
                .cmp(&a.total_lines)
                .then_with(|| a.supplier_name.cmp(&b.supplier_name))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderLine;
    use chrono::NaiveDate;

    fn classified(supplier: &str, month: u32, is_otif: bool, total: f64, pending: f64) -> ClassifiedLine {
        let expected = NaiveDate::from_ymd_opt(2024, month, 15).unwrap();
        ClassifiedLine {
            order: OrderLine {
                document_no: "PC".to_string(),
                supplier_code: 1,
                item_no: "I".to_string(),
                description: "D".to_string(),
                warehouse_code: "W".to_string(),
                expected_date: expected,
                actual_date: Some(expected),
                order_date: expected,
                total_qty: total,
                pending_qty: pending,
                unit_cost: 1.0,
                row_number: 0,
            },
            supplier_name: supplier.to_string(),
            delivered_qty: total - pending,
            day_diff: if is_otif { 0 } else { 5 },
            status: if is_otif { OtifStatus::OnTimeInFull } else { OtifStatus::Late },
            is_otif,
            status_reason: String::new(),
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(percentage(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_supplier_metrics() {
        let lines = vec![
            classified("Acme", 1, true, 10.0, 0.0),
            classified("Acme", 1, false, 10.0, 5.0),
            classified("Acme", 2, true, 20.0, 0.0),
            classified("Beta", 2, false, 0.0, 0.0),
        ];
        let metrics = AggregationEngine::supplier_metrics(&lines);
        assert_eq!(metrics.len(), 2);

        let acme = &metrics[0];
        assert_eq!(acme.supplier_name, "Acme");
        assert_eq!(acme.otif_count, 2);
        assert_eq!(acme.total_lines, 3);
        assert_eq!(acme.otif_pct, 66.67);
        assert_eq!(acme.fill_rate_pct, 87.5);
        assert!((acme.avg_day_diff - 5.0 / 3.0).abs() < 1e-9);

        // 订购数量为 0 时 fill rate 为 0
        assert_eq!(metrics[1].fill_rate_pct, 0.0);
    }

    #[test]
    fn test_monthly_evolution_is_chronological() {
        let lines = vec![
            classified("Acme", 3, true, 1.0, 0.0),
            classified("Acme", 1, false, 1.0, 0.0),
            classified("Beta", 1, true, 1.0, 0.0),
        ];
        let evo = AggregationEngine::monthly_evolution(&lines);
        let months: Vec<_> = evo.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-03"]);
        assert_eq!(evo[0].otif_pct, 50.0);
        assert_eq!(evo.iter().map(|p| p.total_lines).sum::<usize>(), lines.len());
    }

    #[test]
    fn test_top_suppliers_tie_broken_by_name() {
        let lines = vec![
            classified("Zeta", 1, true, 1.0, 0.0),
            classified("Zeta", 1, true, 1.0, 0.0),
            classified("Beta", 1, true, 1.0, 0.0),
            classified("Alpha", 1, true, 1.0, 0.0),
        ];
        let top = AggregationEngine::top_suppliers_by_volume(&lines, 2);
        assert_eq!(top, vec!["Zeta".to_string(), "Alpha".to_string()]);

        let evo = AggregationEngine::supplier_monthly_evolution(&lines, 2);
        assert!(evo.iter().all(|p| p.supplier_name != "Beta"));
    }

    #[test]
    fn test_summary_and_breakdown() {
        let lines = vec![
            classified("Acme", 1, true, 1.0, 0.0),
            classified("Acme", 1, false, 1.0, 0.0),
            classified("Beta", 1, true, 1.0, 0.0),
        ];
        let summary = AggregationEngine::summary(&lines);
        assert_eq!(summary.total_lines, 3);
        assert_eq!(summary.otif_lines, 2);
        assert_eq!(summary.supplier_count, 2);
        assert_eq!(summary.otif_pct, 66.67);

        let breakdown = AggregationEngine::status_breakdown(&lines, "Acme");
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].status, OtifStatus::OnTimeInFull);
        assert_eq!(breakdown[1].status, OtifStatus::Late);

        let empty = AggregationEngine::summary(&[]);
        assert_eq!(empty.otif_pct, 0.0);
    }

    #[test]
    fn test_sort_helpers() {
        let mut metrics = AggregationEngine::supplier_metrics(&[
            classified("Acme", 1, false, 1.0, 0.0),
            classified("Beta", 1, true, 1.0, 0.0),
            classified("Beta", 1, true, 1.0, 0.0),
        ]);
        AggregationEngine::sort_by_otif_desc(&mut metrics);
        assert_eq!(metrics[0].supplier_name, "Beta");
        AggregationEngine::sort_by_volume_desc(&mut metrics);
        assert_eq!(metrics[0].supplier_name, "Beta");
    }
}
