// ==========================================
// 供应商 OTIF 监控 - 索赔选择引擎
// ==========================================
// 候选: NOT_DELIVERED 且预计到货日 ≤ today
// 逾期天数 = today - 预计到货日
// 输出顺序: 逾期天数降序
// ==========================================

use crate::domain::claim::{ClaimDocument, ClaimFilter, ClaimLine, ClaimSummary, SupplierClaim};
use crate::domain::order::ClassifiedLine;
use crate::domain::types::OtifStatus;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

pub struct ClaimsEngine;

impl ClaimsEngine {
    /// 选出逾期未交订单行（按逾期天数降序，同天数保持原顺序）
    #[instrument(skip(lines), fields(count = lines.len()))]
    pub fn select_overdue(lines: &[ClassifiedLine], today: NaiveDate) -> Vec<ClaimLine> {
        let mut claims: Vec<ClaimLine> = lines
            .iter()
            .filter(|l| l.status == OtifStatus::NotDelivered && l.order.expected_date <= today)
            .map(|l| ClaimLine {
                days_overdue: (today - l.order.expected_date).num_days(),
                line: l.clone(),
            })
            .collect();

        claims.sort_by(|a, b| b.days_overdue.cmp(&a.days_overdue));
        debug!(overdue = claims.len(), "逾期未交订单行筛选完成");
        claims
    }

    /// 应用筛选条件（不改变相对顺序）
    pub fn apply_filter(claims: &[ClaimLine], filter: &ClaimFilter) -> Vec<ClaimLine> {
        claims
            .iter()
            .filter(|c| {
                filter
                    .supplier_name
                    .as_deref()
                    .map_or(true, |name| c.line.supplier_name == name)
            })
            .filter(|c| {
                filter.warehouses.is_empty()
                    || filter.warehouses.contains(&c.line.order.warehouse_code)
            })
            .filter(|c| c.days_overdue >= filter.min_days_overdue)
            .filter(|c| {
                filter.documents.is_empty() || filter.documents.contains(&c.line.order.document_no)
            })
            .cloned()
            .collect()
    }

    /// 汇总：行数 / 平均逾期天数 / 未交数量 / 涉及供应商数
    pub fn summarize(claims: &[ClaimLine]) -> ClaimSummary {
        let line_count = claims.len();
        let avg_days_overdue = if line_count == 0 {
            0.0
        } else {
            claims.iter().map(|c| c.days_overdue).sum::<i64>() as f64 / line_count as f64
        };
        let suppliers: BTreeSet<&str> = claims.iter().map(|c| c.line.supplier_name.as_str()).collect();

        ClaimSummary {
            line_count,
            avg_days_overdue,
            pending_units: claims.iter().map(|c| c.line.order.pending_qty).sum(),
            supplier_count: suppliers.len(),
        }
    }

    /// 按供应商 → 单据号分组
    ///
    /// - 供应商按名称升序，单据按单据号升序
    /// - 单据的预计日期 / 仓库 / 逾期天数取该单据在输入顺序中的第一行
    pub fn group_by_supplier(claims: &[ClaimLine]) -> Vec<SupplierClaim> {
        let mut suppliers: BTreeMap<&str, BTreeMap<&str, Vec<&ClaimLine>>> = BTreeMap::new();
        for claim in claims {
            suppliers
                .entry(claim.line.supplier_name.as_str())
                .or_default()
                .entry(claim.line.order.document_no.as_str())
                .or_default()
                .push(claim);
        }

        suppliers
            .into_iter()
            .filter_map(|(supplier_name, documents)| {
                let documents: Vec<ClaimDocument> = documents
                    .into_iter()
                    .filter_map(|(document_no, lines)| {
                        let first = lines.first()?;
                        Some(ClaimDocument {
                            document_no: document_no.to_string(),
                            expected_date: first.line.order.expected_date,
                            warehouse_code: first.line.order.warehouse_code.clone(),
                            days_overdue: first.days_overdue,
                            pending_units: lines.iter().map(|l| l.line.order.pending_qty).sum(),
                            lines: lines.into_iter().cloned().collect(),
                        })
                    })
                    .collect();

                let supplier_code = documents.first()?.lines.first()?.line.order.supplier_code;
                Some(SupplierClaim {
                    supplier_name: supplier_name.to_string(),
                    supplier_code,
                    documents,
                })
            })
            .collect()
    }
}
