// ==========================================
// 供应商 OTIF 监控 - 索赔模型
// ==========================================
// 候选: 状态 NOT_DELIVERED 且预计到货日 ≤ 今天
// ==========================================

use crate::domain::order::{ClassifiedLine, SupplierCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 逾期未交订单行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimLine {
    #[serde(flatten)]
    pub line: ClassifiedLine,
    pub days_overdue: i64,
}

/// 索赔筛选条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimFilter {
    pub supplier_name: Option<String>,
    // 空集合表示不过滤
    pub warehouses: BTreeSet<String>,
    pub min_days_overdue: i64,
    // 人工勾选的单据号；空集合表示全部
    pub documents: BTreeSet<String>,
}

/// 索赔汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSummary {
    pub line_count: usize,
    pub avg_days_overdue: f64,
    pub pending_units: f64,
    pub supplier_count: usize,
}

/// 单据级分组（日期/仓库/逾期天数取该单据第一行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimDocument {
    pub document_no: String,
    pub expected_date: NaiveDate,
    pub warehouse_code: String,
    pub days_overdue: i64,
    pub pending_units: f64,
    pub lines: Vec<ClaimLine>,
}

impl ClaimDocument {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// 供应商级分组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierClaim {
    pub supplier_name: String,
    // 取该供应商第一行的编码（查邮箱用）
    pub supplier_code: SupplierCode,
    pub documents: Vec<ClaimDocument>,
}

impl SupplierClaim {
    pub fn line_count(&self) -> usize {
        self.documents.iter().map(ClaimDocument::line_count).sum()
    }

    pub fn pending_units(&self) -> f64 {
        self.documents.iter().map(|d| d.pending_units).sum()
    }

    pub fn avg_days_overdue(&self) -> f64 {
        let lines = self.line_count();
        if lines == 0 {
            return 0.0;
        }
        let total: i64 = self
            .documents
            .iter()
            .flat_map(|d| d.lines.iter())
            .map(|l| l.days_overdue)
            .sum();
        total as f64 / lines as f64
    }
}
