// ==========================================
// 供应商 OTIF 监控 - 采购订单行领域模型
// ==========================================
// OrderLine: 导入后的输入行（一行对应表格一行）
// ClassifiedLine: 分类结果（与输入 1:1，创建后不可变）
// ==========================================

use crate::domain::types::OtifStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 供应商编码（花名册主键）
pub type SupplierCode = i64;

// ==========================================
// OrderLine - 采购订单行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub document_no: String,           // 采购单号
    pub supplier_code: SupplierCode,   // 供应商编码
    pub item_no: String,               // 物料号
    pub description: String,           // 物料描述
    pub warehouse_code: String,        // 仓库代码
    pub expected_date: NaiveDate,      // 预计到货日
    pub actual_date: Option<NaiveDate>, // 实际到货日（可空）
    pub order_date: NaiveDate,         // 下单日
    pub total_qty: f64,                // 订购数量
    pub pending_qty: f64,              // 未交数量
    pub unit_cost: f64,                // 不含税单价

    // 源文件行号（错误定位用，从 1 开始）
    #[serde(default)]
    pub row_number: usize,
}

impl OrderLine {
    /// 实际 - 预计 的整天差；无实际日期时为 0
    pub fn day_diff(&self) -> i64 {
        self.actual_date
            .map(|actual| (actual - self.expected_date).num_days())
            .unwrap_or(0)
    }

    pub fn delivered_qty(&self) -> f64 {
        self.total_qty - self.pending_qty
    }
}

// ==========================================
// ClassifiedLine - 已分类订单行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    #[serde(flatten)]
    pub order: OrderLine,

    pub supplier_name: String,
    pub delivered_qty: f64,
    pub day_diff: i64,
    pub status: OtifStatus,
    pub is_otif: bool,

    // 命中规则（如 "R4 actual=expected, nothing pending"）
    pub status_reason: String,
}

impl ClassifiedLine {
    /// 月度分桶键（预计到货日所在月，YYYY-MM）
    pub fn month_key(&self) -> String {
        self.order.expected_date.format("%Y-%m").to_string()
    }
}

// ==========================================
// OrderBatch - 单个文件的导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBatch {
    pub batch_id: String,
    pub file_name: String,
    pub lines: Vec<OrderLine>,
    pub elapsed_ms: u64,
}

impl OrderBatch {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
