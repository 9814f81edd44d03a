// ==========================================
// 供应商 OTIF 监控 - CSV 导出
// ==========================================
// 供应商指标: otif_suppliers_{YYYYMMDD}.csv
// 逾期未交清单: pending_orders_{YYYYMMDD}.csv
// ==========================================

use crate::domain::claim::ClaimLine;
use crate::domain::metrics::SupplierMetrics;
use crate::report::error::ExportResult;
use crate::report::html::format_date;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

const METRICS_HEADER: [&str; 8] = [
    "supplier_name",
    "otif_count",
    "total_lines",
    "total_qty",
    "delivered_qty",
    "avg_day_diff",
    "otif_pct",
    "fill_rate_pct",
];

const CLAIM_HEADER: [&str; 9] = [
    "supplier_name",
    "supplier_code",
    "document_no",
    "item_no",
    "description",
    "warehouse_code",
    "expected_date",
    "pending_qty",
    "days_overdue",
];

/// 逾期清单的扁平行（ClaimLine 含 flatten 字段，csv 无法直接序列化）
#[derive(Debug, Serialize)]
struct ClaimExportRow<'a> {
    supplier_name: &'a str,
    supplier_code: i64,
    document_no: &'a str,
    item_no: &'a str,
    description: &'a str,
    warehouse_code: &'a str,
    expected_date: String,
    pending_qty: f64,
    days_overdue: i64,
}

pub fn default_metrics_file_name(today: NaiveDate) -> String {
    format!("otif_suppliers_{}.csv", today.format("%Y%m%d"))
}

pub fn default_claims_file_name(today: NaiveDate) -> String {
    format!("pending_orders_{}.csv", today.format("%Y%m%d"))
}

/// 写出供应商指标（无数据时仍写表头）
pub fn write_metrics_csv<W: Write>(writer: W, metrics: &[SupplierMetrics]) -> ExportResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(METRICS_HEADER)?;
    for row in metrics {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_claims_csv<W: Write>(writer: W, claims: &[ClaimLine]) -> ExportResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CLAIM_HEADER)?;
    for claim in claims {
        let order = &claim.line.order;
        csv_writer.serialize(ClaimExportRow {
            supplier_name: &claim.line.supplier_name,
            supplier_code: order.supplier_code,
            document_no: &order.document_no,
            item_no: &order.item_no,
            description: &order.description,
            warehouse_code: &order.warehouse_code,
            expected_date: format_date(order.expected_date),
            pending_qty: order.pending_qty,
            days_overdue: claim.days_overdue,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_metrics_to_path(path: &Path, metrics: &[SupplierMetrics]) -> ExportResult<()> {
    let file = File::create(path)?;
    write_metrics_csv(BufWriter::new(file), metrics)?;
    info!(path = %path.display(), rows = metrics.len(), "供应商指标已导出");
    Ok(())
}

pub fn export_claims_to_path(path: &Path, claims: &[ClaimLine]) -> ExportResult<()> {
    let file = File::create(path)?;
    write_claims_csv(BufWriter::new(file), claims)?;
    info!(path = %path.display(), rows = claims.len(), "逾期未交清单已导出");
    Ok(())
}
