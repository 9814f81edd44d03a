// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、订单行构造、CSV 测试文件生成
// ==========================================
#![allow(dead_code)]

use chrono::NaiveDate;
use otif_monitor::db::{ensure_schema, open_sqlite_connection};
use otif_monitor::domain::{OrderLine, SupplierCode};
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

/// 订单明细表头（ERP 导出列名）
pub const ORDER_CSV_HEADER: &str = "Nº documento,Compra a-Nº proveedor,Nº,Descripción,Cód. almacén,\
Fecha recepción esperada,Fecha recepción real,Fecha pedido,Cantidad (base),Cdad. pendiente (base),\
Coste unit. directo excl. IVA";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    ensure_schema(&conn)?;

    Ok((temp_file, db_path))
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// 构造订单行
pub fn order_line(
    document_no: &str,
    supplier_code: SupplierCode,
    expected: NaiveDate,
    actual: Option<NaiveDate>,
    total_qty: f64,
    pending_qty: f64,
) -> OrderLine {
    OrderLine {
        document_no: document_no.to_string(),
        supplier_code,
        item_no: format!("ART-{}", document_no),
        description: format!("Artículo {}", document_no),
        warehouse_code: "ALM1".to_string(),
        expected_date: expected,
        actual_date: actual,
        order_date: expected - chrono::Duration::days(30),
        total_qty,
        pending_qty,
        unit_cost: 10.0,
        row_number: 1,
    }
}

/// 写入临时 CSV 文件（后缀 .csv）
pub fn write_csv(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("Failed to create temp csv");
    file.write_all(content.as_bytes()).expect("Failed to write temp csv");
    file.flush().expect("Failed to flush temp csv");
    file
}

/// 订单行 → ERP 格式 CSV（日期 DD/MM/YYYY）
pub fn write_orders_csv(lines: &[OrderLine]) -> NamedTempFile {
    let mut content = String::from(ORDER_CSV_HEADER);
    content.push('\n');
    for line in lines {
        content.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{}\n",
            line.document_no,
            line.supplier_code,
            line.item_no,
            line.description,
            line.warehouse_code,
            line.expected_date.format("%d/%m/%Y"),
            line.actual_date
                .map(|a| a.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
            line.order_date.format("%d/%m/%Y"),
            line.total_qty,
            line.pending_qty,
            line.unit_cost,
        ));
    }
    write_csv(&content)
}

/// 花名册 CSV
pub fn write_roster_csv(rows: &[(SupplierCode, &str, &str, &str)]) -> NamedTempFile {
    let mut content = String::from("Nº,Nombre,Alias,Correo electrónico\n");
    for (code, name, alias, email) in rows {
        content.push_str(&format!("{},{},{},{}\n", code, name, alias, email));
    }
    write_csv(&content)
}
