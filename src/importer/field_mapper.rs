// ==========================================
// 供应商 OTIF 监控 - 字段映射器实现
// ==========================================
// 职责: 源列 → 领域字段映射 + 类型转换
// 日期: YYYY-MM-DD / YYYY-MM-DD HH:MM:SS / YYYY-MM-DDTHH:MM:SS /
//       DD/MM/YYYY / YYYYMMDD / Excel 序列号
// 数值: 支持 '.' 或 ',' 作为小数点
// ==========================================

use crate::domain::order::{OrderLine, SupplierCode};
use crate::domain::supplier::SupplierRecord;
use crate::importer::columns::*;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::RowMapper;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
];

// Excel 最大合法序列号（9999-12-31）
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

// ==========================================
// 单元格解析
// ==========================================

/// 解析日期文本；无法识别返回 None
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }

    // Excel 序列号（1899-12-30 为 0，小数部分为时间）
    let serial = value.parse::<f64>().ok()?;
    if serial.is_finite() && (1.0..=EXCEL_MAX_SERIAL).contains(&serial) {
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        return epoch.checked_add_signed(Duration::days(serial.floor() as i64));
    }
    None
}

/// 解析数值文本（兼容 ',' 小数点与千分位）
pub fn parse_flexible_number(value: &str) -> Option<f64> {
    let compact: String = value.trim().chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let normalized = match (compact.rfind('.'), compact.rfind(',')) {
        // 两者都出现时，靠后的是小数点
        (Some(dot), Some(comma)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (None, Some(_)) => compact.replace(',', "."),
        _ => compact,
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 提取非空字符串
fn get_string(row: &HashMap<String, String>, key: &str) -> Option<String> {
    row.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn require_string(row: &HashMap<String, String>, key: &str, row_number: usize) -> ImportResult<String> {
    get_string(row, key).ok_or_else(|| ImportError::RequiredValueMissing {
        row: row_number,
        field: key.to_string(),
    })
}

fn parse_f64(row: &HashMap<String, String>, key: &str, row_number: usize) -> ImportResult<Option<f64>> {
    match get_string(row, key) {
        None => Ok(None),
        Some(value) => parse_flexible_number(&value)
            .map(Some)
            .ok_or_else(|| ImportError::TypeConversionError {
                row: row_number,
                field: key.to_string(),
                message: format!("无法解析为数值: {}", value),
            }),
    }
}

fn require_f64(row: &HashMap<String, String>, key: &str, row_number: usize) -> ImportResult<f64> {
    parse_f64(row, key, row_number)?.ok_or_else(|| ImportError::RequiredValueMissing {
        row: row_number,
        field: key.to_string(),
    })
}

fn parse_date(row: &HashMap<String, String>, key: &str, row_number: usize) -> ImportResult<Option<NaiveDate>> {
    match get_string(row, key) {
        None => Ok(None),
        Some(value) => parse_flexible_date(&value)
            .map(Some)
            .ok_or(ImportError::DateFormatError {
                row: row_number,
                field: key.to_string(),
                value,
            }),
    }
}

fn require_date(row: &HashMap<String, String>, key: &str, row_number: usize) -> ImportResult<NaiveDate> {
    parse_date(row, key, row_number)?.ok_or_else(|| ImportError::RequiredValueMissing {
        row: row_number,
        field: key.to_string(),
    })
}

/// 供应商编码：整数；Excel 常把 1001 导出为 "1001.0"
fn require_code(row: &HashMap<String, String>, key: &str, row_number: usize) -> ImportResult<SupplierCode> {
    let value = require_f64(row, key, row_number)?;
    if value.fract() != 0.0 || value < i64::MIN as f64 || value > i64::MAX as f64 {
        return Err(ImportError::TypeConversionError {
            row: row_number,
            field: key.to_string(),
            message: format!("编码必须为整数: {}", value),
        });
    }
    Ok(value as SupplierCode)
}

// ==========================================
// OrderFieldMapper - 订单明细映射
// ==========================================
pub struct OrderFieldMapper;

impl RowMapper<OrderLine> for OrderFieldMapper {
    fn required_columns(&self) -> &'static [&'static str] {
        &ORDER_REQUIRED_COLUMNS
    }

    fn map_row(&self, row: &HashMap<String, String>, row_number: usize) -> ImportResult<OrderLine> {
        Ok(OrderLine {
            document_no: require_string(row, COL_DOCUMENT_NO, row_number)?,
            supplier_code: require_code(row, COL_SUPPLIER_CODE, row_number)?,
            item_no: get_string(row, COL_ITEM_NO).unwrap_or_default(),
            description: get_string(row, COL_DESCRIPTION).unwrap_or_default(),
            warehouse_code: get_string(row, COL_WAREHOUSE).unwrap_or_default(),
            expected_date: require_date(row, COL_EXPECTED_DATE, row_number)?,
            actual_date: parse_date(row, COL_ACTUAL_DATE, row_number)?,
            order_date: require_date(row, COL_ORDER_DATE, row_number)?,
            total_qty: require_f64(row, COL_TOTAL_QTY, row_number)?,
            pending_qty: require_f64(row, COL_PENDING_QTY, row_number)?,
            unit_cost: parse_f64(row, COL_UNIT_COST, row_number)?.unwrap_or(0.0),
            row_number,
        })
    }
}

// ==========================================
// SupplierFieldMapper - 供应商花名册映射
// ==========================================
pub struct SupplierFieldMapper;

impl RowMapper<SupplierRecord> for SupplierFieldMapper {
    fn required_columns(&self) -> &'static [&'static str] {
        &SUPPLIER_REQUIRED_COLUMNS
    }

    fn map_row(&self, row: &HashMap<String, String>, row_number: usize) -> ImportResult<SupplierRecord> {
        Ok(SupplierRecord {
            code: require_code(row, COL_SUPPLIER_NO, row_number)?,
            name: require_string(row, COL_SUPPLIER_NAME, row_number)?,
            alias: get_string(row, COL_SUPPLIER_ALIAS),
            supplier_type: get_string(row, COL_SUPPLIER_TYPE),
            buyer: get_string(row, COL_SUPPLIER_BUYER),
            cost_center: get_string(row, COL_SUPPLIER_COST_CENTER),
            warehouse: get_string(row, COL_SUPPLIER_WAREHOUSE),
            email: get_string(row, COL_SUPPLIER_EMAIL),
            updated_at: None,
        })
    }
}
