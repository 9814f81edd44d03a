// ==========================================
// 供应商 OTIF 监控 - 源表列定义与结构检查
// ==========================================
// 列名与 ERP 导出文件完全一致（西班牙语）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};

// ===== 订单明细表 =====
pub const COL_DOCUMENT_NO: &str = "Nº documento";
pub const COL_SUPPLIER_CODE: &str = "Compra a-Nº proveedor";
pub const COL_ITEM_NO: &str = "Nº";
pub const COL_DESCRIPTION: &str = "Descripción";
pub const COL_WAREHOUSE: &str = "Cód. almacén";
pub const COL_EXPECTED_DATE: &str = "Fecha recepción esperada";
pub const COL_ACTUAL_DATE: &str = "Fecha recepción real";
pub const COL_ORDER_DATE: &str = "Fecha pedido";
pub const COL_TOTAL_QTY: &str = "Cantidad (base)";
pub const COL_PENDING_QTY: &str = "Cdad. pendiente (base)";
pub const COL_UNIT_COST: &str = "Coste unit. directo excl. IVA";

pub const ORDER_REQUIRED_COLUMNS: [&str; 11] = [
    COL_DOCUMENT_NO,
    COL_SUPPLIER_CODE,
    COL_ITEM_NO,
    COL_DESCRIPTION,
    COL_WAREHOUSE,
    COL_EXPECTED_DATE,
    COL_ACTUAL_DATE,
    COL_ORDER_DATE,
    COL_TOTAL_QTY,
    COL_PENDING_QTY,
    COL_UNIT_COST,
];

// ===== 供应商花名册 =====
pub const COL_SUPPLIER_NO: &str = "Nº";
pub const COL_SUPPLIER_NAME: &str = "Nombre";
pub const COL_SUPPLIER_ALIAS: &str = "Alias";
pub const COL_SUPPLIER_TYPE: &str = "Tipo Proveedor";
pub const COL_SUPPLIER_BUYER: &str = "Responsable compras";
pub const COL_SUPPLIER_COST_CENTER: &str = "Centro responsabilidad";
pub const COL_SUPPLIER_WAREHOUSE: &str = "Cód. almacén";
pub const COL_SUPPLIER_EMAIL: &str = "Correo electrónico";

pub const SUPPLIER_REQUIRED_COLUMNS: [&str; 2] = [COL_SUPPLIER_NO, COL_SUPPLIER_NAME];

/// 检查必需列是否齐全；缺失时列出全部缺失列
pub fn check_required_columns(headers: &[String], required: &[&str]) -> ImportResult<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::MissingColumns(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_missing_columns_reported() {
        let headers: Vec<String> = ORDER_REQUIRED_COLUMNS
            .iter()
            .filter(|c| **c != COL_PENDING_QTY && **c != COL_UNIT_COST)
            .map(|c| c.to_string())
            .collect();

        match check_required_columns(&headers, &ORDER_REQUIRED_COLUMNS) {
            Err(ImportError::MissingColumns(missing)) => {
                assert_eq!(missing, vec![COL_PENDING_QTY.to_string(), COL_UNIT_COST.to_string()]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_columns_are_fine() {
        let headers = vec!["Nº".to_string(), "Nombre".to_string(), "Extra".to_string()];
        assert!(check_required_columns(&headers, &SUPPLIER_REQUIRED_COLUMNS).is_ok());
    }
}
