// ==========================================
// 供应商 OTIF 监控 - 供应商花名册模型
// ==========================================

use crate::domain::order::SupplierCode;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub code: SupplierCode,
    pub name: String,
    pub alias: Option<String>,
    pub supplier_type: Option<String>,
    pub buyer: Option<String>,       // 采购负责人
    pub cost_center: Option<String>, // 责任中心
    pub warehouse: Option<String>,
    pub email: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl SupplierRecord {
    pub fn new(code: SupplierCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            alias: None,
            supplier_type: None,
            buyer: None,
            cost_center: None,
            warehouse: None,
            email: None,
            updated_at: None,
        }
    }

    /// 展示名：别名非空优先，否则法定名称
    pub fn display_name(&self) -> String {
        match self.alias.as_deref().map(str::trim) {
            Some(alias) if !alias.is_empty() => alias.to_string(),
            _ => self.name.trim().to_string(),
        }
    }

    pub fn has_email(&self) -> bool {
        self.email
            .as_deref()
            .map(|e| !e.trim().is_empty())
            .unwrap_or(false)
    }
}

/// 花名册中查不到的编码使用的占位名
pub fn placeholder_name(code: SupplierCode) -> String {
    format!("Supplier {}", code)
}
