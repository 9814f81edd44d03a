// ==========================================
// 供应商 OTIF 监控 - 报告上下文
// ==========================================

use crate::config::OtifSettings;
use chrono::{NaiveDate, NaiveDateTime};

/// 报告 / 索赔函生成时的外部输入
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub today: NaiveDate,
    pub generated_at: NaiveDateTime,
    pub organization: String,
    pub department: String,
    pub max_listed_lines: usize,
}

impl ReportContext {
    pub fn from_settings(settings: &OtifSettings, generated_at: NaiveDateTime) -> Self {
        Self {
            today: generated_at.date(),
            generated_at,
            organization: settings.organization.clone(),
            department: settings.department.clone(),
            max_listed_lines: settings.max_listed_lines,
        }
    }

    /// 落款（"组织 - 部门"）
    pub fn signature(&self) -> String {
        format!("{} - {}", self.organization, self.department)
    }
}
