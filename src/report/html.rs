// ==========================================
// 供应商 OTIF 监控 - HTML / 文本辅助
// ==========================================

use chrono::NaiveDate;

pub(crate) const DATE_FORMAT: &str = "%d/%m/%Y";

/// HTML 转义
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// 按字符截断（不拆分 UTF-8 字符）
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_else(|| "N/A".to_string())
}

/// 逾期天数着色（>30 红, >15 橙）
pub(crate) fn overdue_color(days: i64) -> &'static str {
    if days > 30 {
        "#d32f2f"
    } else if days > 15 {
        "#f57c00"
    } else {
        "#333"
    }
}

pub(crate) const REPORT_STYLES: &str = r#"
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 1000px; margin: 0 auto; padding: 20px; background-color: #f9f9f9; }
.header { color: white; padding: 40px; text-align: center; border-radius: 15px; margin-bottom: 30px; }
.header h1 { margin: 0; font-size: 2.5em; }
.header .period { font-size: 1.1em; margin-top: 10px; }
.grade-badge { display: inline-block; background: white; padding: 10px 25px; border-radius: 25px; font-weight: bold; margin-top: 15px; }
.metrics { display: flex; justify-content: space-around; margin: 30px 0; flex-wrap: wrap; gap: 20px; }
.metric-box { background: white; padding: 25px; border-radius: 12px; text-align: center; min-width: 180px; flex: 1; }
.metric-value { font-size: 2.2em; font-weight: bold; }
.metric-label { color: #666; font-size: 0.95em; }
.section-title { padding-bottom: 10px; margin-top: 40px; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; background: white; }
th { color: white; padding: 14px; text-align: left; }
td { padding: 12px 14px; border-bottom: 1px solid #e0e0e0; }
.alert { background: #fff3cd; border-left: 5px solid #ffc107; padding: 20px; margin: 25px 0; border-radius: 8px; }
.alert.priority-high { background: #f8d7da; border-left-color: #dc3545; }
.alert-title { font-weight: bold; margin-bottom: 8px; }
.badge { display: inline-block; padding: 4px 12px; border-radius: 12px; font-size: 0.85em; font-weight: bold; margin-left: 10px; color: white; }
.badge-danger { background: #dc3545; }
.badge-warning { background: #ffc107; color: #333; }
.badge-success { background: #28a745; }
.footer { margin-top: 50px; padding: 30px; background: white; border-radius: 12px; text-align: center; color: #666; }
"#;
