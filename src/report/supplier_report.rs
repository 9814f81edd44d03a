// ==========================================
// 供应商 OTIF 监控 - 供应商报告
// ==========================================
// 分区: 未交 (NOT_DELIVERED) / 迟交 (LATE + GRACE_EXCEPTION) / 合规 (is_otif)
// 输出: HTML 附件 + 纯文本邮件正文
// ==========================================

use crate::domain::order::ClassifiedLine;
use crate::domain::types::{DateRange, OtifStatus, ReportGrade};
use crate::engine::aggregator::percentage;
use crate::engine::period::data_bounds;
use crate::i18n::{t, t_with_args};
use crate::report::context::ReportContext;
use crate::report::html::{
    format_date, format_optional_date, html_escape, overdue_color, truncate_chars, REPORT_STYLES,
};
use serde::Serialize;
use std::fmt::Write;
use tracing::{debug, instrument};

/// 邮件正文中描述的最大字符数
pub const EMAIL_DESCRIPTION_MAX_CHARS: usize = 50;

// ==========================================
// SupplierReport - 单个供应商的报告数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierReport {
    pub supplier_name: String,
    // 用户选择的过滤窗口（邮件正文使用）
    pub window: DateRange,
    pub total_lines: usize,
    pub otif_lines: usize,
    pub otif_pct: f64,
    pub grade: ReportGrade,
    pub not_delivered: Vec<ClassifiedLine>,
    pub late: Vec<ClassifiedLine>,
    pub compliant: Vec<ClassifiedLine>,
    // 该供应商数据的实际预计到货日范围（HTML 页头使用）
    data_span: Option<DateRange>,
}

impl SupplierReport {
    /// 从（已按窗口过滤的）分类结果中提取指定供应商并分区
    #[instrument(skip(lines), fields(lines = lines.len()))]
    pub fn build(supplier_name: &str, lines: &[ClassifiedLine], window: DateRange) -> Self {
        let supplier_lines: Vec<ClassifiedLine> = lines
            .iter()
            .filter(|l| l.supplier_name == supplier_name)
            .cloned()
            .collect();

        let total_lines = supplier_lines.len();
        let otif_lines = supplier_lines.iter().filter(|l| l.is_otif).count();
        let otif_pct = percentage(otif_lines as f64, total_lines as f64);

        let not_delivered: Vec<ClassifiedLine> = supplier_lines
            .iter()
            .filter(|l| l.status == OtifStatus::NotDelivered)
            .cloned()
            .collect();
        let late: Vec<ClassifiedLine> = supplier_lines
            .iter()
            .filter(|l| l.status.is_late())
            .cloned()
            .collect();
        let data_span = data_bounds(&supplier_lines);
        let compliant: Vec<ClassifiedLine> = supplier_lines.into_iter().filter(|l| l.is_otif).collect();

        debug!(
            total_lines,
            otif_lines,
            not_delivered = not_delivered.len(),
            late = late.len(),
            "供应商报告分区完成"
        );

        Self {
            supplier_name: supplier_name.to_string(),
            window,
            total_lines,
            otif_lines,
            otif_pct,
            grade: ReportGrade::from_otif_pct(otif_pct),
            not_delivered,
            late,
            compliant,
            data_span,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_lines == 0
    }

    /// 邮件主题（月份取生成日，英文月名）
    pub fn subject(&self, ctx: &ReportContext) -> String {
        let month = ctx.today.format("%B %Y").to_string();
        t_with_args(
            "email.report_subject",
            &[("supplier", &self.supplier_name), ("month", &month)],
        )
    }

    /// 附件文件名: otif_report_{供应商}_{YYYYMMDD}.html
    pub fn file_name(&self, ctx: &ReportContext) -> String {
        let safe_name: String = self
            .supplier_name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("otif_report_{}_{}.html", safe_name, ctx.today.format("%Y%m%d"))
    }

    // ==========================================
    // HTML
    // ==========================================

    pub fn render_html(&self, ctx: &ReportContext) -> String {
        let color = self.grade.color();
        let period = self
            .data_span
            .unwrap_or(self.window)
            .to_string();

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<style>");
        html.push_str(REPORT_STYLES);
        let _ = write!(
            html,
            ".header {{ background: linear-gradient(135deg, {c} 0%, #B8A898 100%); }}\n\
             .grade-badge, .metric-value {{ color: {c}; }}\nth {{ background: {c}; }}\n",
            c = color
        );
        html.push_str("</style>\n</head>\n<body>\n");

        let _ = write!(
            html,
            "<div class=\"header\">\n<h1>{}</h1>\n<h2>{}</h2>\n\
             <div class=\"period\">{}: {}</div>\n<div class=\"grade-badge\">{}</div>\n</div>\n",
            html_escape(&t("report.title")),
            html_escape(&self.supplier_name),
            html_escape(&t("report.period")),
            period,
            html_escape(&self.grade.label()),
        );

        html.push_str("<div class=\"metrics\">\n");
        push_metric_box(&mut html, &self.total_lines.to_string(), &t("report.total_orders"));
        push_metric_box(&mut html, &format!("{:.1}%", self.otif_pct), &t("report.otif_pct"));
        push_metric_box(&mut html, &self.not_delivered.len().to_string(), &t("report.not_delivered"));
        push_metric_box(&mut html, &self.late.len().to_string(), &t("report.late"));
        html.push_str("</div>\n");

        if !self.not_delivered.is_empty() {
            self.push_not_delivered_section(&mut html, ctx);
        }
        if !self.late.is_empty() {
            self.push_late_section(&mut html);
        }
        if !self.compliant.is_empty() {
            self.push_compliant_section(&mut html, ctx);
        }

        let generated = ctx.generated_at.format("%d/%m/%Y %H:%M").to_string();
        let _ = write!(
            html,
            "<div class=\"footer\">\n<p><strong>{}</strong></p>\n<p>{}</p>\n<p>{}</p>\n</div>\n",
            html_escape(&ctx.signature()),
            html_escape(&t("report.footer_contact")),
            html_escape(&t_with_args("report.generated_at", &[("datetime", &generated)])),
        );
        html.push_str("</body>\n</html>\n");
        html
    }

    fn push_not_delivered_section(&self, html: &mut String, ctx: &ReportContext) {
        push_section_title(html, &t("report.not_delivered"), "badge-danger", self.not_delivered.len());
        let _ = write!(
            html,
            "<div class=\"alert priority-high\"><div class=\"alert-title\">{}</div></div>\n",
            html_escape(&t("report.action_required"))
        );
        push_table_header(
            html,
            &[
                "report.col_document",
                "report.col_item",
                "report.col_description",
                "report.col_expected",
                "report.col_pending",
                "report.col_days_overdue",
            ],
        );
        for line in &self.not_delivered {
            let days = (ctx.today - line.order.expected_date).num_days();
            let _ = write!(
                html,
                "<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td>{:.0}</td>\
                 <td><strong style=\"color: {}\">{}</strong></td></tr>\n",
                html_escape(&line.order.document_no),
                html_escape(&line.order.item_no),
                html_escape(&line.order.description),
                format_date(line.order.expected_date),
                line.order.pending_qty,
                overdue_color(days),
                html_escape(&t_with_args("report.days", &[("days", &days.to_string())])),
            );
        }
        html.push_str("</table>\n");
    }

    fn push_late_section(&self, html: &mut String) {
        push_section_title(html, &t("report.late"), "badge-warning", self.late.len());
        let _ = write!(
            html,
            "<div class=\"alert\"><div class=\"alert-title\">{}</div></div>\n",
            html_escape(&t("report.for_your_information"))
        );
        push_table_header(
            html,
            &[
                "report.col_document",
                "report.col_item",
                "report.col_expected",
                "report.col_actual",
                "report.col_day_diff",
                "report.col_status",
            ],
        );
        for line in &self.late {
            let diff = format!("+{}", line.day_diff);
            let _ = write!(
                html,
                "<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><strong style=\"color: #f57c00\">{}</strong></td><td>{}</td></tr>\n",
                html_escape(&line.order.document_no),
                html_escape(&line.order.item_no),
                format_date(line.order.expected_date),
                format_optional_date(line.order.actual_date),
                html_escape(&t_with_args("report.days", &[("days", &diff)])),
                html_escape(&line.status.label()),
            );
        }
        html.push_str("</table>\n");
    }

    fn push_compliant_section(&self, html: &mut String, ctx: &ReportContext) {
        push_section_title(html, &t("report.compliant"), "badge-success", self.compliant.len());
        let _ = write!(
            html,
            "<p style=\"color: #28a745; font-weight: bold;\">{}</p>\n",
            html_escape(&t("report.well_done"))
        );
        push_table_header(
            html,
            &[
                "report.col_document",
                "report.col_item",
                "report.col_expected",
                "report.col_actual",
                "report.col_quantity",
            ],
        );
        for line in self.compliant.iter().take(ctx.max_listed_lines) {
            let _ = write!(
                html,
                "<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td>{:.0}</td></tr>\n",
                html_escape(&line.order.document_no),
                html_escape(&line.order.item_no),
                format_date(line.order.expected_date),
                format_optional_date(line.order.actual_date),
                line.order.total_qty,
            );
        }
        if self.compliant.len() > ctx.max_listed_lines {
            let remaining = (self.compliant.len() - ctx.max_listed_lines).to_string();
            let _ = write!(
                html,
                "<tr><td colspan=\"5\" style=\"text-align: center; font-style: italic; color: #666;\">{}</td></tr>\n",
                html_escape(&t_with_args("report.more_compliant", &[("count", &remaining)]))
            );
        }
        html.push_str("</table>\n");
    }

    // ==========================================
    // 纯文本邮件正文
    // ==========================================

    pub fn render_email_body(&self, ctx: &ReportContext) -> String {
        const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
        let max = ctx.max_listed_lines;
        let mut body = String::new();

        let _ = writeln!(body, "{}\n", t("email.greeting"));
        let _ = writeln!(
            body,
            "{}\n",
            t_with_args(
                "email.report_intro",
                &[
                    ("from", &format_date(self.window.from)),
                    ("to", &format_date(self.window.to)),
                ],
            )
        );
        let _ = writeln!(body, "{}\n{}", t("email.summary"), RULE);
        let _ = writeln!(
            body,
            "{}",
            t_with_args("email.total_orders", &[("count", &self.total_lines.to_string())])
        );
        let _ = writeln!(
            body,
            "{}",
            t_with_args("email.otif_pct", &[("pct", &format!("{:.1}", self.otif_pct))])
        );
        let _ = writeln!(
            body,
            "{}",
            t_with_args("email.otif_orders", &[("count", &self.otif_lines.to_string())])
        );
        let _ = writeln!(
            body,
            "{}",
            t_with_args(
                "email.not_delivered_orders",
                &[("count", &self.not_delivered.len().to_string())]
            )
        );
        let _ = writeln!(
            body,
            "{}",
            t_with_args("email.late_orders", &[("count", &self.late.len().to_string())])
        );

        if !self.not_delivered.is_empty() {
            let _ = writeln!(
                body,
                "\n{}\n{}",
                t_with_args(
                    "email.not_delivered_header",
                    &[("count", &self.not_delivered.len().to_string())]
                ),
                RULE
            );
            for line in self.not_delivered.iter().take(max) {
                let days = (ctx.today - line.order.expected_date).num_days();
                let _ = writeln!(
                    body,
                    "{}",
                    t_with_args(
                        "email.line_not_delivered",
                        &[
                            ("doc", &line.order.document_no),
                            ("desc", &truncate_chars(&line.order.description, EMAIL_DESCRIPTION_MAX_CHARS)),
                            ("date", &format_date(line.order.expected_date)),
                            ("days", &days.to_string()),
                        ],
                    )
                );
            }
            push_more_line(&mut body, self.not_delivered.len(), max);
        }

        if !self.late.is_empty() {
            let _ = writeln!(
                body,
                "\n{}\n{}",
                t_with_args("email.late_header", &[("count", &self.late.len().to_string())]),
                RULE
            );
            for line in self.late.iter().take(max) {
                let _ = writeln!(
                    body,
                    "{}",
                    t_with_args(
                        "email.line_late",
                        &[
                            ("doc", &line.order.document_no),
                            ("desc", &truncate_chars(&line.order.description, EMAIL_DESCRIPTION_MAX_CHARS)),
                            ("days", &line.day_diff.to_string()),
                        ],
                    )
                );
            }
            push_more_line(&mut body, self.late.len(), max);
        }

        let _ = write!(
            body,
            "\n\n{}\n\n{}\n{}\n",
            t("email.attachment_hint"),
            t("email.regards"),
            ctx.signature()
        );
        body
    }
}

fn push_metric_box(html: &mut String, value: &str, label: &str) {
    let _ = write!(
        html,
        "<div class=\"metric-box\"><div class=\"metric-value\">{}</div><div class=\"metric-label\">{}</div></div>\n",
        html_escape(value),
        html_escape(label)
    );
}

fn push_section_title(html: &mut String, title: &str, badge_class: &str, count: usize) {
    let _ = write!(
        html,
        "<h2 class=\"section-title\">{}<span class=\"badge {}\">{}</span></h2>\n",
        html_escape(title),
        badge_class,
        count
    );
}

fn push_table_header(html: &mut String, column_keys: &[&str]) {
    html.push_str("<table>\n<tr>");
    for key in column_keys {
        let _ = write!(html, "<th>{}</th>", html_escape(&t(key)));
    }
    html.push_str("</tr>\n");
}

fn push_more_line(body: &mut String, total: usize, max: usize) {
    if total > max {
        let _ = writeln!(
            body,
            "{}",
            t_with_args("email.more", &[("count", &(total - max).to_string())])
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderLine;
    use crate::i18n::set_locale;
    use crate::i18n::tests::LOCALE_TEST_LOCK;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn line(doc: &str, supplier: &str, status: OtifStatus, day_diff: i64, expected: NaiveDate) -> ClassifiedLine {
        let actual = match status {
            OtifStatus::NotDelivered | OtifStatus::PendingDateComplete => None,
            _ => Some(expected + chrono::Duration::days(day_diff)),
        };
        ClassifiedLine {
            order: OrderLine {
                document_no: doc.to_string(),
                supplier_code: 1,
                item_no: "ART-1".to_string(),
                description: "Silla <tapizada> de exterior con cojín extra largo para jardín".to_string(),
                warehouse_code: "ALM1".to_string(),
                expected_date: expected,
                actual_date: actual,
                order_date: expected - chrono::Duration::days(20),
                total_qty: 10.0,
                pending_qty: if status == OtifStatus::NotDelivered { 4.0 } else { 0.0 },
                unit_cost: 1.0,
                row_number: 1,
            },
            supplier_name: supplier.to_string(),
            delivered_qty: 6.0,
            day_diff,
            status,
            is_otif: status.is_otif(),
            status_reason: String::new(),
        }
    }

    fn context() -> ReportContext {
        ReportContext {
            today: date(2024, 3, 31),
            generated_at: date(2024, 3, 31).and_hms_opt(10, 0, 0).unwrap(),
            organization: "Acme".to_string(),
            department: "Planning".to_string(),
            max_listed_lines: 2,
        }
    }

    fn sample_lines() -> Vec<ClassifiedLine> {
        vec![
            line("PC-1", "Norte", OtifStatus::NotDelivered, 0, date(2024, 3, 1)),
            line("PC-2", "Norte", OtifStatus::Late, 5, date(2024, 3, 2)),
            line("PC-3", "Norte", OtifStatus::GraceException, 1, date(2024, 3, 3)),
            line("PC-4", "Norte", OtifStatus::OnTimeInFull, 0, date(2024, 3, 4)),
            line("PC-5", "Norte", OtifStatus::OnTimeInFull, 0, date(2024, 3, 5)),
            line("PC-6", "Norte", OtifStatus::Early, -2, date(2024, 3, 6)),
            line("PC-9", "Sur", OtifStatus::OnTimeInFull, 0, date(2024, 3, 6)),
        ]
    }

    fn window() -> DateRange {
        DateRange::new(date(2024, 3, 1), date(2024, 3, 31))
    }

    #[test]
    fn test_build_partitions_supplier_lines() {
        let report = SupplierReport::build("Norte", &sample_lines(), window());

        assert_eq!(report.total_lines, 6);
        assert_eq!(report.otif_lines, 3);
        assert_eq!(report.otif_pct, 50.0);
        assert_eq!(report.grade, ReportGrade::NeedsImprovement);
        assert_eq!(report.not_delivered.len(), 1);
        // GRACE_EXCEPTION 同时出现在迟交与合规分区
        assert_eq!(report.late.len(), 2);
        assert_eq!(report.compliant.len(), 3);
    }

    #[test]
    fn test_build_unknown_supplier_is_empty() {
        let report = SupplierReport::build("Oeste", &sample_lines(), window());
        assert!(report.is_empty());
        assert_eq!(report.otif_pct, 0.0);
        assert_eq!(report.grade, ReportGrade::Critical);
    }

    #[test]
    fn test_render_html_escapes_and_caps_compliant_table() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");

        let report = SupplierReport::build("Norte", &sample_lines(), window());
        let html = report.render_html(&context());

        assert!(html.contains("Silla &lt;tapizada&gt;"));
        assert!(!html.contains("<tapizada>"));
        assert!(html.contains("01/03/2024 - 06/03/2024"));
        assert!(html.contains("30 days"));
        assert!(html.contains("+5 days"));
        assert!(html.contains("... and 1 more orders were delivered correctly"));
        assert!(html.contains("#D4C5B9"));
        assert!(html.contains("Generated automatically on 31/03/2024 10:00"));
    }

    #[test]
    fn test_render_email_body() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");

        let lines: Vec<ClassifiedLine> = (1..=4)
            .map(|i| line(&format!("PC-{}", i), "Norte", OtifStatus::NotDelivered, 0, date(2024, 3, i)))
            .collect();
        let report = SupplierReport::build("Norte", &lines, window());
        let body = report.render_email_body(&context());

        assert!(body.starts_with("Dear supplier,"));
        assert!(body.contains("for the period 01/03/2024 - 31/03/2024"));
        assert!(body.contains("NOT DELIVERED ORDERS (4):"));
        assert!(body.contains("Expected date: 01/03/2024 (30 days overdue)"));
        assert!(!body.contains("PC-3 -"));
        assert!(body.contains("... and 2 more orders"));
        assert!(!body.contains("LATE ORDERS"));
        assert!(body.trim_end().ends_with("Acme - Planning"));

        let desc_line = body.lines().find(|l| l.contains("PC-1")).unwrap();
        assert!(desc_line.contains(&truncate_chars(&lines[0].order.description, 50)));
        assert!(!desc_line.contains("para jardín"));
    }

    #[test]
    fn test_subject_and_file_name() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");

        let report = SupplierReport::build("Norte", &sample_lines(), window());
        assert_eq!(report.subject(&context()), "OTIF Report - Norte - March 2024");

        let report = SupplierReport::build("Muebles Norte S.L.", &[], window());
        assert_eq!(
            report.file_name(&context()),
            "otif_report_Muebles_Norte_S_L__20240331.html"
        );
    }
}
