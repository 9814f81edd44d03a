// ==========================================
// 供应商 OTIF 监控 - 索赔函
// ==========================================
// 每个有邮箱的供应商一封；没有邮箱的供应商跳过并回报
// ==========================================

use crate::domain::claim::SupplierClaim;
use crate::domain::order::SupplierCode;
use crate::i18n::{t, t_with_args};
use crate::report::context::ReportContext;
use crate::report::html::format_date;
use crate::report::mailto::build_mailto;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;
use tracing::{info, warn};

const SEPARATOR: &str =
    "================================================================================";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimLetter {
    pub supplier_name: String,
    pub supplier_code: SupplierCode,
    pub email: String,
    pub subject: String,
    pub body: String,
}

impl ClaimLetter {
    pub fn mailto(&self) -> String {
        build_mailto(&self.email, &self.subject, &self.body)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClaimLetterBatch {
    pub letters: Vec<ClaimLetter>,
    // 没有邮箱而被跳过的供应商名称
    pub skipped_without_email: Vec<String>,
}

/// 索赔邮件主题: 单据数 + 组织名
pub fn claim_subject(claim: &SupplierClaim, ctx: &ReportContext) -> String {
    t_with_args(
        "claim.subject",
        &[
            ("count", &claim.documents.len().to_string()),
            ("org", &ctx.organization),
        ],
    )
}

/// 纯文本索赔正文
pub fn claim_body(claim: &SupplierClaim, ctx: &ReportContext) -> String {
    let mut body = String::new();

    let _ = writeln!(body, "{}\n", t("claim.greeting"));
    let _ = writeln!(body, "{}\n", t("claim.intro"));
    let _ = writeln!(body, "{}", t("claim.summary"));
    let _ = writeln!(
        body,
        "{}",
        t_with_args("claim.total_orders", &[("count", &claim.documents.len().to_string())])
    );
    let _ = writeln!(
        body,
        "{}",
        t_with_args("claim.lines", &[("count", &claim.line_count().to_string())])
    );
    let _ = writeln!(
        body,
        "{}",
        t_with_args("claim.pending_units", &[("count", &format!("{:.0}", claim.pending_units()))])
    );
    let _ = writeln!(
        body,
        "{}",
        t_with_args("claim.avg_delay", &[("days", &format!("{:.0}", claim.avg_days_overdue()))])
    );

    for document in &claim.documents {
        let _ = writeln!(body, "\n{}", SEPARATOR);
        let _ = writeln!(body, "{}", t_with_args("claim.order", &[("doc", &document.document_no)]));
        let _ = writeln!(
            body,
            "{}",
            t_with_args("claim.expected_date", &[("date", &format_date(document.expected_date))])
        );
        let _ = writeln!(
            body,
            "{}",
            t_with_args("claim.warehouse", &[("warehouse", &document.warehouse_code)])
        );
        let _ = writeln!(
            body,
            "{}",
            t_with_args("claim.delay", &[("days", &document.days_overdue.to_string())])
        );
        let _ = writeln!(body, "{}\n", SEPARATOR);

        for (idx, claim_line) in document.lines.iter().enumerate() {
            let order = &claim_line.line.order;
            let _ = writeln!(body, "  {}. {}", idx + 1, order.item_no);
            let _ = writeln!(body, "     {}", order.description);
            let _ = writeln!(
                body,
                "     {}\n",
                t_with_args("claim.item_pending", &[("qty", &format!("{:.0}", order.pending_qty))])
            );
        }

        let _ = writeln!(
            body,
            "{}",
            t_with_args(
                "claim.order_total",
                &[
                    ("qty", &format!("{:.0}", document.pending_units)),
                    ("lines", &document.line_count().to_string()),
                ],
            )
        );
    }

    let _ = writeln!(body, "\n{}", SEPARATOR);
    let _ = writeln!(body, "{}", t("claim.requests"));
    let _ = writeln!(body, "{}\n", SEPARATOR);
    let _ = writeln!(body, "{}", t("claim.request_1"));
    let _ = writeln!(body, "{}", t("claim.request_2"));
    let _ = writeln!(body, "{}\n", t("claim.request_3"));
    let _ = writeln!(body, "{}\n", t("claim.thanks"));
    let _ = writeln!(body, "{}", t("claim.sign_off"));
    let _ = writeln!(body, "{}", ctx.signature());
    body
}

/// 为每个供应商生成索赔函
///
/// 邮箱按供应商编码查找；缺失或空白的邮箱记入 skipped_without_email
pub fn build_claim_letters(
    claims: &[SupplierClaim],
    emails: &HashMap<SupplierCode, String>,
    ctx: &ReportContext,
) -> ClaimLetterBatch {
    let mut batch = ClaimLetterBatch::default();

    for claim in claims {
        let email = emails
            .get(&claim.supplier_code)
            .map(|e| e.trim())
            .filter(|e| !e.is_empty());

        match email {
            Some(email) => batch.letters.push(ClaimLetter {
                supplier_name: claim.supplier_name.clone(),
                supplier_code: claim.supplier_code,
                email: email.to_string(),
                subject: claim_subject(claim, ctx),
                body: claim_body(claim, ctx),
            }),
            None => {
                warn!(supplier = %claim.supplier_name, code = claim.supplier_code, "供应商没有邮箱，跳过索赔函");
                batch.skipped_without_email.push(claim.supplier_name.clone());
            }
        }
    }

    info!(
        letters = batch.letters.len(),
        skipped = batch.skipped_without_email.len(),
        "索赔函生成完成"
    );
    batch
}
