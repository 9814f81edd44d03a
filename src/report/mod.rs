// ==========================================
// 供应商 OTIF 监控 - 报告层
// ==========================================
// 职责: 供应商报告 (HTML + 邮件正文)、索赔函、mailto 链接、CSV 导出
// ==========================================

pub mod claim_letter;
pub mod context;
pub mod error;
pub mod export;
pub mod html;
pub mod mailto;
pub mod supplier_report;

pub use claim_letter::{build_claim_letters, claim_body, claim_subject, ClaimLetter, ClaimLetterBatch};
pub use context::ReportContext;
pub use error::{ExportError, ExportResult};
pub use export::{
    default_claims_file_name, default_metrics_file_name, export_claims_to_path, export_metrics_to_path,
    write_claims_csv, write_metrics_csv,
};
pub use html::{html_escape, truncate_chars};
pub use mailto::{build_mailto, percent_encode};
pub use supplier_report::SupplierReport;
