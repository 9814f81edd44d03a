// ==========================================
// 供应商 OTIF 监控 - 报告与索赔 API
// ==========================================
// 职责: 供应商报告、逾期清单、索赔函、CSV 导出
// 邮箱: 按供应商编码从花名册查找
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::claim::{ClaimFilter, ClaimLine, ClaimSummary, SupplierClaim};
use crate::domain::order::{ClassifiedLine, SupplierCode};
use crate::domain::types::DateRange;
use crate::engine::{filter_by_expected_date, AggregationEngine, ClaimsEngine};
use crate::report::{
    build_claim_letters, build_mailto, export_claims_to_path, export_metrics_to_path, ClaimLetterBatch,
    ReportContext, SupplierReport,
};
use crate::repository::SupplierRepository;

/// 单个供应商报告的全部产物
#[derive(Debug, Clone, Serialize)]
pub struct SupplierReportBundle {
    pub report: SupplierReport,
    pub subject: String,
    pub file_name: String,
    pub html: String,
    pub email_body: String,
    pub email: Option<String>,
    // 仅当花名册中有邮箱时生成
    pub mailto: Option<String>,
}

/// 逾期未交概览
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimsOverview {
    pub claims: Vec<ClaimLine>,
    pub summary: ClaimSummary,
    pub groups: Vec<SupplierClaim>,
}

// ==========================================
// ReportApi
// ==========================================
pub struct ReportApi {
    supplier_repo: Arc<SupplierRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ReportApi {
    pub fn new(supplier_repo: Arc<SupplierRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            supplier_repo,
            config_manager,
        }
    }

    pub fn context(&self, now: NaiveDateTime) -> ApiResult<ReportContext> {
        let settings = self
            .config_manager
            .load_settings()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(ReportContext::from_settings(&settings, now))
    }

    /// 生成单个供应商在窗口内的报告
    #[instrument(skip(self, classified), fields(lines = classified.len()))]
    pub fn supplier_report(
        &self,
        classified: &[ClassifiedLine],
        supplier_name: &str,
        window: DateRange,
        now: NaiveDateTime,
    ) -> ApiResult<SupplierReportBundle> {
        let ctx = self.context(now)?;
        let current = filter_by_expected_date(classified, window);
        let report = SupplierReport::build(supplier_name, &current, window);
        if report.is_empty() {
            return Err(ApiError::NotFound(format!(
                "供应商 {} 在 {} 内没有订单",
                supplier_name, window
            )));
        }

        let email = match current.iter().find(|l| l.supplier_name == supplier_name) {
            Some(line) => self.lookup_email(line.order.supplier_code)?,
            None => None,
        };
        let subject = report.subject(&ctx);
        let email_body = report.render_email_body(&ctx);
        let mailto = email
            .as_deref()
            .map(|to| build_mailto(to, &subject, &email_body));
        if mailto.is_none() {
            warn!(supplier = %supplier_name, "供应商没有邮箱，不生成 mailto 链接");
        }

        info!(
            supplier = %supplier_name,
            total_lines = report.total_lines,
            otif_pct = report.otif_pct,
            "供应商报告生成完成"
        );

        Ok(SupplierReportBundle {
            subject,
            file_name: report.file_name(&ctx),
            html: report.render_html(&ctx),
            email_body,
            email,
            mailto,
            report,
        })
    }

    /// 逾期未交清单 + 汇总 + 分组
    pub fn pending_claims(
        &self,
        classified: &[ClassifiedLine],
        filter: &ClaimFilter,
        today: NaiveDate,
    ) -> ClaimsOverview {
        let candidates = ClaimsEngine::select_overdue(classified, today);
        let claims = ClaimsEngine::apply_filter(&candidates, filter);
        ClaimsOverview {
            summary: ClaimsEngine::summarize(&claims),
            groups: ClaimsEngine::group_by_supplier(&claims),
            claims,
        }
    }

    /// 为筛选后的逾期清单生成索赔函
    #[instrument(skip(self, classified, filter))]
    pub fn claim_letters(
        &self,
        classified: &[ClassifiedLine],
        filter: &ClaimFilter,
        now: NaiveDateTime,
    ) -> ApiResult<ClaimLetterBatch> {
        let ctx = self.context(now)?;
        let overview = self.pending_claims(classified, filter, ctx.today);

        let mut emails: HashMap<SupplierCode, String> = HashMap::new();
        for group in &overview.groups {
            if let Some(email) = self.lookup_email(group.supplier_code)? {
                emails.insert(group.supplier_code, email);
            }
        }

        Ok(build_claim_letters(&overview.groups, &emails, &ctx))
    }

    /// 导出窗口内的供应商指标（按 %OTIF 降序）
    pub fn export_supplier_metrics(
        &self,
        classified: &[ClassifiedLine],
        window: DateRange,
        path: &Path,
    ) -> ApiResult<usize> {
        let current = filter_by_expected_date(classified, window);
        let mut metrics = AggregationEngine::supplier_metrics(&current);
        AggregationEngine::sort_by_otif_desc(&mut metrics);
        export_metrics_to_path(path, &metrics)?;
        Ok(metrics.len())
    }

    pub fn export_pending_claims(&self, claims: &[ClaimLine], path: &Path) -> ApiResult<usize> {
        export_claims_to_path(path, claims)?;
        Ok(claims.len())
    }

    fn lookup_email(&self, code: SupplierCode) -> ApiResult<Option<String>> {
        Ok(self
            .supplier_repo
            .find_by_code(code)?
            .and_then(|record| record.email)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use crate::domain::order::OrderLine;
    use crate::domain::supplier::SupplierRecord;
    use crate::engine::OtifClassifier;
    use crate::i18n::set_locale;
    use crate::i18n::tests::LOCALE_TEST_LOCK;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> NaiveDateTime {
        date(2024, 4, 10).and_hms_opt(9, 0, 0).unwrap()
    }

    fn order(doc: &str, code: i64, expected: NaiveDate, actual: Option<NaiveDate>, pending: f64) -> OrderLine {
        OrderLine {
            document_no: doc.to_string(),
            supplier_code: code,
            item_no: format!("ART-{}", doc),
            description: "Mesa".to_string(),
            warehouse_code: "ALM1".to_string(),
            expected_date: expected,
            actual_date: actual,
            order_date: expected,
            total_qty: 10.0,
            pending_qty: pending,
            unit_cost: 0.0,
            row_number: 1,
        }
    }

    fn setup() -> (ReportApi, Vec<ClassifiedLine>) {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let repo = Arc::new(SupplierRepository::from_connection(conn.clone()));

        let mut norte = SupplierRecord::new(1, "Muebles Norte S.L.");
        norte.alias = Some("Norte".to_string());
        norte.email = Some("pedidos@norte.test".to_string());
        repo.replace_all(&[norte, SupplierRecord::new(2, "Sur")]).unwrap();

        let orders = vec![
            order("PC-1", 1, date(2024, 3, 1), None, 5.0),
            order("PC-2", 1, date(2024, 3, 2), Some(date(2024, 3, 2)), 0.0),
            order("PC-3", 2, date(2024, 3, 20), None, 2.0),
            order("PC-4", 2, date(2024, 5, 1), None, 2.0),
        ];
        let classified = OtifClassifier::new().classify(&orders, repo.as_ref()).unwrap();

        let config = Arc::new(ConfigManager::from_connection(conn).unwrap());
        (ReportApi::new(repo, config), classified)
    }

    #[test]
    fn test_supplier_report_bundle_with_email() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");

        let (api, classified) = setup();
        let window = DateRange::new(date(2024, 3, 1), date(2024, 3, 31));
        let bundle = api.supplier_report(&classified, "Norte", window, now()).unwrap();

        assert_eq!(bundle.report.total_lines, 2);
        assert_eq!(bundle.subject, "OTIF Report - Norte - April 2024");
        assert_eq!(bundle.email.as_deref(), Some("pedidos@norte.test"));
        assert!(bundle.mailto.unwrap().starts_with("mailto:pedidos@norte.test?subject="));
        assert!(bundle.html.contains("<h2>Norte</h2>"));
    }

    #[test]
    fn test_supplier_report_unknown_supplier() {
        let (api, classified) = setup();
        let window = DateRange::new(date(2024, 3, 1), date(2024, 3, 31));
        let result = api.supplier_report(&classified, "Oeste", window, now());
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_pending_claims_excludes_future_expected_dates() {
        let (api, classified) = setup();
        let overview = api.pending_claims(&classified, &ClaimFilter::default(), date(2024, 4, 10));

        assert_eq!(overview.claims.len(), 2);
        assert_eq!(overview.claims[0].line.order.document_no, "PC-1");
        assert_eq!(overview.claims[0].days_overdue, 40);
        assert_eq!(overview.summary.supplier_count, 2);
        assert_eq!(overview.groups.len(), 2);
    }

    #[test]
    fn test_claim_letters_skip_supplier_without_email() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");

        let (api, classified) = setup();
        let batch = api.claim_letters(&classified, &ClaimFilter::default(), now()).unwrap();

        assert_eq!(batch.letters.len(), 1);
        assert_eq!(batch.letters[0].supplier_name, "Norte");
        assert_eq!(batch.letters[0].subject, "CLAIM - 1 Pending Orders - OTIF Monitor");
        assert_eq!(batch.skipped_without_email, vec!["Sur".to_string()]);
    }

    #[test]
    fn test_export_supplier_metrics() {
        let (api, classified) = setup();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");

        let window = DateRange::new(date(2024, 3, 1), date(2024, 3, 31));
        let rows = api.export_supplier_metrics(&classified, window, &path).unwrap();
        assert_eq!(rows, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("supplier_name,otif_count"));
        assert!(content.contains("Norte,1,2,"));
    }
}
