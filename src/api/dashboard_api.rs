// ==========================================
// 供应商 OTIF 监控 - 看板 API
// ==========================================
// 职责: 订单导入 → 分类（带缓存）→ 窗口筛选 → 聚合
// 缓存键: (输入指纹, 花名册版本, 宽限天数)
// ==========================================

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::metrics::{
    MonthlyEvolutionPoint, OtifSummary, PeriodComparison, StatusCount, SupplierMetrics,
    SupplierMonthlyPoint,
};
use crate::domain::order::{ClassifiedLine, OrderLine};
use crate::domain::types::DateRange;
use crate::engine::{
    compare_with_previous_month, data_bounds, filter_by_expected_date, AggregationEngine,
    OtifClassifier, PeriodPreset,
};
use crate::importer::{OrderImporter, OrderImporterImpl};
use crate::repository::{SupplierDirectory, SupplierRepository};

/// 看板数据（按窗口即时计算）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub range: DateRange,
    pub summary: OtifSummary,
    pub comparison: Option<PeriodComparison>,
    // 按 %OTIF 降序
    pub supplier_metrics: Vec<SupplierMetrics>,
    pub monthly_evolution: Vec<MonthlyEvolutionPoint>,
    pub supplier_evolution: Vec<SupplierMonthlyPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PassKey {
    fingerprint: u64,
    roster_revision: i64,
    grace_days: i64,
}

struct CachedPass {
    key: PassKey,
    lines: Arc<Vec<ClassifiedLine>>,
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi {
    supplier_repo: Arc<SupplierRepository>,
    config_manager: Arc<ConfigManager>,
    importer: OrderImporterImpl,
    last_pass: Mutex<Option<CachedPass>>,
}

impl DashboardApi {
    pub fn new(supplier_repo: Arc<SupplierRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            supplier_repo,
            config_manager,
            importer: OrderImporterImpl::default(),
            last_pass: Mutex::new(None),
        }
    }

    /// 导入一个或多个订单文件（并发解析，按参数顺序拼接）
    ///
    /// 任一文件失败则整体失败
    pub async fn load_orders(&self, file_paths: Vec<PathBuf>) -> ApiResult<Vec<OrderLine>> {
        if file_paths.is_empty() {
            return Err(ApiError::InvalidInput("未指定订单文件".to_string()));
        }

        if file_paths.len() == 1 {
            let batch = self.importer.import_file(&file_paths[0]).await?;
            return Ok(batch.lines);
        }

        let results = self.importer.batch_import(file_paths).await;
        let mut lines = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(batch) => lines.extend(batch.lines),
                Err(msg) => failures.push(msg),
            }
        }

        if !failures.is_empty() {
            return Err(ApiError::ImportError(failures.join("; ")));
        }
        Ok(lines)
    }

    /// 分类；输入、花名册版本与宽限天数都未变化时复用上一次结果
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn classify(&self, lines: &[OrderLine]) -> ApiResult<Arc<Vec<ClassifiedLine>>> {
        let settings = self
            .config_manager
            .load_settings()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let key = PassKey {
            fingerprint: fingerprint(lines)?,
            roster_revision: self.supplier_repo.revision()?,
            grace_days: settings.grace_days,
        };

        let mut cache = self
            .last_pass
            .lock()
            .map_err(|e| ApiError::InternalError(format!("缓存锁获取失败: {}", e)))?;

        if let Some(cached) = cache.as_ref() {
            if cached.key == key {
                debug!("命中分类缓存");
                return Ok(Arc::clone(&cached.lines));
            }
        }

        let classifier = OtifClassifier::with_grace_days(settings.grace_days)?;
        let classified = Arc::new(classifier.classify(lines, self.supplier_repo.as_ref())?);

        info!(
            lines = classified.len(),
            roster_revision = key.roster_revision,
            grace_days = key.grace_days,
            "分类完成并写入缓存"
        );
        *cache = Some(CachedPass {
            key,
            lines: Arc::clone(&classified),
        });
        Ok(classified)
    }

    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.last_pass.lock() {
            *cache = None;
        }
    }

    /// 快捷时间段 → 具体窗口（收敛到数据的日期范围）
    pub fn resolve_period(
        &self,
        classified: &[ClassifiedLine],
        preset: PeriodPreset,
        today: NaiveDate,
    ) -> ApiResult<DateRange> {
        let bounds = data_bounds(classified)
            .ok_or_else(|| ApiError::InvalidInput("没有订单数据".to_string()))?;
        let range = preset.resolve(today, bounds);
        if range.is_empty() {
            return Err(ApiError::InvalidInput(format!(
                "时间段 {} 与数据范围 {} 没有交集",
                preset, bounds
            )));
        }
        Ok(range)
    }

    /// 计算看板全部数据
    #[instrument(skip(self, classified), fields(lines = classified.len()))]
    pub fn dashboard(
        &self,
        classified: &[ClassifiedLine],
        preset: PeriodPreset,
        today: NaiveDate,
    ) -> ApiResult<DashboardView> {
        let settings = self
            .config_manager
            .load_settings()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let range = self.resolve_period(classified, preset, today)?;
        let current = filter_by_expected_date(classified, range);

        let summary = AggregationEngine::summary(&current);
        let comparison = compare_with_previous_month(classified, range.from, &current);
        let mut supplier_metrics = AggregationEngine::supplier_metrics(&current);
        AggregationEngine::sort_by_otif_desc(&mut supplier_metrics);

        info!(
            range = %range,
            lines = summary.total_lines,
            otif_pct = summary.otif_pct,
            "看板数据计算完成"
        );

        Ok(DashboardView {
            range,
            summary,
            comparison,
            supplier_metrics,
            monthly_evolution: AggregationEngine::monthly_evolution(&current),
            supplier_evolution: AggregationEngine::supplier_monthly_evolution(
                &current,
                settings.top_n_suppliers,
            ),
        })
    }

    /// 单个供应商在窗口内的状态分布
    pub fn status_breakdown(
        &self,
        classified: &[ClassifiedLine],
        range: DateRange,
        supplier_name: &str,
    ) -> Vec<StatusCount> {
        let current = filter_by_expected_date(classified, range);
        AggregationEngine::status_breakdown(&current, supplier_name)
    }
}

/// 输入指纹（序列化后哈希）
fn fingerprint(lines: &[OrderLine]) -> ApiResult<u64> {
    let bytes = serde_json::to_vec(lines).map_err(|e| ApiError::InternalError(e.to_string()))?;
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    Ok(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_keys;
    use crate::db::ensure_schema;
    use crate::domain::supplier::SupplierRecord;
    use crate::domain::types::OtifStatus;
    use rusqlite::Connection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_api() -> (DashboardApi, Arc<SupplierRepository>, Arc<ConfigManager>) {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        let repo = Arc::new(SupplierRepository::from_connection(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn).unwrap());
        (DashboardApi::new(repo.clone(), config.clone()), repo, config)
    }

    fn order(doc: &str, code: i64, expected: NaiveDate, actual: Option<NaiveDate>, pending: f64) -> OrderLine {
        OrderLine {
            document_no: doc.to_string(),
            supplier_code: code,
            item_no: "ART".to_string(),
            description: String::new(),
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

    fn sample_orders() -> Vec<OrderLine> {
        vec![
            order("PC-1", 1, date(2024, 2, 10), Some(date(2024, 2, 10)), 0.0),
            order("PC-2", 1, date(2024, 3, 5), Some(date(2024, 3, 6)), 0.0),
            order("PC-3", 1, date(2024, 3, 8), None, 4.0),
            order("PC-4", 2, date(2024, 3, 9), Some(date(2024, 3, 20)), 0.0),
        ]
    }

    #[test]
    fn test_classify_uses_cache_until_roster_changes() {
        let (api, repo, _) = setup_api();
        let orders = sample_orders();

        let first = api.classify(&orders).unwrap();
        let second = api.classify(&orders).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first[0].supplier_name, "Supplier 1");

        repo.replace_all(&[SupplierRecord::new(1, "Norte")]).unwrap();
        let third = api.classify(&orders).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third[0].supplier_name, "Norte");
        assert_eq!(third[3].supplier_name, "Supplier 2");
    }

    #[test]
    fn test_classify_respects_grace_days_setting() {
        let (api, _, config) = setup_api();
        let orders = sample_orders();

        assert_eq!(api.classify(&orders).unwrap()[1].status, OtifStatus::GraceException);

        config.set_value(config_keys::GRACE_DAYS, "0").unwrap();
        assert_eq!(api.classify(&orders).unwrap()[1].status, OtifStatus::Late);
    }

    #[test]
    fn test_dashboard_current_month_with_comparison() {
        let (api, _, _) = setup_api();
        let classified = api.classify(&sample_orders()).unwrap();

        let view = api
            .dashboard(&classified, PeriodPreset::CurrentMonth, date(2024, 3, 31))
            .unwrap();

        // 窗口终点收敛到数据最大日期
        assert_eq!(view.range, DateRange::new(date(2024, 3, 1), date(2024, 3, 9)));
        assert_eq!(view.summary.total_lines, 3);
        assert_eq!(view.summary.otif_lines, 1);
        assert_eq!(view.supplier_metrics.len(), 2);
        assert_eq!(view.supplier_metrics[0].supplier_name, "Supplier 1");

        let comparison = view.comparison.unwrap();
        assert_eq!(comparison.previous_lines, 1);
        assert_eq!(comparison.previous_otif_pct, 100.0);
        assert_eq!(comparison.current_otif_pct, 33.33);
        assert_eq!(comparison.delta, -66.67);
    }

    #[test]
    fn test_dashboard_without_data_fails() {
        let (api, _, _) = setup_api();
        let result = api.dashboard(&[], PeriodPreset::WholePeriod, date(2024, 3, 31));
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_status_breakdown() {
        let (api, _, _) = setup_api();
        let classified = api.classify(&sample_orders()).unwrap();
        let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31));

        let breakdown = api.status_breakdown(&classified, range, "Supplier 1");
        let total: usize = breakdown.iter().map(|s| s.count).sum();
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_load_orders_requires_files() {
        let (api, _, _) = setup_api();
        assert!(matches!(api.load_orders(vec![]).await, Err(ApiError::InvalidInput(_))));
    }
}
