// ==========================================
// 供应商 OTIF 监控 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 分类规则必须输出 reason
// ==========================================

pub mod aggregator;
pub mod claims;
pub mod classifier;
pub mod period;

// 重导出核心引擎
pub use aggregator::{percentage, round2, AggregationEngine, DEFAULT_TOP_N_SUPPLIERS};
pub use claims::ClaimsEngine;
pub use classifier::{ClassifyError, ClassifyResult, OtifClassifier, DEFAULT_GRACE_DAYS};
pub use period::{
    compare_with_previous_month, data_bounds, filter_by_expected_date, previous_month_window,
    PeriodPreset,
};
