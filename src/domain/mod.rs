// ==========================================
// 供应商 OTIF 监控 - 领域模型层
// ==========================================
// 职责: 定义订单行、供应商、指标、索赔等实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod claim;
pub mod metrics;
pub mod order;
pub mod supplier;
pub mod types;

// 重导出核心类型
pub use claim::{ClaimDocument, ClaimFilter, ClaimLine, ClaimSummary, SupplierClaim};
pub use metrics::{
    MonthlyEvolutionPoint, OtifSummary, PeriodComparison, StatusCount, SupplierMetrics,
    SupplierMonthlyPoint,
};
pub use order::{ClassifiedLine, OrderBatch, OrderLine, SupplierCode};
pub use supplier::{placeholder_name, SupplierRecord};
pub use types::{DateRange, OtifStatus, ReportGrade, Trend};
