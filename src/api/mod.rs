// ==========================================
// 供应商 OTIF 监控 - API 层
// ==========================================
// 职责: 组合导入 / 引擎 / 仓储 / 报告,供 CLI 调用
// ==========================================

pub mod config_api;
pub mod dashboard_api;
pub mod error;
pub mod report_api;
pub mod supplier_api;

// 重导出核心类型
pub use config_api::{ConfigApi, ConfigItem};
pub use dashboard_api::{DashboardApi, DashboardView};
pub use error::{ApiError, ApiResult};
pub use report_api::{ClaimsOverview, ReportApi, SupplierReportBundle};
pub use supplier_api::{RosterLoadResult, SupplierApi};
