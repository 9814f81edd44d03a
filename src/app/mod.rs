// ==========================================
// 供应商 OTIF 监控 - 应用层
// ==========================================
// 职责: 数据库路径解析与 API 装配
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
