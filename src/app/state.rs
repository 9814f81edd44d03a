// ==========================================
// 供应商 OTIF 监控 - 应用状态
// ==========================================
// 职责: 管理共享数据库连接和各 API 实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{ConfigApi, DashboardApi, ReportApi, SupplierApi};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::i18n;
use crate::repository::SupplierRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "OTIF_MONITOR_DB_PATH";

/// 应用状态
///
/// 所有 API 共享同一个 SQLite 连接
pub struct AppState {
    pub db_path: String,
    pub supplier_api: Arc<SupplierApi>,
    pub dashboard_api: Arc<DashboardApi>,
    pub report_api: Arc<ReportApi>,
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 打开数据库、建表并装配 API
    ///
    /// 配置中的语言会立即生效
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let supplier_repo = Arc::new(SupplierRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| format!("配置管理器初始化失败: {}", e))?,
        );

        let settings = config_manager
            .load_settings()
            .map_err(|e| format!("配置读取失败: {}", e))?;
        i18n::set_locale(&settings.locale);

        let supplier_api = Arc::new(SupplierApi::new(supplier_repo.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(supplier_repo.clone(), config_manager.clone()));
        let report_api = Arc::new(ReportApi::new(supplier_repo, config_manager.clone()));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!(locale = %settings.locale, "AppState初始化完成");

        Ok(Self {
            db_path,
            supplier_api,
            dashboard_api,
            report_api,
            config_api,
        })
    }

    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径
// ==========================================

/// 获取默认数据库路径
///
/// 顺序: 环境变量 OTIF_MONITOR_DB_PATH → 用户数据目录/otif-monitor/otif_monitor.db → ./otif_monitor.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./otif_monitor.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("otif-monitor");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("otif_monitor.db");
        }
    }

    path.to_string_lossy().to_string()
}
