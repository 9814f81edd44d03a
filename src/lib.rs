// ==========================================
// 供应商 OTIF 监控 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 供应商交付合规分类、聚合、报告与索赔
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 花名册
pub mod repository;

// 引擎层 - 分类 / 聚合 / 时间窗口 / 索赔
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 报告层 - HTML / 邮件 / 索赔函 / CSV
pub mod report;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DateRange, OtifStatus, ReportGrade, Trend};

// 领域实体
pub use domain::{ClassifiedLine, OrderLine, SupplierCode, SupplierMetrics, SupplierRecord};

// 引擎
pub use engine::{AggregationEngine, ClaimsEngine, OtifClassifier, PeriodPreset};

// API
pub use api::{ConfigApi, DashboardApi, ReportApi, SupplierApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "OTIF Monitor";
