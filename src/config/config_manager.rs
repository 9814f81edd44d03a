// ==========================================
// 供应商 OTIF 监控 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope，当前仅 global)
// ==========================================

use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::engine::aggregator::DEFAULT_TOP_N_SUPPLIERS;
use crate::engine::classifier::DEFAULT_GRACE_DAYS;
use crate::i18n::SUPPORTED_LOCALES;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 报告中默认最多列出的明细行数
pub const DEFAULT_MAX_LISTED_LINES: usize = 10;

// ==========================================
// OtifSettings - 类型化配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtifSettings {
    pub grace_days: i64,
    pub top_n_suppliers: usize,
    pub max_listed_lines: usize,
    pub organization: String,
    pub department: String,
    pub locale: String,
}

impl Default for OtifSettings {
    fn default() -> Self {
        Self {
            grace_days: DEFAULT_GRACE_DAYS,
            top_n_suppliers: DEFAULT_TOP_N_SUPPLIERS,
            max_listed_lines: DEFAULT_MAX_LISTED_LINES,
            organization: "OTIF Monitor".to_string(),
            department: "Planning Department".to_string(),
            locale: "en".to_string(),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（先校验键与值）
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        validate_config_value(key, value)?;

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value.trim()],
        )?;

        info!(key = %key, value = %value.trim(), "配置已更新");
        Ok(())
    }

    /// 读取类型化配置（缺失或格式错误的项回退默认值）
    pub fn load_settings(&self) -> Result<OtifSettings, Box<dyn Error>> {
        let defaults = OtifSettings::default();

        Ok(OtifSettings {
            grace_days: self.parsed_or(config_keys::GRACE_DAYS, defaults.grace_days)?,
            top_n_suppliers: self.parsed_or(config_keys::TOP_N_SUPPLIERS, defaults.top_n_suppliers)?,
            max_listed_lines: self.parsed_or(config_keys::MAX_LISTED_LINES, defaults.max_listed_lines)?,
            organization: self
                .get_global_config_value(config_keys::ORGANIZATION)?
                .unwrap_or(defaults.organization),
            department: self
                .get_global_config_value(config_keys::DEPARTMENT)?
                .unwrap_or(defaults.department),
            locale: self
                .get_global_config_value(config_keys::LOCALE)?
                .unwrap_or(defaults.locale),
        })
    }

    fn parsed_or<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>> {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key = %key, value = %raw, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// 已存储的值覆盖默认值；键按字母序
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let settings = self.load_settings()?;
        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        config_map.insert(config_keys::GRACE_DAYS.to_string(), settings.grace_days.to_string());
        config_map.insert(config_keys::TOP_N_SUPPLIERS.to_string(), settings.top_n_suppliers.to_string());
        config_map.insert(config_keys::MAX_LISTED_LINES.to_string(), settings.max_listed_lines.to_string());
        config_map.insert(config_keys::ORGANIZATION.to_string(), settings.organization);
        config_map.insert(config_keys::DEPARTMENT.to_string(), settings.department);
        config_map.insert(config_keys::LOCALE.to_string(), settings.locale);

        let json_value = json!(config_map);
        Ok(serde_json::to_string_pretty(&json_value)?)
    }
}

/// 校验配置键与值
fn validate_config_value(key: &str, value: &str) -> Result<(), String> {
    let value = value.trim();
    match key {
        config_keys::GRACE_DAYS => match value.parse::<i64>() {
            Ok(v) if v >= 0 => Ok(()),
            _ => Err(format!("{} 必须为非负整数: {}", key, value)),
        },
        config_keys::TOP_N_SUPPLIERS | config_keys::MAX_LISTED_LINES => match value.parse::<usize>() {
            Ok(v) if v > 0 => Ok(()),
            _ => Err(format!("{} 必须为正整数: {}", key, value)),
        },
        config_keys::ORGANIZATION | config_keys::DEPARTMENT => {
            if value.is_empty() {
                Err(format!("{} 不能为空", key))
            } else {
                Ok(())
            }
        }
        config_keys::LOCALE => {
            if SUPPORTED_LOCALES.contains(&value) {
                Ok(())
            } else {
                Err(format!("不支持的语言: {}（可选: {}）", value, SUPPORTED_LOCALES.join(", ")))
            }
        }
        _ => Err(format!("未知配置键: {}", key)),
    }
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 分类
    pub const GRACE_DAYS: &str = "otif.grace_days";

    // 聚合
    pub const TOP_N_SUPPLIERS: &str = "otif.top_n_suppliers";

    // 报告
    pub const MAX_LISTED_LINES: &str = "report.max_listed_lines";
    pub const ORGANIZATION: &str = "report.organization";
    pub const DEPARTMENT: &str = "report.department";

    // 界面
    pub const LOCALE: &str = "app.locale";

    pub const ALL: [&str; 6] = [
        GRACE_DAYS,
        TOP_N_SUPPLIERS,
        MAX_LISTED_LINES,
        ORGANIZATION,
        DEPARTMENT,
        LOCALE,
    ];
}
