// ==========================================
// 供应商 OTIF 监控 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新、快照
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigManager, OtifSettings};
use crate::i18n;

/// 配置项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub key: String,
    pub value: String,
}

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    pub fn settings(&self) -> ApiResult<OtifSettings> {
        self.config_manager
            .load_settings()
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    /// 所有配置键的生效值（未覆写的显示默认值）
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigItem>> {
        let snapshot = self.get_config_snapshot()?;
        let values: std::collections::BTreeMap<String, String> =
            serde_json::from_str(&snapshot).map_err(|e| ApiError::InternalError(e.to_string()))?;

        Ok(values
            .into_iter()
            .map(|(key, value)| ConfigItem { key, value })
            .collect())
    }

    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        self.config_manager
            .get_config_snapshot()
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    /// 更新单个配置；语言变更立即生效
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        if !config_keys::ALL.contains(&key) {
            return Err(ApiError::InvalidInput(format!(
                "未知配置键: {}（可选: {}）",
                key,
                config_keys::ALL.join(", ")
            )));
        }

        self.config_manager
            .set_value(key, value)
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        if key == config_keys::LOCALE {
            i18n::set_locale(value.trim());
        }

        info!(key = %key, "配置更新完成");
        Ok(())
    }
}
