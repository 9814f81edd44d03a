// ==========================================
// 供应商 OTIF 监控 - 供应商目录接口
// ==========================================
// 分类引擎只依赖此 Trait：一次批量解析编码 → 展示名
// 实现者: SupplierRepository (SQLite) / StaticSupplierDirectory (内存快照)
// ==========================================

use crate::domain::order::SupplierCode;
use crate::domain::supplier::SupplierRecord;
use crate::repository::error::RepositoryResult;
use std::collections::HashMap;

pub trait SupplierDirectory: Send + Sync {
    /// 批量解析编码 → 展示名（别名优先）
    ///
    /// 查不到的编码不出现在结果中，由调用方填充占位名
    fn resolve(&self, codes: &[SupplierCode]) -> RepositoryResult<HashMap<SupplierCode, String>>;

    /// 花名册版本号（每次整表替换 +1；从未加载为 0）
    fn revision(&self) -> RepositoryResult<i64>;
}

// ==========================================
// StaticSupplierDirectory - 内存快照
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StaticSupplierDirectory {
    names: HashMap<SupplierCode, String>,
    revision: i64,
}

impl StaticSupplierDirectory {
    pub fn new(records: &[SupplierRecord]) -> Self {
        let names = records
            .iter()
            .map(|r| (r.code, r.display_name()))
            .collect();
        Self { names, revision: 1 }
    }

    /// 空目录（所有编码均使用占位名）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl SupplierDirectory for StaticSupplierDirectory {
    fn resolve(&self, codes: &[SupplierCode]) -> RepositoryResult<HashMap<SupplierCode, String>> {
        Ok(codes
            .iter()
            .filter_map(|code| self.names.get(code).map(|name| (*code, name.clone())))
            .collect())
    }

    fn revision(&self) -> RepositoryResult<i64> {
        Ok(self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_directory_resolves_known_codes_only() {
        let mut acme = SupplierRecord::new(1, "Acme S.A.");
        acme.alias = Some("ACME".to_string());
        let dir = StaticSupplierDirectory::new(&[acme, SupplierRecord::new(2, "Beta S.L.")]);

        let resolved = dir.resolve(&[1, 2, 3]).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved.get(&1).map(String::as_str), Some("ACME"));
        assert_eq!(resolved.get(&2).map(String::as_str), Some("Beta S.L."));
        assert!(!resolved.contains_key(&3));
    }

    #[test]
    fn test_empty_directory_revision_zero() {
        let dir = StaticSupplierDirectory::empty();
        assert!(dir.is_empty());
        assert_eq!(dir.revision().unwrap(), 0);
    }
}
