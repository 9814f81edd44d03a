// ==========================================
// 供应商 OTIF 监控 - 供应商花名册 API
// ==========================================
// 职责: 花名册整表加载、查询、邮箱查找
// ==========================================

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::order::SupplierCode;
use crate::domain::supplier::SupplierRecord;
use crate::importer::SupplierImporter;
use crate::repository::SupplierRepository;

/// 花名册加载结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterLoadResult {
    pub supplier_count: usize,
    pub revision: i64,
    pub with_email: usize,
}

// ==========================================
// SupplierApi
// ==========================================
pub struct SupplierApi {
    supplier_repo: Arc<SupplierRepository>,
    importer: SupplierImporter,
}

impl SupplierApi {
    pub fn new(supplier_repo: Arc<SupplierRepository>) -> Self {
        Self {
            supplier_repo,
            importer: SupplierImporter::default(),
        }
    }

    /// 从表格整表替换花名册
    ///
    /// 解析失败或编码重复时旧花名册保持不变
    #[instrument(skip(self, file_path))]
    pub fn load_roster(&self, file_path: &Path) -> ApiResult<RosterLoadResult> {
        if !file_path.exists() {
            return Err(ApiError::NotFound(format!("文件不存在: {}", file_path.display())));
        }

        let records = self.importer.import_roster(file_path)?;
        if records.is_empty() {
            return Err(ApiError::InvalidInput("花名册为空".to_string()));
        }

        let revision = self.supplier_repo.replace_all(&records)?;
        let result = RosterLoadResult {
            supplier_count: records.len(),
            revision,
            with_email: records.iter().filter(|r| r.has_email()).count(),
        };

        info!(
            suppliers = result.supplier_count,
            revision = result.revision,
            with_email = result.with_email,
            "花名册加载完成"
        );
        Ok(result)
    }

    pub fn list_suppliers(&self) -> ApiResult<Vec<SupplierRecord>> {
        Ok(self.supplier_repo.list_all()?)
    }

    pub fn get_supplier(&self, code: SupplierCode) -> ApiResult<SupplierRecord> {
        self.supplier_repo
            .find_by_code(code)?
            .ok_or_else(|| ApiError::NotFound(format!("供应商(code={})不存在", code)))
    }

    pub fn roster_revision(&self) -> ApiResult<i64> {
        Ok(self.supplier_repo.roster_revision()?)
    }

    /// 按编码查邮箱（无邮箱的编码不出现在结果中）
    pub fn email_directory(&self, codes: &BTreeSet<SupplierCode>) -> ApiResult<HashMap<SupplierCode, String>> {
        let mut emails = HashMap::new();
        for code in codes {
            if let Some(record) = self.supplier_repo.find_by_code(*code)? {
                if let Some(email) = record.email.filter(|e| !e.trim().is_empty()) {
                    emails.insert(*code, email.trim().to_string());
                }
            }
        }
        Ok(emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use rusqlite::Connection;
    use std::io::Write;
    use std::sync::Mutex;

    fn setup_api() -> SupplierApi {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let repo = SupplierRepository::from_connection(Arc::new(Mutex::new(conn)));
        SupplierApi::new(Arc::new(repo))
    }

    fn roster_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_roster_and_lookup_emails() {
        let api = setup_api();
        let file = roster_file(
            "Nº,Nombre,Alias,Correo electrónico\n\
             1001,Muebles Norte S.L.,Norte,pedidos@norte.test\n\
             1002,Textil Sur S.A.,,\n",
        );

        let result = api.load_roster(file.path()).unwrap();
        assert_eq!(result.supplier_count, 2);
        assert_eq!(result.revision, 1);
        assert_eq!(result.with_email, 1);

        let codes: BTreeSet<SupplierCode> = [1001, 1002, 9999].into_iter().collect();
        let emails = api.email_directory(&codes).unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[&1001], "pedidos@norte.test");

        assert_eq!(api.get_supplier(1001).unwrap().display_name(), "Norte");
        assert!(matches!(api.get_supplier(9999), Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_load_roster_missing_file() {
        let api = setup_api();
        let result = api.load_roster(Path::new("/nonexistent/roster.csv"));
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_load_roster_missing_columns_keeps_previous() {
        let api = setup_api();
        let good = roster_file("Nº,Nombre\n1,Uno\n");
        api.load_roster(good.path()).unwrap();

        let bad = roster_file("Código,Nombre\n2,Dos\n");
        assert!(matches!(api.load_roster(bad.path()), Err(ApiError::ValidationError(_))));

        let suppliers = api.list_suppliers().unwrap();
        assert_eq!(suppliers.len(), 1);
        assert_eq!(api.roster_revision().unwrap(), 1);
    }
}
