// ==========================================
// 供应商 OTIF 监控 - 供应商花名册仓储
// ==========================================
// 表: supplier / supplier_roster_revision
// 红线: Repository 不含业务逻辑
// 约束: 花名册整表替换在单个事务内完成，
//       其他连接不会读到空目录
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::order::SupplierCode;
use crate::domain::supplier::SupplierRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::supplier_directory::SupplierDirectory;
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

// IN (...) 单次绑定参数上限
const RESOLVE_CHUNK_SIZE: usize = 500;

const SELECT_COLUMNS: &str = "code, name, alias, supplier_type, buyer, cost_center, warehouse, email, updated_at";

// ==========================================
// SupplierRepository - 供应商仓储
// ==========================================
pub struct SupplierRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SupplierRepository {
    /// 创建新的 SupplierRepository 实例（自动建表）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 整表替换花名册
    ///
    /// # 返回
    /// - Ok(i64): 替换后的花名册版本号
    /// - Err: 任一行写入失败（如编码重复）时整体回滚，旧花名册保持不变
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn replace_all(&self, records: &[SupplierRecord]) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM supplier", [])?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO supplier (
                    code, name, alias, supplier_type, buyer,
                    cost_center, warehouse, email, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'))
                "#,
            )?;

            for record in records {
                stmt.execute(params![
                    record.code,
                    record.name,
                    record.alias,
                    record.supplier_type,
                    record.buyer,
                    record.cost_center,
                    record.warehouse,
                    record.email,
                ])?;
            }
        }

        let loaded_at = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
        tx.execute(
            r#"
            INSERT INTO supplier_roster_revision (id, revision, loaded_at)
            VALUES (1, 1, ?1)
            ON CONFLICT(id) DO UPDATE SET revision = revision + 1, loaded_at = excluded.loaded_at
            "#,
            params![loaded_at],
        )?;
        let revision: i64 = tx.query_row(
            "SELECT revision FROM supplier_roster_revision WHERE id = 1",
            [],
            |row| row.get(0),
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(count = records.len(), revision, "供应商花名册已替换");
        Ok(revision)
    }

    /// 查询全部供应商（按编码排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<SupplierRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM supplier ORDER BY code", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let records = stmt
            .query_map([], map_supplier_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 按编码查询
    pub fn find_by_code(&self, code: SupplierCode) -> RepositoryResult<Option<SupplierRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM supplier WHERE code = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![code], map_supplier_row)
            .optional()?;
        Ok(record)
    }

    /// 按展示名查询（别名优先，与分类结果中的 supplier_name 一致）
    pub fn find_by_display_name(&self, display_name: &str) -> RepositoryResult<Option<SupplierRecord>> {
        let wanted = display_name.trim();
        Ok(self
            .list_all()?
            .into_iter()
            .find(|r| r.display_name() == wanted))
    }

    /// 供应商数量
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM supplier", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// 当前花名册版本号（从未加载为 0）
    pub fn roster_revision(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let revision: Option<i64> = conn
            .query_row(
                "SELECT revision FROM supplier_roster_revision WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(revision.unwrap_or(0))
    }
}

impl SupplierDirectory for SupplierRepository {
    fn resolve(&self, codes: &[SupplierCode]) -> RepositoryResult<HashMap<SupplierCode, String>> {
        let mut unique: Vec<SupplierCode> = codes.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let conn = self.get_conn()?;
        let mut resolved = HashMap::with_capacity(unique.len());

        for chunk in unique.chunks(RESOLVE_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "SELECT {} FROM supplier WHERE code IN ({})",
                SELECT_COLUMNS, placeholders
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), map_supplier_row)?
                .collect::<SqliteResult<Vec<_>>>()?;

            for record in rows {
                resolved.insert(record.code, record.display_name());
            }
        }

        debug!(requested = unique.len(), resolved = resolved.len(), "供应商编码批量解析");
        Ok(resolved)
    }

    fn revision(&self) -> RepositoryResult<i64> {
        self.roster_revision()
    }
}

fn map_supplier_row(row: &rusqlite::Row<'_>) -> SqliteResult<SupplierRecord> {
    Ok(SupplierRecord {
        code: row.get(0)?,
        name: row.get(1)?,
        alias: row.get(2)?,
        supplier_type: row.get(3)?,
        buyer: row.get(4)?,
        cost_center: row.get(5)?,
        warehouse: row.get(6)?,
        email: row.get(7)?,
        updated_at: row
            .get::<_, Option<String>>(8)?
            .and_then(|s| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").ok()),
    })
}
