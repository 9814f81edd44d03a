// ==========================================
// 供应商 OTIF 监控 - 订单 / 花名册导入器实现
// ==========================================
// 流程: 解析 → 必需列检查 → 逐行映射（任一行失败则整体失败）
// ==========================================

use crate::domain::order::{OrderBatch, OrderLine};
use crate::domain::supplier::SupplierRecord;
use crate::importer::columns::check_required_columns;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{OrderFieldMapper, SupplierFieldMapper};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FileParser, OrderImporter, RowMapper};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// 解析文件并映射为领域对象
///
/// 必需列缺失时在映射任何行之前返回 MissingColumns
pub fn load_sheet<T, M>(parser: &dyn FileParser, mapper: &M, file_path: &Path) -> ImportResult<Vec<T>>
where
    M: RowMapper<T> + ?Sized,
{
    debug!("步骤 1: 解析文件");
    let sheet = parser.parse_to_raw_sheet(file_path)?;

    debug!("步骤 2: 必需列检查");
    check_required_columns(&sheet.headers, mapper.required_columns())?;

    debug!(rows = sheet.len(), "步骤 3: 字段映射");
    sheet
        .records
        .iter()
        .enumerate()
        .map(|(idx, row)| mapper.map_row(row, idx + 1))
        .collect()
}

// ==========================================
// OrderImporterImpl - 订单明细导入器
// ==========================================
pub struct OrderImporterImpl {
    file_parser: Box<dyn FileParser>,
    field_mapper: OrderFieldMapper,
}

impl Default for OrderImporterImpl {
    fn default() -> Self {
        Self::new(Box::new(UniversalFileParser))
    }
}

impl OrderImporterImpl {
    pub fn new(file_parser: Box<dyn FileParser>) -> Self {
        Self {
            file_parser,
            field_mapper: OrderFieldMapper,
        }
    }

    /// 同步导入（CLI 与 API 直接复用）
    #[instrument(skip(self, file_path), fields(batch_id))]
    pub fn import_file_blocking(&self, file_path: &Path) -> ImportResult<OrderBatch> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(batch_id = %batch_id, file_path = %file_path.display(), "开始导入订单明细");

        let lines: Vec<OrderLine> =
            load_sheet(self.file_parser.as_ref(), &self.field_mapper, file_path).map_err(|e| {
                error!(error = %e, "订单明细导入失败");
                e
            })?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(batch_id = %batch_id, rows = lines.len(), elapsed_ms, "订单明细导入完成");

        Ok(OrderBatch {
            batch_id,
            file_name: file_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            lines,
            elapsed_ms,
        })
    }
}

#[async_trait::async_trait]
impl OrderImporter for OrderImporterImpl {
    async fn import_file(&self, file_path: &Path) -> ImportResult<OrderBatch> {
        self.import_file_blocking(file_path)
    }

    async fn batch_import(&self, file_paths: Vec<PathBuf>) -> Vec<Result<OrderBatch, String>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        let import_tasks = file_paths.iter().map(|path| async move {
            let path_str = path.display().to_string();
            match self.import_file(path).await {
                Ok(batch) => {
                    info!(file = %path_str, rows = batch.len(), "文件导入成功");
                    Ok(batch)
                }
                Err(e) => {
                    error!(file = %path_str, error = %e, "文件导入失败");
                    Err(format!("文件 {} 导入失败: {}", path_str, e))
                }
            }
        });

        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );
        results
    }
}

// ==========================================
// SupplierImporter - 供应商花名册导入器
// ==========================================
pub struct SupplierImporter {
    file_parser: Box<dyn FileParser>,
}

impl Default for SupplierImporter {
    fn default() -> Self {
        Self {
            file_parser: Box::new(UniversalFileParser),
        }
    }
}

impl SupplierImporter {
    pub fn new(file_parser: Box<dyn FileParser>) -> Self {
        Self { file_parser }
    }

    #[instrument(skip(self, file_path))]
    pub fn import_roster(&self, file_path: &Path) -> ImportResult<Vec<SupplierRecord>> {
        info!(file_path = %file_path.display(), "开始导入供应商花名册");
        let records: Vec<SupplierRecord> =
            load_sheet(self.file_parser.as_ref(), &SupplierFieldMapper, file_path)?;
        info!(count = records.len(), "供应商花名册解析完成");
        Ok(records)
    }
}
