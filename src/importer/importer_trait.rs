// ==========================================
// 供应商 OTIF 监控 - 导入管道 Trait
// ==========================================
// 管道: 文件解析 → 必需列检查 → 行映射
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::order::OrderBatch;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// RawSheet - 解析后的原始表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    /// 表头（已去除首尾空白）
    pub headers: Vec<String>,
    /// 数据行（列名 → 单元格文本）；完全空白的行已跳过
    pub records: Vec<HashMap<String, String>>,
}

impl RawSheet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 原始行记录
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

// ==========================================
// RowMapper Trait
// ==========================================
// 实现者: OrderFieldMapper, SupplierFieldMapper
pub trait RowMapper<T>: Send + Sync {
    /// 该表必须存在的列
    fn required_columns(&self) -> &'static [&'static str];

    /// 将原始行记录映射为领域对象
    ///
    /// # 参数
    /// - row: 原始行记录（列名 → 值）
    /// - row_number: 数据行号（从 1 开始，不含表头）
    fn map_row(&self, row: &HashMap<String, String>, row_number: usize) -> ImportResult<T>;
}

// ==========================================
// OrderImporter Trait
// ==========================================
// 实现者: OrderImporterImpl
#[async_trait]
pub trait OrderImporter: Send + Sync {
    /// 导入单个订单明细文件（.xlsx/.xls/.csv）
    ///
    /// 任一行映射失败则整个文件失败
    async fn import_file(&self, file_path: &Path) -> ImportResult<OrderBatch>;

    /// 批量导入多个文件（并发执行）
    ///
    /// 每个文件的导入互不影响，失败以字符串形式返回
    async fn batch_import(
        &self,
        file_paths: Vec<std::path::PathBuf>,
    ) -> Vec<Result<OrderBatch, String>>;
}
