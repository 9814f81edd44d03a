// ==========================================
// 供应商 OTIF 监控 - 导入层
// ==========================================
// 职责: 外部表格导入,生成 OrderLine / SupplierRecord
// 支持: Excel, CSV
// ==========================================

pub mod columns;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod order_importer_impl;

// 重导出核心类型
pub use columns::{check_required_columns, ORDER_REQUIRED_COLUMNS, SUPPLIER_REQUIRED_COLUMNS};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{parse_flexible_date, parse_flexible_number, OrderFieldMapper, SupplierFieldMapper};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use order_importer_impl::{load_sheet, OrderImporterImpl, SupplierImporter};

// 重导出 Trait 接口
pub use importer_trait::{FileParser, OrderImporter, RawSheet, RowMapper};
