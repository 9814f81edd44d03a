// ==========================================
// 供应商 OTIF 监控 - 报告导出错误
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;
