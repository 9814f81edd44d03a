// ==========================================
// 供应商 OTIF 监控 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv, 逗号或分号分隔)
// 输出: RawSheet（表头 + 列名→文本 的行记录）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, RawSheet};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

/// 将一行单元格按表头装配为记录；完全空白返回 None
fn assemble_record<I>(headers: &[String], cells: I) -> Option<HashMap<String, String>>
where
    I: Iterator<Item = String>,
{
    let mut row_map = HashMap::with_capacity(headers.len());
    for (col_idx, value) in cells.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if !header.is_empty() {
                row_map.insert(header.clone(), value.trim().to_string());
            }
        }
    }

    if row_map.values().all(|v| v.is_empty()) {
        None
    } else {
        Some(row_map)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 按首行判断分隔符（分号多于逗号时使用分号）
    fn sniff_delimiter(path: &Path) -> ImportResult<u8> {
        let mut first_line = String::new();
        BufReader::new(File::open(path)?).read_line(&mut first_line)?;
        let semicolons = first_line.matches(';').count();
        let commas = first_line.matches(',').count();
        Ok(if semicolons > commas { b';' } else { b',' })
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let ext = file_extension(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let delimiter = Self::sniff_delimiter(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(File::open(file_path)?);

        let headers: Vec<String> = reader.headers()?.iter().map(clean_header).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            if let Some(row) = assemble_record(&headers, record.iter().map(str::to_string)) {
                records.push(row);
            }
        }

        debug!(
            file = %file_path.display(),
            delimiter = %(delimiter as char),
            rows = records.len(),
            "CSV 解析完成"
        );
        Ok(RawSheet { headers, records })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 只读第一个工作表，第一行为表头
// 日期单元格以 Excel 序列号文本输出，由字段映射器识别
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let ext = file_extension(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| clean_header(&cell.to_string()))
            .collect();

        let records: Vec<HashMap<String, String>> = rows
            .filter_map(|data_row| assemble_record(&headers, data_row.iter().map(|c| c.to_string())))
            .collect();

        debug!(
            file = %file_path.display(),
            sheet = %sheet_name,
            rows = records.len(),
            "Excel 解析完成"
        );
        Ok(RawSheet { headers, records })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_sheet(&self, file_path: &Path) -> ImportResult<RawSheet> {
        match file_extension(file_path).as_str() {
            "csv" => CsvParser.parse_to_raw_sheet(file_path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_sheet(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
