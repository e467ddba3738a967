// ==========================================
// Controle PCP - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx) / 旧版 Excel (.xls) / CSV
// 顺序: xlsx → xls → csv，首个成功者胜出
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::order_importer_trait::FileParser;
use crate::importer::raw_table::RawTable;
use calamine::{Data, Reader, Xls, Xlsx};
use chrono::{Duration, NaiveDate};
use csv::ReaderBuilder;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, info};

// ==========================================
// Excel 公共逻辑
// ==========================================

/// Excel 序列日期的基准（1899-12-30）
fn excel_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// 将单元格渲染为文本；日期单元格按配置的日期格式输出
fn cell_to_text(cell: &Data, date_format: &str) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => {
            let serial = dt.as_f64().floor() as i64;
            excel_epoch()
                .and_then(|epoch| epoch.checked_add_signed(Duration::days(serial)))
                .map(|d| d.format(date_format).to_string())
                .unwrap_or_default()
        }
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .map(|d| d.format(date_format).to_string())
            .unwrap_or_else(|| s.clone()),
        Data::DurationIso(s) => s.clone(),
    }
}

/// 读取工作簿第一个 sheet
fn first_sheet_to_table<RS, R>(workbook: &mut R, date_format: &str) -> ImportResult<RawTable>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无表头行".to_string()))?;

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_text(cell, date_format))
        .collect();

    let mut records = Vec::new();
    for data_row in rows {
        let row: Vec<String> = data_row
            .iter()
            .map(|cell| cell_to_text(cell, date_format))
            .collect();

        // 跳过完全空白的行
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        records.push(row);
    }

    Ok(RawTable::new(headers, records))
}

// ==========================================
// Excel Parser 实现 (.xlsx)
// ==========================================
pub struct ExcelParser {
    date_format: String,
}

impl ExcelParser {
    pub fn new(date_format: &str) -> Self {
        Self {
            date_format: date_format.to_string(),
        }
    }
}

impl FileParser for ExcelParser {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawTable> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
        first_sheet_to_table(&mut workbook, &self.date_format)
    }
}

// ==========================================
// Legacy Excel Parser 实现 (.xls)
// ==========================================
pub struct LegacyExcelParser {
    date_format: String,
}

impl LegacyExcelParser {
    pub fn new(date_format: &str) -> Self {
        Self {
            date_format: date_format.to_string(),
        }
    }
}

impl FileParser for LegacyExcelParser {
    fn name(&self) -> &'static str {
        "xls"
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawTable> {
        let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes))
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
        first_sheet_to_table(&mut workbook, &self.date_format)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
// 分隔符未指定时按表头行嗅探（',' 或 ';'）
// 非 UTF-8 内容按 Latin-1 解码（Windows 导出的葡语表头）
pub struct CsvParser {
    delimiter: Option<u8>,
}

impl CsvParser {
    pub fn new() -> Self {
        Self { delimiter: None }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    fn decode(bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    fn sniff_delimiter(text: &str) -> u8 {
        let header = text.lines().next().unwrap_or("");
        let semicolons = header.matches(';').count();
        let commas = header.matches(',').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }
}

impl Default for CsvParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FileParser for CsvParser {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawTable> {
        if bytes.contains(&0) {
            return Err(ImportError::CsvParseError("内容包含二进制数据".to_string()));
        }

        let text = Self::decode(bytes);
        let delimiter = self.delimiter.unwrap_or_else(|| Self::sniff_delimiter(&text));

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::CsvParseError("CSV 文件无表头".to_string()));
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();

            // 跳过完全空白的行
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            records.push(row);
        }

        Ok(RawTable::new(headers, records))
    }
}

// ==========================================
// 通用文件解析器（按固定顺序尝试所有格式）
// ==========================================
pub struct UniversalFileParser {
    parsers: Vec<Box<dyn FileParser>>,
}

impl UniversalFileParser {
    /// 默认解析链: xlsx → xls → csv
    pub fn new(date_format: &str) -> Self {
        Self {
            parsers: vec![
                Box::new(ExcelParser::new(date_format)),
                Box::new(LegacyExcelParser::new(date_format)),
                Box::new(CsvParser::new()),
            ],
        }
    }

    /// 自定义解析链
    pub fn with_parsers(parsers: Vec<Box<dyn FileParser>>) -> Self {
        Self { parsers }
    }

    /// 解析文件内容
    ///
    /// # 返回
    /// - Ok((RawTable, 解析器名称)): 首个成功的解析结果
    /// - Err(UnsupportedFileFormat): 所有解析器均失败
    pub fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<(RawTable, &'static str)> {
        let mut failures = Vec::new();
        for parser in &self.parsers {
            match parser.parse_bytes(bytes) {
                Ok(table) => {
                    info!(parser = parser.name(), rows = table.row_count(), "文件解析完成");
                    return Ok((table, parser.name()));
                }
                Err(e) => {
                    debug!(parser = parser.name(), error = %e, "解析器不适用，尝试下一个");
                    failures.push(format!("{}: {}", parser.name(), e));
                }
            }
        }
        Err(ImportError::UnsupportedFileFormat(failures.join("; ")))
    }

    /// 读取文件字节
    pub fn read_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<u8>> {
        let path = file_path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        Ok(std::fs::read(path)?)
    }

    /// 读取并解析文件
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<(RawTable, &'static str)> {
        let bytes = self.read_file(file_path)?;
        self.parse_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_comma() {
        let parser = CsvParser::new();
        let table = parser
            .parse_bytes(b"ORDEM_F,SALDO,PLANO\nOF1,0,25001\nOF2,3,25002\n")
            .unwrap();

        assert_eq!(table.headers(), &["ORDEM_F", "SALDO", "PLANO"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, "SALDO"), Some("3"));
    }

    #[test]
    fn test_csv_parser_semicolon_sniffing() {
        let parser = CsvParser::new();
        let table = parser
            .parse_bytes("ORDEM_F;DESCRIÇÃO;FINAL\nOF1;Chassi, solda;01/02/2025\n".as_bytes())
            .unwrap();

        assert_eq!(table.headers().len(), 3);
        assert_eq!(table.cell(0, "DESCRIÇÃO"), Some("Chassi, solda"));
    }

    #[test]
    fn test_csv_parser_latin1_fallback() {
        // "DESCRIÇÃO" 以 Latin-1 编码
        let mut bytes = b"ORDEM_F,DESCRI".to_vec();
        bytes.extend_from_slice(&[0xC7, 0xC3]);
        bytes.extend_from_slice(b"O\nOF1,Eixo\n");

        let table = CsvParser::new().parse_bytes(&bytes).unwrap();
        assert!(table.has_column("DESCRIÇÃO"));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let table = CsvParser::new()
            .parse_bytes(b"ORDEM_F,SALDO\nOF1,0\n,\nOF2,1\n")
            .unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_csv_parser_rejects_binary() {
        assert!(CsvParser::new().parse_bytes(&[0x50, 0x4b, 0x03, 0x04, 0x00]).is_err());
    }

    #[test]
    fn test_universal_parser_falls_back_to_csv() {
        let parser = UniversalFileParser::new("%d/%m/%Y");
        let (table, used) = parser.parse_bytes(b"ORDEM_F,SALDO\nOF1,0\n").unwrap();
        assert_eq!(used, "csv");
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_universal_parser_all_fail() {
        let parser = UniversalFileParser::new("%d/%m/%Y");
        let result = parser.parse_bytes(&[0x00, 0x01, 0x02]);
        assert!(matches!(result, Err(ImportError::UnsupportedFileFormat(_))));
    }

    #[test]
    fn test_universal_parser_file_not_found() {
        let parser = UniversalFileParser::new("%d/%m/%Y");
        let result = parser.parse_file("non_existent.xlsx");
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_reads_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "ORDEM_F;SALDO").unwrap();
        writeln!(temp_file, "OF9;4").unwrap();

        let parser = UniversalFileParser::new("%d/%m/%Y");
        let (table, _) = parser.parse_file(temp_file.path()).unwrap();
        assert_eq!(table.cell(0, "ORDEM_F"), Some("OF9"));
    }

    #[test]
    fn test_cell_to_text_numbers() {
        assert_eq!(cell_to_text(&Data::Float(12.0), "%d/%m/%Y"), "12");
        assert_eq!(cell_to_text(&Data::Float(2.5), "%d/%m/%Y"), "2.5");
        assert_eq!(cell_to_text(&Data::Empty, "%d/%m/%Y"), "");
        assert_eq!(
            cell_to_text(&Data::DateTimeIso("2025-03-04T00:00:00".to_string()), "%d/%m/%Y"),
            "04/03/2025"
        );
    }
}
