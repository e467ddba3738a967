// ==========================================
// Controle PCP - OF 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::raw_table::RawTable;
use chrono::NaiveDate;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 格式解析器（阶段 0），按固定顺序尝试，首个成功者胜出
// 实现者: ExcelParser, LegacyExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析器名称（用于日志与诊断）
    fn name(&self) -> &'static str;

    /// 将文件内容解析为原始表格
    ///
    /// # 返回
    /// - Ok(RawTable): 表头 + 数据行（已跳过全空行）
    /// - Err: 内容不属于该格式或已损坏
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawTable>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格清洗与类型转换（阶段 2）
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 空白标准化为 None
    fn normalize_null(&self, value: Option<&str>) -> Option<String>;

    /// 按固定格式解析日期，无法解析返回 None
    fn parse_date(&self, value: &str) -> Option<NaiveDate>;

    /// 解析非负整数（兼容 Excel 导出的 "12.0"）
    fn parse_quantity(&self, value: &str) -> Option<u64>;

    /// 解析有符号整数（兼容 "3.0"）
    fn parse_integer(&self, value: &str) -> Option<i64>;
}
