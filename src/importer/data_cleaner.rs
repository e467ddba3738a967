// ==========================================
// Controle PCP - 数据清洗器实现
// ==========================================
// 职责: NULL 标准化 / 日期解析 / 数量解析
// 红线: 单元格解析失败只返回 None，不中断整表导入
// ==========================================

use crate::importer::order_importer_trait::DataCleaner as DataCleanerTrait;
use chrono::NaiveDate;

/// 默认日期格式（日/月/年）
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

pub struct DataCleaner {
    date_format: String,
}

impl DataCleaner {
    pub fn new(date_format: &str) -> Self {
        Self {
            date_format: date_format.to_string(),
        }
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// 解析数值文本为 f64（兼容小数逗号 "12,0"）
    fn parse_number(value: &str) -> Option<f64> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed
            .parse::<f64>()
            .ok()
            .or_else(|| trimmed.replace(',', ".").parse::<f64>().ok())
            .filter(|n| n.is_finite())
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT)
    }
}

impl DataCleanerTrait for DataCleaner {
    fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let trimmed = value.trim();
        // Excel 导出时常带 " 00:00:00" 时间部分
        let date_part = trimmed.split_whitespace().next().unwrap_or(trimmed);
        NaiveDate::parse_from_str(date_part, &self.date_format).ok()
    }

    fn parse_quantity(&self, value: &str) -> Option<u64> {
        let n = Self::parse_number(value)?;
        if n < 0.0 || n.fract() != 0.0 {
            return None;
        }
        Some(n as u64)
    }

    fn parse_integer(&self, value: &str) -> Option<i64> {
        let n = Self::parse_number(value)?;
        if n.fract() != 0.0 {
            return None;
        }
        Some(n as i64)
    }
}
