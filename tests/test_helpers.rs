// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的 OF 构造、原始表构造、临时 CSV 文件与配置库
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use pcp_control::config::ConfigManager;
use pcp_control::domain::ProductionOrder;
use pcp_control::importer::RawTable;
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

/// 固定参考日期
pub fn today() -> NaiveDate {
    date(2025, 3, 10)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// OF 构造器
pub struct OrderBuilder {
    order: ProductionOrder,
}

impl OrderBuilder {
    pub fn new(order_id: &str, plan_id: &str) -> Self {
        Self {
            order: ProductionOrder {
                order_id: order_id.to_string(),
                product: None,
                description: None,
                sector_code: None,
                planned_qty: None,
                produced_qty: None,
                balance: 0,
                start_date: None,
                end_date: None,
                delivery_date: None,
                plan_id: plan_id.to_string(),
                row_number: 1,
            },
        }
    }

    pub fn sector(mut self, code: i64) -> Self {
        self.order.sector_code = Some(code);
        self
    }

    pub fn balance(mut self, balance: u64) -> Self {
        self.order.balance = balance;
        self
    }

    pub fn quantities(mut self, planned: u64, produced: u64) -> Self {
        self.order.planned_qty = Some(planned);
        self.order.produced_qty = Some(produced);
        self
    }

    pub fn end(mut self, end: NaiveDate) -> Self {
        self.order.end_date = Some(end);
        self
    }

    pub fn delivery(mut self, delivery: NaiveDate) -> Self {
        self.order.delivery_date = Some(delivery);
        self
    }

    pub fn build(self) -> ProductionOrder {
        self.order
    }
}

/// 由字符串切片构造原始表
pub fn raw_table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect::<Vec<_>>())
            .collect(),
    )
}

/// 车间导出表的典型表头（葡语别名）
pub const EXPORT_HEADERS: &[&str] = &[
    "ORDEM_F",
    "PRODUTO",
    "DESCRIÇÃO",
    "SUB-G",
    "PROGRAMADO",
    "PRODUZIDO",
    "SALDO",
    "INICIO",
    "FINAL",
    "PLANO",
    "ENTREGA",
];

/// 8 条 OF 的导出表（today = 2025-03-10）
///
/// - OF1..OF3 未关闭且无 FINAL；OF1、OF2 交付日早于 today
/// - OF4..OF8 已关闭
pub fn export_rows() -> Vec<Vec<&'static str>> {
    vec![
        vec!["OF1", "P-10", "Chassi", "1", "10", "4", "6", "01/02/2025", "", "25001", "01/03/2025"],
        vec!["OF2", "P-11", "Eixo", "2", "8", "5", "3", "02/02/2025", "", "25001", "05/03/2025"],
        vec!["OF3", "P-12", "Tampa", "3", "5", "0", "5", "03/02/2025", "", "25002", "20/03/2025"],
        vec!["OF4", "P-13", "Chassi", "1", "10", "10", "0", "04/02/2025", "10/03/2025", "25001", ""],
        vec!["OF5", "P-14", "Suporte", "1", "6", "6", "0", "05/02/2025", "09/03/2025", "25002", ""],
        vec!["OF6", "P-15", "Base", "2", "4", "4", "0", "06/02/2025", "09/03/2025", "99001", ""],
        vec!["OF7", "P-16", "Flange", "3", "3", "3", "0", "07/02/2025", "08/03/2025", "99001", ""],
        vec!["OF8", "P-17", "Eixo", "2", "2", "2", "0", "08/02/2025", "02/03/2025", "25002", ""],
    ]
}

pub fn export_table() -> RawTable {
    let rows = export_rows();
    let row_refs: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
    raw_table(EXPORT_HEADERS, &row_refs)
}

/// 把表写成 `;` 分隔的临时 CSV 文件
pub fn write_temp_csv(headers: &[&str], rows: &[Vec<&str>]) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    writeln!(file, "{}", headers.join(";"))?;
    for row in rows {
        writeln!(file, "{}", row.join(";"))?;
    }
    file.flush()?;
    Ok(file)
}

/// 创建临时配置库
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();
    ConfigManager::new(&db_path)?;
    Ok((temp_file, db_path))
}

/// 写入测试配置
pub fn insert_test_config(db_path: &str, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    let manager = ConfigManager::new(db_path)?;
    manager.set_global_config_value(key, value)?;
    Ok(())
}
