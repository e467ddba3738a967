// ==========================================
// Controle PCP - 导入层 (Order Repository)
// ==========================================
// 职责: 原始表 → 规范化 ProductionOrder 集合 + 诊断
// 支持: xlsx, xls, csv（按固定顺序尝试，首个成功者生效）
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod order_importer_trait;
pub mod order_repository;
pub mod raw_table;

// 重导出核心类型
pub use data_cleaner::{DataCleaner as DataCleanerImpl, DEFAULT_DATE_FORMAT};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{columns, FieldMapper, COLUMN_ALIASES};
pub use file_parser::{CsvParser, ExcelParser, LegacyExcelParser, UniversalFileParser};
pub use order_repository::OrderRepository;
pub use raw_table::RawTable;

// 重导出 Trait 接口
pub use order_importer_trait::{DataCleaner, FileParser};
