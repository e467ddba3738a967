// ==========================================
// Controle PCP - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod board;
pub mod ingest;
pub mod order;
pub mod types;

// 重导出核心类型
pub use board::{Lot, NewLot, StageFlag};
pub use ingest::{Diagnostic, DiagnosticKind, LoadOutcome, LoadSummary, LoadedDataset};
pub use order::{ClassifiedOrder, DerivedFields, ProductionOrder};
pub use types::{
    BoardSchema, LotType, OrderStatus, Sector, Situation, StatusRule, WindowKind,
};
