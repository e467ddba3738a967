// ==========================================
// Controle PCP - 仓储层
// ==========================================
// 职责: 会话内可变存储（计划看板）
// 红线: 只通过显式的变更接口（append / set_flag）修改
// ==========================================

pub mod error;
pub mod planning_board;

pub use error::{RepositoryError, RepositoryResult};
pub use planning_board::PlanningBoard;
