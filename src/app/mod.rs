// ==========================================
// Controle PCP - 应用层
// ==========================================
// 职责: 把配置、看板 API 与计划看板装配成一个会话
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
