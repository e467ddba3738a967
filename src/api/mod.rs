// ==========================================
// Controle PCP - API 层
// ==========================================
// 职责: 面向调用方的统一入口，返回类型化 ApiResult
// ==========================================

pub mod dashboard_api;
pub mod error;
pub mod planning_api;

pub use dashboard_api::{DashboardApi, DashboardReport, EmptyReason, LoadReport, ReportOutcome};
pub use error::{ApiError, ApiResult};
pub use planning_api::{FlagColumn, PlanningApi};
