// ==========================================
// Controle PCP - 引擎层
// ==========================================
// 职责: 分类 → 筛选 → 聚合 / KPI，全部为纯函数
// 红线: 不做 I/O；today 一律由调用方传入
// ==========================================
// 状态规则: 默认以 balance == 0 判定关闭（StatusRule::Balance），
// 可通过配置 engine/status_rule 切换为 END_DATE
// ==========================================

pub mod aggregator;
pub mod classifier;
pub mod filter;
pub mod kpi;

// 重导出核心引擎
pub use aggregator::{Aggregator, DailyCount};
pub use classifier::StatusClassifier;
pub use filter::{Dimension, FilterEngine, FilterOptions, SelectionError, Selections};
pub use kpi::{
    CategoryCount, ClosedEntry, KpiCalculator, KpiSummary, LotProgress, PlanBreakdown,
    SectorRanking, StatusShare,
};
