// ==========================================
// Controle PCP - 核心库
// ==========================================
// 技术栈: Rust + SQLite（配置）+ calamine/csv（导入）
// 系统定位: 生产订单（OF）跟踪看板的计算内核
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - OF 仓储
pub mod importer;

// 引擎层 - 分类 / 筛选 / 聚合 / KPI
pub mod engine;

// 仓储层 - 计划看板
pub mod repository;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 会话装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    BoardSchema, LotType, OrderStatus, Sector, Situation, StatusRule, WindowKind,
};

// 领域实体
pub use domain::{ClassifiedOrder, Lot, LoadedDataset, NewLot, ProductionOrder, StageFlag};

// 引擎
pub use engine::{Aggregator, FilterEngine, KpiCalculator, Selections, StatusClassifier};

// 导入
pub use importer::{OrderRepository, RawTable};

// API
pub use api::{ApiError, ApiResult, DashboardApi, PlanningApi, ReportOutcome};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Controle PCP";
