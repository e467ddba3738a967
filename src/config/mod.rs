// ==========================================
// Controle PCP - 配置层
// ==========================================
// 职责: 引擎口径与默认参数的持久化读取
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod engine_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use engine_config::EngineConfig;
