// ==========================================
// Controle PCP - 应用状态
// ==========================================
// 职责: 管理一个会话的共享状态和 API 实例
// 说明: 不使用全局变量；调用方持有 AppState 并按引用传递
// ==========================================

use std::sync::Arc;

use crate::api::{DashboardApi, PlanningApi};
use crate::config::config_manager::ConfigManager;
use crate::config::engine_config::EngineConfig;

/// 应用状态
pub struct AppState {
    /// 数据库路径（None 表示内存库）
    pub db_path: Option<String>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 本会话使用的引擎配置快照
    pub engine_config: EngineConfig,

    /// 看板 API
    pub dashboard_api: Arc<DashboardApi>,

    /// 计划看板 API
    pub planning_api: Arc<PlanningApi>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 参数
    /// - db_path: 配置数据库文件路径
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let config_manager = ConfigManager::new(&db_path)
            .map_err(|e| format!("无法创建ConfigManager: {}", e))?;
        Self::from_config_manager(Some(db_path), config_manager)
    }

    /// 使用内存配置库（测试 / 一次性 CLI 调用）
    pub fn in_memory() -> Result<Self, String> {
        let config_manager = ConfigManager::in_memory()
            .map_err(|e| format!("无法创建ConfigManager: {}", e))?;
        Self::from_config_manager(None, config_manager)
    }

    fn from_config_manager(
        db_path: Option<String>,
        config_manager: ConfigManager,
    ) -> Result<Self, String> {
        let engine_config = config_manager
            .load_engine_config()
            .map_err(|e| format!("无法加载引擎配置: {}", e))?;

        tracing::info!(
            status_rule = %engine_config.status_rule,
            board_schema = %engine_config.board_schema,
            date_format = %engine_config.date_format,
            "引擎配置已加载"
        );

        let dashboard_api = Arc::new(DashboardApi::new(engine_config.clone()));
        let planning_api = Arc::new(PlanningApi::new(engine_config.board_schema));

        Ok(Self {
            db_path,
            config_manager: Arc::new(config_manager),
            engine_config,
            dashboard_api,
            planning_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先 PCP_CONTROL_DB_PATH，其次用户数据目录，最后当前目录。
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("PCP_CONTROL_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./pcp_control.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("pcp-control");
        // 建目录失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("pcp_control.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_manager::config_keys;
    use crate::domain::types::BoardSchema;

    #[test]
    fn test_in_memory_state_uses_defaults() {
        let state = AppState::in_memory().unwrap();
        assert_eq!(state.engine_config, EngineConfig::default());
        assert!(state.db_path.is_none());
        assert_eq!(state.planning_api.columns().unwrap().len(), 5);
    }

    #[test]
    fn test_state_reads_persisted_config() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("config.db").to_string_lossy().to_string();
        {
            let manager = ConfigManager::new(&db_path).unwrap();
            manager
                .set_global_config_value(config_keys::BOARD_SCHEMA, "MINIMAL")
                .unwrap();
        }

        let state = AppState::new(db_path).unwrap();
        assert_eq!(state.engine_config.board_schema, BoardSchema::Minimal);
        assert_eq!(state.planning_api.columns().unwrap().len(), 2);
    }
}
