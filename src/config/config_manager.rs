// ==========================================
// Controle PCP - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)，仅使用 global scope
// 约束: 键缺失或取值无法解析时回落默认值（并告警），不报错
// ==========================================

use crate::config::engine_config::{
    EngineConfig, DEFAULT_LATEST_CLOSED_LIMIT, DEFAULT_SECTOR_RANKING_LIMIT,
};
use crate::db::{init_schema, open_in_memory, open_sqlite_connection};
use crate::domain::types::{BoardSchema, StatusRule, WindowKind};
use crate::importer::data_cleaner::DEFAULT_DATE_FORMAT;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（必要时建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 内存库上的 ConfigManager（不持久化）
    pub fn in_memory() -> Result<Self, Box<dyn Error>> {
        let conn = open_in_memory()?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        debug!(key, value, "配置已写入");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON 格式，按键排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    // ===== 引擎配置 =====

    pub fn get_status_rule(&self) -> Result<StatusRule, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::STATUS_RULE, "BALANCE")?;
        Ok(parse_or_default(config_keys::STATUS_RULE, &value, StatusRule::parse))
    }

    pub fn get_board_schema(&self) -> Result<BoardSchema, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::BOARD_SCHEMA, "PIPELINE")?;
        Ok(parse_or_default(config_keys::BOARD_SCHEMA, &value, BoardSchema::parse))
    }

    pub fn get_date_format(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DATE_FORMAT, DEFAULT_DATE_FORMAT)?;
        if value.trim().is_empty() {
            warn!(key = config_keys::DATE_FORMAT, "日期格式为空，使用默认值");
            return Ok(DEFAULT_DATE_FORMAT.to_string());
        }
        Ok(value)
    }

    pub fn get_sector_ranking_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_limit(config_keys::SECTOR_RANKING_LIMIT, DEFAULT_SECTOR_RANKING_LIMIT)
    }

    pub fn get_latest_closed_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_limit(config_keys::LATEST_CLOSED_LIMIT, DEFAULT_LATEST_CLOSED_LIMIT)
    }

    pub fn get_default_window(&self) -> Result<WindowKind, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::DEFAULT_WINDOW, "MONTHLY")?;
        Ok(match WindowKind::parse(&value) {
            Some(window) => window,
            None => {
                warn!(key = config_keys::DEFAULT_WINDOW, value = %value, "配置值无法解析，使用默认值");
                WindowKind::Monthly
            }
        })
    }

    /// 汇总为只读的引擎配置快照
    pub fn load_engine_config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        Ok(EngineConfig {
            status_rule: self.get_status_rule()?,
            board_schema: self.get_board_schema()?,
            date_format: self.get_date_format()?,
            sector_ranking_limit: self.get_sector_ranking_limit()?,
            latest_closed_limit: self.get_latest_closed_limit()?,
            default_window: self.get_default_window()?,
        })
    }

    fn get_limit(&self, key: &str, default: usize) -> Result<usize, Box<dyn Error>> {
        let value = self.get_config_or_default(key, &default.to_string())?;
        Ok(match value.trim().parse::<usize>() {
            Ok(limit) if limit > 0 => limit,
            _ => {
                warn!(key, value = %value, default, "配置值无效，使用默认值");
                default
            }
        })
    }
}

fn parse_or_default<T: Default>(key: &str, value: &str, parse: fn(&str) -> Option<T>) -> T {
    parse(value).unwrap_or_else(|| {
        warn!(key, value, "配置值无法解析，使用默认值");
        T::default()
    })
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 引擎口径
    pub const STATUS_RULE: &str = "engine/status_rule";
    pub const BOARD_SCHEMA: &str = "board/schema";

    // 导入
    pub const DATE_FORMAT: &str = "import/date_format";

    // KPI
    pub const SECTOR_RANKING_LIMIT: &str = "kpi/sector_ranking_limit";
    pub const LATEST_CLOSED_LIMIT: &str = "kpi/latest_closed_limit";

    // 聚合
    pub const DEFAULT_WINDOW: &str = "aggregator/default_window";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let manager = ConfigManager::in_memory().unwrap();
        assert_eq!(manager.load_engine_config().unwrap(), EngineConfig::default());
        assert_eq!(manager.get_config_snapshot().unwrap(), "{}");
    }

    #[test]
    fn test_overrides() {
        let manager = ConfigManager::in_memory().unwrap();
        manager.set_global_config_value(config_keys::STATUS_RULE, "END_DATE").unwrap();
        manager.set_global_config_value(config_keys::BOARD_SCHEMA, "minimal").unwrap();
        manager.set_global_config_value(config_keys::SECTOR_RANKING_LIMIT, "3").unwrap();
        manager.set_global_config_value(config_keys::DEFAULT_WINDOW, "semanal").unwrap();

        let config = manager.load_engine_config().unwrap();
        assert_eq!(config.status_rule, StatusRule::EndDate);
        assert_eq!(config.board_schema, BoardSchema::Minimal);
        assert_eq!(config.sector_ranking_limit, 3);
        assert_eq!(config.default_window, WindowKind::Weekly);
        assert_eq!(config.latest_closed_limit, DEFAULT_LATEST_CLOSED_LIMIT);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let manager = ConfigManager::in_memory().unwrap();
        manager.set_global_config_value(config_keys::STATUS_RULE, "SOMETIMES").unwrap();
        manager.set_global_config_value(config_keys::LATEST_CLOSED_LIMIT, "0").unwrap();

        let config = manager.load_engine_config().unwrap();
        assert_eq!(config.status_rule, StatusRule::Balance);
        assert_eq!(config.latest_closed_limit, DEFAULT_LATEST_CLOSED_LIMIT);
    }

    #[test]
    fn test_upsert_and_snapshot() {
        let manager = ConfigManager::in_memory().unwrap();
        manager.set_global_config_value(config_keys::DATE_FORMAT, "%Y-%m-%d").unwrap();
        manager.set_global_config_value(config_keys::DATE_FORMAT, "%d-%m-%Y").unwrap();

        assert_eq!(
            manager.get_global_config_value(config_keys::DATE_FORMAT).unwrap(),
            Some("%d-%m-%Y".to_string())
        );
        let snapshot: serde_json::Value =
            serde_json::from_str(&manager.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot["import/date_format"], "%d-%m-%Y");
    }
}
