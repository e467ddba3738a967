// ==========================================
// Controle PCP - 引擎配置快照
// ==========================================
// 一次加载、全程只读；各 API 按此快照工作
// ==========================================

use crate::domain::types::{BoardSchema, StatusRule, WindowKind};
use crate::importer::data_cleaner::DEFAULT_DATE_FORMAT;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SECTOR_RANKING_LIMIT: usize = 5;
pub const DEFAULT_LATEST_CLOSED_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub status_rule: StatusRule,
    pub board_schema: BoardSchema,
    pub date_format: String,
    pub sector_ranking_limit: usize,
    pub latest_closed_limit: usize,
    pub default_window: WindowKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            status_rule: StatusRule::default(),
            board_schema: BoardSchema::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            sector_ranking_limit: DEFAULT_SECTOR_RANKING_LIMIT,
            latest_closed_limit: DEFAULT_LATEST_CLOSED_LIMIT,
            default_window: WindowKind::Monthly,
        }
    }
}
