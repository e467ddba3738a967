// ==========================================
// Controle PCP - 计划看板 API
// ==========================================
// 职责: 封装 PlanningBoard，提供批次追加、标志切换与列表查询
// 约束: 单会话单写者；锁只用于把存储对象安全地放进共享状态
// ==========================================

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::error::ApiResult;
use crate::domain::board::{default_flag_value, Lot, NewLot};
use crate::domain::types::BoardSchema;
use crate::repository::error::RepositoryError;
use crate::repository::planning_board::PlanningBoard;

/// 看板列定义（供界面渲染表头）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagColumn {
    pub name: String,
    pub label: String,
    pub default_value: bool,
}

pub struct PlanningApi {
    board: Mutex<PlanningBoard>,
}

impl PlanningApi {
    pub fn new(schema: BoardSchema) -> Self {
        Self {
            board: Mutex::new(PlanningBoard::new(schema)),
        }
    }

    /// 追加批次
    #[instrument(skip(self, new_lot), fields(lot_id = %new_lot.lot_id))]
    pub fn append(&self, new_lot: NewLot) -> ApiResult<Lot> {
        let mut board = self.lock_board()?;
        Ok(board.append(new_lot)?.clone())
    }

    /// 切换单个标志
    pub fn set_flag(&self, lot_id: &str, flag_name: &str, value: bool) -> ApiResult<Lot> {
        let mut board = self.lock_board()?;
        Ok(board.set_flag(lot_id, flag_name, value)?.clone())
    }

    /// 全部批次（追加顺序）
    pub fn list(&self) -> ApiResult<Vec<Lot>> {
        Ok(self.lock_board()?.list().to_vec())
    }

    pub fn get(&self, lot_id: &str) -> ApiResult<Lot> {
        let board = self.lock_board()?;
        board.get(lot_id).cloned().ok_or_else(|| {
            RepositoryError::NotFound {
                entity: "Lot".to_string(),
                id: lot_id.to_string(),
            }
            .into()
        })
    }

    /// 当前方案的看板列
    pub fn columns(&self) -> ApiResult<Vec<FlagColumn>> {
        let board = self.lock_board()?;
        Ok(board
            .schema()
            .flags()
            .iter()
            .map(|flag| FlagColumn {
                name: flag.name().to_string(),
                label: flag.label().to_string(),
                default_value: default_flag_value(*flag),
            })
            .collect())
    }

    fn lock_board(&self) -> Result<MutexGuard<'_, PlanningBoard>, RepositoryError> {
        self.board
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}
