// ==========================================
// Controle PCP - 计划看板存储
// ==========================================
// 职责: 批次行的追加与单标志切换
// 约束:
// - 批次号唯一，追加顺序即展示顺序
// - 只接受当前方案包含的标志，缺省标志按表单默认值补齐
// - 不提供删除与重排
// ==========================================

use crate::domain::board::{default_flag_value, Lot, NewLot, StageFlag};
use crate::domain::types::BoardSchema;
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct PlanningBoard {
    schema: BoardSchema,
    lots: Vec<Lot>,
}

impl PlanningBoard {
    pub fn new(schema: BoardSchema) -> Self {
        Self {
            schema,
            lots: Vec::new(),
        }
    }

    pub fn schema(&self) -> BoardSchema {
        self.schema
    }

    /// 追加批次
    ///
    /// # 错误
    /// - ValidationError: 批次号为空
    /// - DuplicateLot: 批次号已存在
    /// - UnknownFlag: 标志无法识别或不属于当前方案
    pub fn append(&mut self, new_lot: NewLot) -> RepositoryResult<&Lot> {
        let lot_id = new_lot.lot_id.trim().to_string();
        if lot_id.is_empty() {
            return Err(RepositoryError::ValidationError("批次号不能为空".to_string()));
        }
        if self.get(&lot_id).is_some() {
            return Err(RepositoryError::DuplicateLot(lot_id));
        }

        let mut flags: BTreeMap<StageFlag, bool> = self
            .schema
            .flags()
            .iter()
            .map(|flag| (*flag, default_flag_value(*flag)))
            .collect();
        for (name, value) in &new_lot.flags {
            let flag = self.resolve_flag(name)?;
            flags.insert(flag, *value);
        }

        info!(lot_id = %lot_id, schema = %self.schema, "追加看板批次");
        self.lots.push(Lot {
            lot_id,
            description: new_lot.description,
            color_tag: new_lot.color_tag,
            flags,
        });
        let index = self.lots.len() - 1;
        Ok(&self.lots[index])
    }

    /// 切换单个标志
    ///
    /// flag_name 接受规范名（如 "generate_soc"）或看板标签（如 "Gerar SOC"）。
    pub fn set_flag(&mut self, lot_id: &str, flag_name: &str, value: bool) -> RepositoryResult<&Lot> {
        let flag = self.resolve_flag(flag_name)?;
        let lot = self
            .lots
            .iter_mut()
            .find(|lot| lot.lot_id == lot_id.trim())
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Lot".to_string(),
                id: lot_id.to_string(),
            })?;

        lot.flags.insert(flag, value);
        debug!(lot_id = %lot.lot_id, flag = %flag, value, "看板标志切换");
        Ok(lot)
    }

    pub fn get(&self, lot_id: &str) -> Option<&Lot> {
        let wanted = lot_id.trim();
        self.lots.iter().find(|lot| lot.lot_id == wanted)
    }

    /// 全部批次（追加顺序）
    pub fn list(&self) -> &[Lot] {
        &self.lots
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    fn resolve_flag(&self, name: &str) -> RepositoryResult<StageFlag> {
        StageFlag::parse(name)
            .filter(|flag| self.schema.contains(*flag))
            .ok_or_else(|| RepositoryError::UnknownFlag {
                flag: name.to_string(),
                schema: self.schema.to_string(),
            })
    }
}
