// ==========================================
// Controle PCP - 多维筛选引擎
// ==========================================
// 规则:
// - 某维度选择集为空 → 该维度不约束
// - 非空 → 取值必须属于选择集
// - 各维度之间为 AND
// 红线: 不修改输入，返回保持相对顺序的新子集
// ==========================================

use crate::domain::order::ClassifiedOrder;
use crate::domain::types::{LotType, OrderStatus, Situation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

// ==========================================
// Dimension - 筛选维度
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    LotType,
    PlanId,
    Status,
    Situation,
    SectorCode,
}

impl Dimension {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lot_type" => Some(Dimension::LotType),
            "plan_id" => Some(Dimension::PlanId),
            "status" => Some(Dimension::Status),
            "situation" => Some(Dimension::Situation),
            "sector_code" => Some(Dimension::SectorCode),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::LotType => "lot_type",
            Dimension::PlanId => "plan_id",
            Dimension::Status => "status",
            Dimension::Situation => "situation",
            Dimension::SectorCode => "sector_code",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ==========================================
// SelectionError
// ==========================================
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("未知筛选维度: {0}")]
    UnknownDimension(String),

    #[error("筛选值无效 (维度 {dimension}): {value}")]
    InvalidValue { dimension: String, value: String },
}

// ==========================================
// Selections - 用户选择
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    #[serde(default)]
    pub lot_type: BTreeSet<LotType>,
    #[serde(default)]
    pub plan_id: BTreeSet<String>,
    #[serde(default)]
    pub status: BTreeSet<OrderStatus>,
    #[serde(default)]
    pub situation: BTreeSet<Situation>,
    /// None 表示未填写工段代码的 OF
    #[serde(default)]
    pub sector_code: BTreeSet<Option<i64>>,
}

impl Selections {
    /// 全部维度不约束
    pub fn none() -> Self {
        Self::default()
    }

    /// 从 "维度名 → 取值列表" 构建
    ///
    /// 取值接受规范编码或原始葡语标签（如 "fechada"、"Paralelo"）。
    pub fn from_named(named: &HashMap<String, Vec<String>>) -> Result<Self, SelectionError> {
        let mut selections = Self::default();
        for (name, values) in named {
            let dimension = Dimension::parse(name)
                .ok_or_else(|| SelectionError::UnknownDimension(name.clone()))?;
            for value in values {
                selections.insert(dimension, value)?;
            }
        }
        Ok(selections)
    }

    /// 向某维度追加一个取值
    pub fn insert(&mut self, dimension: Dimension, value: &str) -> Result<(), SelectionError> {
        let invalid = || SelectionError::InvalidValue {
            dimension: dimension.name().to_string(),
            value: value.to_string(),
        };
        match dimension {
            Dimension::LotType => {
                self.lot_type.insert(LotType::parse(value).ok_or_else(invalid)?);
            }
            Dimension::PlanId => {
                let plan = value.trim();
                if plan.is_empty() {
                    return Err(invalid());
                }
                self.plan_id.insert(plan.to_string());
            }
            Dimension::Status => {
                self.status.insert(OrderStatus::parse(value).ok_or_else(invalid)?);
            }
            Dimension::Situation => {
                self.situation.insert(Situation::parse(value).ok_or_else(invalid)?);
            }
            Dimension::SectorCode => {
                let trimmed = value.trim();
                let code = if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(trimmed.parse::<i64>().map_err(|_| invalid())?)
                };
                self.sector_code.insert(code);
            }
        }
        Ok(())
    }

    pub fn is_unconstrained(&self) -> bool {
        self.lot_type.is_empty()
            && self.plan_id.is_empty()
            && self.status.is_empty()
            && self.situation.is_empty()
            && self.sector_code.is_empty()
    }

    /// 单条 OF 是否满足全部维度
    pub fn matches(&self, order: &ClassifiedOrder) -> bool {
        allows(&self.lot_type, &order.derived.lot_type)
            && allows(&self.plan_id, &order.order.plan_id)
            && allows(&self.status, &order.derived.status)
            && allows(&self.situation, &order.derived.situation)
            && allows(&self.sector_code, &order.order.sector_code)
    }
}

fn allows<T: Ord>(selected: &BTreeSet<T>, value: &T) -> bool {
    selected.is_empty() || selected.contains(value)
}

// ==========================================
// FilterEngine
// ==========================================
pub struct FilterEngine;

impl FilterEngine {
    /// 应用筛选，返回新子集（保持相对顺序）
    pub fn filter(orders: &[ClassifiedOrder], selections: &Selections) -> Vec<ClassifiedOrder> {
        if selections.is_unconstrained() {
            return orders.to_vec();
        }
        orders
            .iter()
            .filter(|order| selections.matches(order))
            .cloned()
            .collect()
    }

    /// 数据中出现的各维度取值（用于填充选择列表）
    pub fn options(orders: &[ClassifiedOrder]) -> FilterOptions {
        let mut options = FilterOptions::default();
        for order in orders {
            options.lot_type.insert(order.derived.lot_type);
            options.plan_id.insert(order.order.plan_id.clone());
            options.status.insert(order.derived.status);
            options.situation.insert(order.derived.situation);
            options.sector_code.insert(order.order.sector_code);
        }
        options
    }
}

// ==========================================
// FilterOptions - 可选取值
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub lot_type: BTreeSet<LotType>,
    pub plan_id: BTreeSet<String>,
    pub status: BTreeSet<OrderStatus>,
    pub situation: BTreeSet<Situation>,
    pub sector_code: BTreeSet<Option<i64>>,
}

impl FilterOptions {
    /// 选中全部可选取值的 Selections
    pub fn select_all(&self) -> Selections {
        Selections {
            lot_type: self.lot_type.clone(),
            plan_id: self.plan_id.clone(),
            status: self.status.clone(),
            situation: self.situation.clone(),
            sector_code: self.sector_code.clone(),
        }
    }
}
