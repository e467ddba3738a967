// ==========================================
// Controle PCP - OF 领域模型
// ==========================================
// 职责: 生产订单（OF）存储字段 + 派生字段
// 红线: 派生字段为存储字段与参考日期的纯函数，加载后不可变
// ==========================================

use crate::domain::types::{LotType, OrderStatus, Sector, Situation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ProductionOrder - OF 存储字段
// ==========================================
// 用途: 导入层写入，引擎层只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOrder {
    // ===== 标识 =====
    pub order_id: String,            // OF 号（ORDEM_F）
    pub product: Option<String>,     // 产品（PRODUTO）
    pub description: Option<String>, // 描述（DESCRIÇÃO）

    // ===== 工段 =====
    pub sector_code: Option<i64>, // 子组代码（SUB-G）

    // ===== 数量 =====
    pub planned_qty: Option<u64>,  // 计划数量（PROGRAMADO）
    pub produced_qty: Option<u64>, // 已产数量（PRODUZIDO）
    pub balance: u64,              // 余量（SALDO），缺省时 = planned - produced

    // ===== 日期 =====
    pub start_date: Option<NaiveDate>,    // 开始（INICIO）
    pub end_date: Option<NaiveDate>,      // 结束（FINAL）
    pub delivery_date: Option<NaiveDate>, // 交付（ENTREGA）

    // ===== 计划 =====
    pub plan_id: String, // 计划代码（PLANO）

    // ===== 元信息 =====
    pub row_number: usize, // 原始表格行号（数据行从 1 起）
}

// ==========================================
// DerivedFields - 派生字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub status: OrderStatus,
    pub situation: Situation,
    #[serde(rename = "sector_name")]
    pub sector: Sector,
    pub lot_type: LotType,
}

// ==========================================
// ClassifiedOrder - 已分类 OF
// ==========================================
// 存储字段 + 派生字段，由 StatusClassifier 一次性构建
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedOrder {
    #[serde(flatten)]
    pub order: ProductionOrder,
    #[serde(flatten)]
    pub derived: DerivedFields,
}

impl ClassifiedOrder {
    pub fn order_id(&self) -> &str {
        &self.order.order_id
    }

    pub fn plan_id(&self) -> &str {
        &self.order.plan_id
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.order.end_date
    }

    pub fn is_closed(&self) -> bool {
        self.derived.status == OrderStatus::Closed
    }

    pub fn is_open(&self) -> bool {
        self.derived.status == OrderStatus::Open
    }
}
