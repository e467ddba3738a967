// ==========================================
// Controle PCP - 状态分类器
// ==========================================
// 职责: 逐条派生 status / situation / sector / lot_type
// 红线: 纯函数，无状态、无 I/O；today 由调用方传入
// ==========================================

use crate::domain::order::{ClassifiedOrder, DerivedFields, ProductionOrder};
use crate::domain::types::{LotType, OrderStatus, Sector, Situation, StatusRule};
use chrono::NaiveDate;
use tracing::debug;

/// 订单批次的计划代码前缀
pub const ORDER_PLAN_PREFIX: &str = "25";
/// 订单批次的计划代码长度（字符数）
pub const ORDER_PLAN_LEN: usize = 5;

// ==========================================
// StatusClassifier
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusClassifier {
    rule: StatusRule,
}

impl StatusClassifier {
    pub fn new(rule: StatusRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> StatusRule {
        self.rule
    }

    /// 派生单条 OF 的全部派生字段
    pub fn classify(&self, order: &ProductionOrder, today: NaiveDate) -> DerivedFields {
        DerivedFields {
            status: self.status(order),
            situation: Self::situation(order, today),
            sector: Sector::from_code(order.sector_code),
            lot_type: Self::lot_type(&order.plan_id),
        }
    }

    /// 批量分类（保持输入顺序）
    pub fn classify_all(&self, orders: &[ProductionOrder], today: NaiveDate) -> Vec<ClassifiedOrder> {
        debug!(count = orders.len(), rule = %self.rule, %today, "批量分类 OF");
        orders
            .iter()
            .map(|order| ClassifiedOrder {
                order: order.clone(),
                derived: self.classify(order, today),
            })
            .collect()
    }

    /// 状态判定
    ///
    /// # 规则
    /// - Balance: balance == 0 → Closed
    /// - EndDate: end_date 存在 → Closed
    pub fn status(&self, order: &ProductionOrder) -> OrderStatus {
        let closed = match self.rule {
            StatusRule::Balance => order.balance == 0,
            StatusRule::EndDate => order.end_date.is_some(),
        };
        if closed {
            OrderStatus::Closed
        } else {
            OrderStatus::Open
        }
    }

    /// 时效判定
    ///
    /// # 规则
    /// - 参考日期 = end_date，缺失时取 delivery_date
    /// - 参考日期 < today → Overdue；否则（含无参考日期）→ Upcoming
    pub fn situation(order: &ProductionOrder, today: NaiveDate) -> Situation {
        match order.end_date.or(order.delivery_date) {
            Some(reference) if reference < today => Situation::Overdue,
            _ => Situation::Upcoming,
        }
    }

    /// 批次类型判定: 恰好 5 个字符且以 "25" 开头 → Order
    pub fn lot_type(plan_id: &str) -> LotType {
        if Self::is_order_plan(plan_id) {
            LotType::Order
        } else {
            LotType::Parallel
        }
    }

    pub fn is_order_plan(plan_id: &str) -> bool {
        plan_id.chars().count() == ORDER_PLAN_LEN && plan_id.starts_with(ORDER_PLAN_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order(balance: u64, end: Option<NaiveDate>, delivery: Option<NaiveDate>) -> ProductionOrder {
        ProductionOrder {
            order_id: "OF1".to_string(),
            product: None,
            description: None,
            sector_code: Some(2),
            planned_qty: None,
            produced_qty: None,
            balance,
            start_date: None,
            end_date: end,
            delivery_date: delivery,
            plan_id: "25123".to_string(),
            row_number: 1,
        }
    }

    #[test]
    fn test_lot_type() {
        assert_eq!(StatusClassifier::lot_type("25123"), LotType::Order);
        assert_eq!(StatusClassifier::lot_type("99001"), LotType::Parallel);
        assert_eq!(StatusClassifier::lot_type("2512"), LotType::Parallel);
        assert_eq!(StatusClassifier::lot_type("251234"), LotType::Parallel);
        assert_eq!(StatusClassifier::lot_type("25AB1"), LotType::Order);
        assert_eq!(StatusClassifier::lot_type(""), LotType::Parallel);
    }

    #[test]
    fn test_status_balance_rule() {
        let classifier = StatusClassifier::new(StatusRule::Balance);
        assert_eq!(classifier.status(&order(0, None, None)), OrderStatus::Closed);
        assert_eq!(
            classifier.status(&order(3, Some(date(2025, 1, 1)), None)),
            OrderStatus::Open
        );
    }

    #[test]
    fn test_status_end_date_rule() {
        let classifier = StatusClassifier::new(StatusRule::EndDate);
        assert_eq!(classifier.status(&order(0, None, None)), OrderStatus::Open);
        assert_eq!(
            classifier.status(&order(3, Some(date(2025, 1, 1)), None)),
            OrderStatus::Closed
        );
    }

    #[test]
    fn test_situation_reference_date() {
        let today = date(2025, 3, 10);

        // end_date 优先
        let o = order(0, Some(date(2025, 3, 9)), Some(date(2025, 4, 1)));
        assert_eq!(StatusClassifier::situation(&o, today), Situation::Overdue);

        // 当天不算逾期
        let o = order(0, Some(today), None);
        assert_eq!(StatusClassifier::situation(&o, today), Situation::Upcoming);

        // 无 end_date 时取 delivery_date
        let o = order(4, None, Some(date(2025, 3, 1)));
        assert_eq!(StatusClassifier::situation(&o, today), Situation::Overdue);

        // 无参考日期
        let o = order(4, None, None);
        assert_eq!(StatusClassifier::situation(&o, today), Situation::Upcoming);
    }

    #[test]
    fn test_classify_full() {
        let classifier = StatusClassifier::default();
        let mut o = order(0, Some(date(2025, 1, 5)), None);
        o.sector_code = Some(7);
        let derived = classifier.classify(&o, date(2025, 1, 6));

        assert_eq!(derived.status, OrderStatus::Closed);
        assert_eq!(derived.situation, Situation::Overdue);
        assert_eq!(derived.sector, Sector::Unknown);
        assert_eq!(derived.lot_type, LotType::Order);
    }
}
