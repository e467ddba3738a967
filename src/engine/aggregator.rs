// ==========================================
// Controle PCP - 时间聚合器
// ==========================================
// 职责: 滚动窗口内逐日关闭数（零填充）+ 环比
// 红线: 确定性，只依赖输入与 today
// ==========================================

use crate::domain::order::ClassifiedOrder;
use crate::domain::types::WindowKind;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// DailyCount - 单日计数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

pub struct Aggregator;

impl Aggregator {
    /// 逐日关闭数
    ///
    /// # 规则
    /// - 窗口: [today - days, today]，两端包含，长度 days + 1
    /// - 仅统计 Closed 且 end_date 落在窗口内的 OF
    /// - 无关闭的日期补 0
    pub fn closures_by_day(
        orders: &[ClassifiedOrder],
        window: WindowKind,
        today: NaiveDate,
    ) -> Vec<DailyCount> {
        let start = today - Duration::days(window.days());

        let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
        for order in orders.iter().filter(|o| o.is_closed()) {
            if let Some(end) = order.end_date() {
                if end >= start && end <= today {
                    *per_day.entry(end).or_insert(0) += 1;
                }
            }
        }

        start
            .iter_days()
            .take_while(|d| *d <= today)
            .map(|date| DailyCount {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            })
            .collect()
    }

    /// 某日关闭数
    pub fn closed_on(orders: &[ClassifiedOrder], date: NaiveDate) -> usize {
        orders
            .iter()
            .filter(|o| o.is_closed() && o.end_date() == Some(date))
            .count()
    }

    /// 环比（百分比）
    ///
    /// (current - previous) / previous * 100；previous 为 0 时返回 0。
    pub fn evolution(current: usize, previous: usize) -> f64 {
        if previous == 0 {
            return 0.0;
        }
        (current as f64 - previous as f64) / previous as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::ProductionOrder;
    use crate::engine::classifier::StatusClassifier;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn closed_on(id: &str, end: Option<NaiveDate>, balance: u64) -> ProductionOrder {
        ProductionOrder {
            order_id: id.to_string(),
            product: None,
            description: None,
            sector_code: Some(1),
            planned_qty: None,
            produced_qty: None,
            balance,
            start_date: None,
            end_date: end,
            delivery_date: None,
            plan_id: "25001".to_string(),
            row_number: 1,
        }
    }

    #[test]
    fn test_window_length_and_zero_fill() {
        let today = date(2025, 3, 10);
        let orders = StatusClassifier::default().classify_all(
            &[
                closed_on("OF1", Some(date(2025, 3, 10)), 0),
                closed_on("OF2", Some(date(2025, 3, 10)), 0),
                closed_on("OF3", Some(date(2025, 3, 3)), 0),  // 窗口起点
                closed_on("OF4", Some(date(2025, 3, 2)), 0),  // 窗口外
                closed_on("OF5", Some(date(2025, 3, 11)), 0), // 未来
                closed_on("OF6", Some(date(2025, 3, 5)), 4),  // 未关闭
            ],
            today,
        );

        let series = Aggregator::closures_by_day(&orders, WindowKind::Weekly, today);
        assert_eq!(series.len(), 8);
        assert_eq!(series.first().unwrap().date, date(2025, 3, 3));
        assert_eq!(series.last().unwrap().date, today);
        assert_eq!(series[0].count, 1);
        assert_eq!(series[7].count, 2);
        assert_eq!(series.iter().map(|d| d.count).sum::<usize>(), 3);
        assert!(series[1..7].iter().all(|d| d.count == 0));
    }

    #[test]
    fn test_window_lengths() {
        let today = date(2024, 3, 1);
        for (window, len) in [
            (WindowKind::Weekly, 8),
            (WindowKind::Monthly, 31),
            (WindowKind::Yearly, 366),
        ] {
            assert_eq!(Aggregator::closures_by_day(&[], window, today).len(), len);
        }
    }

    #[test]
    fn test_deterministic() {
        let today = date(2025, 3, 10);
        let orders = StatusClassifier::default()
            .classify_all(&[closed_on("OF1", Some(date(2025, 3, 1)), 0)], today);
        let a = Aggregator::closures_by_day(&orders, WindowKind::Monthly, today);
        let b = Aggregator::closures_by_day(&orders, WindowKind::Monthly, today);
        assert_eq!(a, b);
    }

    #[test]
    fn test_evolution() {
        assert_eq!(Aggregator::evolution(120, 100), 20.0);
        assert_eq!(Aggregator::evolution(50, 100), -50.0);
        assert_eq!(Aggregator::evolution(7, 0), 0.0);
        assert_eq!(Aggregator::evolution(0, 0), 0.0);
    }
}
