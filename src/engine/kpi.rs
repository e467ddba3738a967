// ==========================================
// Controle PCP - KPI 计算器
// ==========================================
// 职责: 对传入子集（筛选前或筛选后）计算指标
// - 标量指标: total / open / closed / overdue-open / 近三日关闭
// - 计划分解: 仅订单批次（Order 类型 plan_id）
// - 排行: 各工段最近关闭的 n 条 OF
// - 分布 / 批次进度
// 红线: 纯计算，不过滤、不排序输入本身
// ==========================================

use crate::domain::order::ClassifiedOrder;
use crate::domain::types::{LotType, OrderStatus, Sector, Situation};
use crate::engine::aggregator::Aggregator;
use crate::engine::classifier::StatusClassifier;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

// ==========================================
// KpiSummary - 标量指标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total: usize,
    pub open_count: usize,
    pub closed_count: usize,
    pub overdue_open_count: usize,
    pub closed_today: usize,
    pub closed_yesterday: usize,
    pub closed_day_before_yesterday: usize,
    /// 昨日相对前日的关闭环比（%）
    pub closed_evolution_pct: f64,
}

// ==========================================
// PlanBreakdown - 计划分解行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusShare {
    pub status: OrderStatus,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanBreakdown {
    pub plan_id: String,
    pub total: usize,
    pub shares: Vec<StatusShare>,
}

impl PlanBreakdown {
    pub fn share(&self, status: OrderStatus) -> Option<&StatusShare> {
        self.shares.iter().find(|s| s.status == status)
    }
}

// ==========================================
// 排行 / 分布 / 进度
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedEntry {
    pub order_id: String,
    pub plan_id: String,
    pub product: Option<String>,
    pub description: Option<String>,
    pub sector: Sector,
    pub end_date: NaiveDate,
}

impl ClosedEntry {
    fn from_order(order: &ClassifiedOrder, end_date: NaiveDate) -> Self {
        Self {
            order_id: order.order.order_id.clone(),
            plan_id: order.order.plan_id.clone(),
            product: order.order.product.clone(),
            description: order.order.description.clone(),
            sector: order.derived.sector,
            end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRanking {
    pub sector: Sector,
    pub sector_name: String,
    pub entries: Vec<ClosedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotProgress {
    pub plan_id: String,
    pub planned_qty: u64,
    pub produced_qty: u64,
    pub progress_pct: f64,
}

// ==========================================
// KpiCalculator
// ==========================================
pub struct KpiCalculator;

impl KpiCalculator {
    /// 标量指标
    pub fn summarize(orders: &[ClassifiedOrder], today: NaiveDate) -> KpiSummary {
        let closed_count = orders.iter().filter(|o| o.is_closed()).count();
        let overdue_open_count = orders
            .iter()
            .filter(|o| o.is_open() && o.derived.situation == Situation::Overdue)
            .count();

        let closed_today = Aggregator::closed_on(orders, today);
        let closed_yesterday = Aggregator::closed_on(orders, today - Duration::days(1));
        let closed_day_before_yesterday = Aggregator::closed_on(orders, today - Duration::days(2));

        KpiSummary {
            total: orders.len(),
            open_count: orders.len() - closed_count,
            closed_count,
            overdue_open_count,
            closed_today,
            closed_yesterday,
            closed_day_before_yesterday,
            closed_evolution_pct: Aggregator::evolution(
                closed_yesterday,
                closed_day_before_yesterday,
            ),
        }
    }

    /// 计划分解（按 plan_id 升序）
    ///
    /// 只统计 plan_id 符合订单批次格式的 OF；每个计划给出全部状态的数量与占比。
    pub fn plan_breakdown(orders: &[ClassifiedOrder]) -> Vec<PlanBreakdown> {
        let mut per_plan: BTreeMap<&str, BTreeMap<OrderStatus, usize>> = BTreeMap::new();
        for order in orders
            .iter()
            .filter(|o| StatusClassifier::is_order_plan(o.plan_id()))
        {
            *per_plan
                .entry(order.plan_id())
                .or_default()
                .entry(order.derived.status)
                .or_insert(0) += 1;
        }

        per_plan
            .into_iter()
            .map(|(plan_id, counts)| {
                let total: usize = counts.values().sum();
                let shares = OrderStatus::all()
                    .into_iter()
                    .map(|status| {
                        let count = counts.get(&status).copied().unwrap_or(0);
                        StatusShare {
                            status,
                            count,
                            percentage: percentage(count as f64, total as f64),
                        }
                    })
                    .collect();
                PlanBreakdown {
                    plan_id: plan_id.to_string(),
                    total,
                    shares,
                }
            })
            .collect()
    }

    /// 各工段最近关闭的 n 条 OF
    ///
    /// # 规则
    /// - 只取 Closed 且有 end_date 的 OF
    /// - end_date 降序，同日按 order_id 升序
    /// - 输出按工段顺序，无关闭记录的工段不出现
    pub fn latest_closed_by_sector(orders: &[ClassifiedOrder], n: usize) -> Vec<SectorRanking> {
        let mut per_sector: BTreeMap<Sector, Vec<ClosedEntry>> = BTreeMap::new();
        for entry in closed_entries(orders) {
            per_sector.entry(entry.sector).or_default().push(entry);
        }

        per_sector
            .into_iter()
            .map(|(sector, mut entries)| {
                sort_latest_first(&mut entries);
                entries.truncate(n);
                SectorRanking {
                    sector,
                    sector_name: sector.name().to_string(),
                    entries,
                }
            })
            .collect()
    }

    /// 全部工段合计最近关闭的 n 条 OF（排序规则同上）
    pub fn latest_closed(orders: &[ClassifiedOrder], n: usize) -> Vec<ClosedEntry> {
        let mut entries = closed_entries(orders);
        sort_latest_first(&mut entries);
        entries.truncate(n);
        entries
    }

    /// 按批次类型计数
    pub fn distribution_by_lot_type(orders: &[ClassifiedOrder]) -> Vec<CategoryCount> {
        let mut counts: BTreeMap<LotType, usize> = BTreeMap::new();
        for order in orders {
            *counts.entry(order.derived.lot_type).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(lot_type, count)| CategoryCount {
                label: lot_type.to_string(),
                count,
            })
            .collect()
    }

    /// 按工段计数
    pub fn distribution_by_sector(orders: &[ClassifiedOrder]) -> Vec<CategoryCount> {
        let mut counts: BTreeMap<Sector, usize> = BTreeMap::new();
        for order in orders {
            *counts.entry(order.derived.sector).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(sector, count)| CategoryCount {
                label: sector.name().to_string(),
                count,
            })
            .collect()
    }

    /// 批次进度: Σproduced / Σplanned × 100（计划量为 0 时为 0），按 plan_id 降序
    pub fn lot_progress(orders: &[ClassifiedOrder]) -> Vec<LotProgress> {
        let mut per_plan: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
        for order in orders {
            let totals = per_plan.entry(order.plan_id()).or_insert((0, 0));
            totals.0 = totals.0.saturating_add(order.order.planned_qty.unwrap_or(0));
            totals.1 = totals.1.saturating_add(order.order.produced_qty.unwrap_or(0));
        }

        per_plan
            .into_iter()
            .rev()
            .map(|(plan_id, (planned, produced))| LotProgress {
                plan_id: plan_id.to_string(),
                planned_qty: planned,
                produced_qty: produced,
                progress_pct: percentage(produced as f64, planned as f64),
            })
            .collect()
    }
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

fn closed_entries(orders: &[ClassifiedOrder]) -> Vec<ClosedEntry> {
    orders
        .iter()
        .filter(|o| o.is_closed())
        .filter_map(|o| o.end_date().map(|end| ClosedEntry::from_order(o, end)))
        .collect()
}

fn sort_latest_first(entries: &mut [ClosedEntry]) {
    entries.sort_by(|a, b| {
        (Reverse(a.end_date), &a.order_id).cmp(&(Reverse(b.end_date), &b.order_id))
    });
}
