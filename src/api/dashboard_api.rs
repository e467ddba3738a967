// ==========================================
// Controle PCP - 看板 API
// ==========================================
// 职责: 加载 OF 数据，并在当前数据集上提供筛选 / KPI / 聚合查询
// 流程: OrderRepository (导入+记忆化) → StatusClassifier (一次性分类) → 引擎查询
// 约束: 分类结果在会话内只读；同一数据集 + 同一 today 不重复分类
// ==========================================

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::engine_config::EngineConfig;
use crate::domain::ingest::{Diagnostic, LoadOutcome, LoadSummary, LoadedDataset};
use crate::domain::order::ClassifiedOrder;
use crate::domain::types::WindowKind;
use crate::engine::aggregator::{Aggregator, DailyCount};
use crate::engine::classifier::StatusClassifier;
use crate::engine::filter::{FilterEngine, FilterOptions, Selections};
use crate::engine::kpi::{
    CategoryCount, ClosedEntry, KpiCalculator, KpiSummary, LotProgress, PlanBreakdown,
    SectorRanking,
};
use crate::importer::order_repository::OrderRepository;
use crate::importer::raw_table::RawTable;

// ==========================================
// 返回结构
// ==========================================

/// 一次加载的结论
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub batch_id: String,
    pub content_digest: String,
    pub outcome: LoadOutcome,
    pub summary: LoadSummary,
    pub diagnostics: Vec<Diagnostic>,
    pub today: NaiveDate,
}

/// 报表为空的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmptyReason {
    NoRowsLoaded,
    NoRowsMatchFilter,
}

/// 看板整页报表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub batch_id: String,
    pub today: NaiveDate,
    pub window: WindowKind,
    pub loaded_count: usize,
    pub filtered_count: usize,
    pub kpis: KpiSummary,
    pub closures: Vec<DailyCount>,
    pub plan_breakdown: Vec<PlanBreakdown>,
    pub latest_closed: Vec<ClosedEntry>,
    pub sector_rankings: Vec<SectorRanking>,
    pub lot_type_distribution: Vec<CategoryCount>,
    pub sector_distribution: Vec<CategoryCount>,
    pub lot_progress: Vec<LotProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportOutcome {
    Empty {
        batch_id: String,
        reason: EmptyReason,
    },
    Ready(Box<DashboardReport>),
}

impl ReportOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, ReportOutcome::Empty { .. })
    }

    pub fn report(&self) -> Option<&DashboardReport> {
        match self {
            ReportOutcome::Ready(report) => Some(&**report),
            ReportOutcome::Empty { .. } => None,
        }
    }
}

// ==========================================
// 会话状态
// ==========================================
struct DashboardSession {
    dataset: Arc<LoadedDataset>,
    today: NaiveDate,
    orders: Arc<Vec<ClassifiedOrder>>,
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi {
    repository: OrderRepository,
    classifier: StatusClassifier,
    config: EngineConfig,
    session: Mutex<Option<DashboardSession>>,
}

impl DashboardApi {
    /// 创建新的 DashboardApi 实例
    pub fn new(config: EngineConfig) -> Self {
        Self {
            repository: OrderRepository::new(&config.date_format),
            classifier: StatusClassifier::new(config.status_rule),
            config,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==========================================
    // 加载
    // ==========================================

    /// 读取文件并设为当前数据集
    ///
    /// # 错误
    /// - MissingColumns: 必需列缺失（当前数据集保持不变）
    /// - UnsupportedFileFormat / NotFound / ImportError: 文件层面失败
    #[instrument(skip(self, file_path))]
    pub fn load_file<P: AsRef<Path>>(&self, file_path: P, today: NaiveDate) -> ApiResult<LoadReport> {
        let dataset = self.repository.load_file(file_path)?;
        self.activate(dataset, today)
    }

    /// 以已解析的原始表作为当前数据集
    pub fn load_table(&self, table: &RawTable, today: NaiveDate) -> ApiResult<LoadReport> {
        let dataset = self.repository.load(table);
        self.activate(dataset, today)
    }

    /// 切换参考日期（重新分类当前数据集）
    pub fn set_today(&self, today: NaiveDate) -> ApiResult<()> {
        let mut session = self.lock_session()?;
        let current = session.as_mut().ok_or(ApiError::NoDataLoaded)?;
        if current.today != today {
            current.orders = Arc::new(self.classifier.classify_all(&current.dataset.orders, today));
            current.today = today;
            debug!(%today, "参考日期切换，已重新分类");
        }
        Ok(())
    }

    fn activate(&self, dataset: Arc<LoadedDataset>, today: NaiveDate) -> ApiResult<LoadReport> {
        if let LoadOutcome::MissingColumns { columns } = &dataset.outcome {
            return Err(ApiError::MissingColumns(columns.clone()));
        }

        let mut session = self.lock_session()?;
        let reuse = session
            .as_ref()
            .filter(|s| Arc::ptr_eq(&s.dataset, &dataset) && s.today == today)
            .map(|s| Arc::clone(&s.orders));

        let orders = match reuse {
            Some(orders) => {
                debug!(batch_id = %dataset.batch_id, "复用已分类数据");
                orders
            }
            None => Arc::new(self.classifier.classify_all(&dataset.orders, today)),
        };

        info!(
            batch_id = %dataset.batch_id,
            kept = dataset.summary.kept_rows,
            dropped = dataset.summary.dropped_rows,
            rule = %self.classifier.rule(),
            "数据集已激活"
        );

        let report = LoadReport {
            batch_id: dataset.batch_id.clone(),
            content_digest: dataset.content_digest.clone(),
            outcome: dataset.outcome.clone(),
            summary: dataset.summary,
            diagnostics: dataset.diagnostics.clone(),
            today,
        };
        *session = Some(DashboardSession {
            dataset,
            today,
            orders,
        });
        Ok(report)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 当前数据集
    pub fn dataset(&self) -> ApiResult<Arc<LoadedDataset>> {
        let session = self.lock_session()?;
        session
            .as_ref()
            .map(|s| Arc::clone(&s.dataset))
            .ok_or(ApiError::NoDataLoaded)
    }

    /// 当前参考日期
    pub fn today(&self) -> ApiResult<NaiveDate> {
        let session = self.lock_session()?;
        session.as_ref().map(|s| s.today).ok_or(ApiError::NoDataLoaded)
    }

    /// 全部已分类 OF（未筛选）
    pub fn classified(&self) -> ApiResult<Arc<Vec<ClassifiedOrder>>> {
        Ok(self.snapshot()?.2)
    }

    /// 筛选后的 OF
    pub fn orders(&self, selections: &Selections) -> ApiResult<Vec<ClassifiedOrder>> {
        let (_, _, orders) = self.snapshot()?;
        Ok(FilterEngine::filter(&orders, selections))
    }

    /// 各维度可选取值（基于全部数据）
    pub fn options(&self) -> ApiResult<FilterOptions> {
        let (_, _, orders) = self.snapshot()?;
        Ok(FilterEngine::options(&orders))
    }

    pub fn kpis(&self, selections: &Selections) -> ApiResult<KpiSummary> {
        let (_, today, orders) = self.snapshot()?;
        let filtered = FilterEngine::filter(&orders, selections);
        Ok(KpiCalculator::summarize(&filtered, today))
    }

    /// 逐日关闭数；window 缺省时取配置的默认窗口
    pub fn closures(
        &self,
        selections: &Selections,
        window: Option<WindowKind>,
    ) -> ApiResult<Vec<DailyCount>> {
        let (_, today, orders) = self.snapshot()?;
        let filtered = FilterEngine::filter(&orders, selections);
        Ok(Aggregator::closures_by_day(
            &filtered,
            window.unwrap_or(self.config.default_window),
            today,
        ))
    }

    pub fn plan_breakdown(&self, selections: &Selections) -> ApiResult<Vec<PlanBreakdown>> {
        let (_, _, orders) = self.snapshot()?;
        let filtered = FilterEngine::filter(&orders, selections);
        Ok(KpiCalculator::plan_breakdown(&filtered))
    }

    pub fn sector_rankings(
        &self,
        selections: &Selections,
        limit: Option<usize>,
    ) -> ApiResult<Vec<SectorRanking>> {
        let (_, _, orders) = self.snapshot()?;
        let filtered = FilterEngine::filter(&orders, selections);
        Ok(KpiCalculator::latest_closed_by_sector(
            &filtered,
            limit.unwrap_or(self.config.sector_ranking_limit),
        ))
    }

    pub fn latest_closed(
        &self,
        selections: &Selections,
        limit: Option<usize>,
    ) -> ApiResult<Vec<ClosedEntry>> {
        let (_, _, orders) = self.snapshot()?;
        let filtered = FilterEngine::filter(&orders, selections);
        Ok(KpiCalculator::latest_closed(
            &filtered,
            limit.unwrap_or(self.config.latest_closed_limit),
        ))
    }

    /// 整页报表
    ///
    /// 数据集为空或筛选后为空时返回 ReportOutcome::Empty，而不是错误。
    #[instrument(skip(self, selections))]
    pub fn report(
        &self,
        selections: &Selections,
        window: Option<WindowKind>,
    ) -> ApiResult<ReportOutcome> {
        let (dataset, today, orders) = self.snapshot()?;

        if orders.is_empty() {
            return Ok(ReportOutcome::Empty {
                batch_id: dataset.batch_id.clone(),
                reason: EmptyReason::NoRowsLoaded,
            });
        }

        let filtered = FilterEngine::filter(&orders, selections);
        if filtered.is_empty() {
            debug!(batch_id = %dataset.batch_id, "筛选结果为空");
            return Ok(ReportOutcome::Empty {
                batch_id: dataset.batch_id.clone(),
                reason: EmptyReason::NoRowsMatchFilter,
            });
        }

        let window = window.unwrap_or(self.config.default_window);
        let report = DashboardReport {
            batch_id: dataset.batch_id.clone(),
            today,
            window,
            loaded_count: orders.len(),
            filtered_count: filtered.len(),
            kpis: KpiCalculator::summarize(&filtered, today),
            closures: Aggregator::closures_by_day(&filtered, window, today),
            plan_breakdown: KpiCalculator::plan_breakdown(&filtered),
            latest_closed: KpiCalculator::latest_closed(&filtered, self.config.latest_closed_limit),
            sector_rankings: KpiCalculator::latest_closed_by_sector(
                &filtered,
                self.config.sector_ranking_limit,
            ),
            lot_type_distribution: KpiCalculator::distribution_by_lot_type(&filtered),
            sector_distribution: KpiCalculator::distribution_by_sector(&filtered),
            lot_progress: KpiCalculator::lot_progress(&filtered),
        };
        info!(
            batch_id = %report.batch_id,
            filtered = report.filtered_count,
            window = %window,
            "报表已生成"
        );
        Ok(ReportOutcome::Ready(Box::new(report)))
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn lock_session(&self) -> ApiResult<MutexGuard<'_, Option<DashboardSession>>> {
        self.session
            .lock()
            .map_err(|e| ApiError::InternalError(format!("会话锁获取失败: {}", e)))
    }

    /// 取出当前会话的只读快照后立即释放锁
    fn snapshot(&self) -> ApiResult<(Arc<LoadedDataset>, NaiveDate, Arc<Vec<ClassifiedOrder>>)> {
        let session = self.lock_session()?;
        let current = session.as_ref().ok_or(ApiError::NoDataLoaded)?;
        Ok((
            Arc::clone(&current.dataset),
            current.today,
            Arc::clone(&current.orders),
        ))
    }
}
