// ==========================================
// Controle PCP - OF 仓储（导入管道）
// ==========================================
// 流程: 列名映射 → 余量派生 → 必需列校验 → 单元格转换 → 行过滤
// 记忆化: 文件按字节摘要（解析前），原始表按内容摘要，同一输入不重复解析
// ==========================================

use crate::domain::ingest::{
    Diagnostic, DiagnosticKind, LoadOutcome, LoadSummary, LoadedDataset,
};
use crate::domain::order::ProductionOrder;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{columns, FieldMapper};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::order_importer_trait::DataCleaner as _;
use crate::importer::raw_table::{bytes_digest, RawTable};
use chrono::{NaiveDate, Utc};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 缺失时仅提示的列
const OPTIONAL_COLUMNS: &[&str] = &[
    columns::ORDER_ID,
    columns::START_DATE,
    columns::DELIVERY_DATE,
    columns::SECTOR_CODE,
];

/// 缺少 OF 号的行使用的标识
pub fn synthetic_order_id(row_number: usize) -> String {
    format!("row-{}", row_number)
}

// ==========================================
// OrderRepository
// ==========================================
pub struct OrderRepository {
    field_mapper: FieldMapper,
    data_cleaner: DataCleaner,
    file_parser: UniversalFileParser,
    last_load: Mutex<Option<Arc<LoadedDataset>>>,
    last_file: Mutex<Option<(String, Arc<LoadedDataset>)>>,
}

impl OrderRepository {
    /// 创建新的 OrderRepository
    ///
    /// # 参数
    /// - date_format: 日期列的唯一格式（如 "%d/%m/%Y"）
    pub fn new(date_format: &str) -> Self {
        Self {
            field_mapper: FieldMapper,
            data_cleaner: DataCleaner::new(date_format),
            file_parser: UniversalFileParser::new(date_format),
            last_load: Mutex::new(None),
            last_file: Mutex::new(None),
        }
    }

    /// 自定义解析链
    pub fn with_file_parser(date_format: &str, file_parser: UniversalFileParser) -> Self {
        Self {
            file_parser,
            ..Self::new(date_format)
        }
    }

    /// 读取文件并加载
    ///
    /// # 返回
    /// - Ok(LoadedDataset): 加载结果（可能为 EmptyInput / MissingColumns）
    /// - Err: 文件不存在、读取失败、所有格式解析器均失败
    #[instrument(skip(self, file_path))]
    pub fn load_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Arc<LoadedDataset>> {
        let path = file_path.as_ref();
        info!(file = %path.display(), "读取 OF 文件");
        let bytes = self.file_parser.read_file(path)?;
        let file_digest = bytes_digest(&bytes);

        if let Ok(guard) = self.last_file.lock() {
            if let Some((digest, cached)) = guard.as_ref() {
                if *digest == file_digest {
                    debug!(batch_id = %cached.batch_id, "文件内容未变，跳过解析");
                    return Ok(Arc::clone(cached));
                }
            }
        }

        let (table, parser) = self.file_parser.parse_bytes(&bytes)?;
        debug!(parser, "使用解析器");
        let dataset = self.load(&table);
        match self.last_file.lock() {
            Ok(mut guard) => *guard = Some((file_digest, Arc::clone(&dataset))),
            Err(e) => warn!(error = %e, "文件缓存锁获取失败，跳过缓存"),
        }
        Ok(dataset)
    }

    /// 加载原始表格
    ///
    /// 同一内容再次加载直接返回上次结果（同一个 Arc）。
    pub fn load(&self, table: &RawTable) -> Arc<LoadedDataset> {
        let digest = table.content_digest();

        if let Ok(guard) = self.last_load.lock() {
            if let Some(cached) = guard.as_ref() {
                if cached.content_digest == digest {
                    debug!(batch_id = %cached.batch_id, "命中加载缓存");
                    return Arc::clone(cached);
                }
            }
        }

        let dataset = Arc::new(self.ingest(table, digest));
        match self.last_load.lock() {
            Ok(mut guard) => *guard = Some(Arc::clone(&dataset)),
            Err(e) => warn!(error = %e, "加载缓存锁获取失败，跳过缓存"),
        }
        dataset
    }

    /// 加载原始表格，必需列缺失时返回错误
    pub fn load_strict(&self, table: &RawTable) -> ImportResult<Arc<LoadedDataset>> {
        let dataset = self.load(table);
        match &dataset.outcome {
            LoadOutcome::MissingColumns { columns } => {
                Err(ImportError::MissingColumn(columns.clone()))
            }
            _ => Ok(dataset),
        }
    }

    /// 清空加载缓存
    pub fn clear_cache(&self) {
        if let Ok(mut guard) = self.last_load.lock() {
            *guard = None;
        }
        if let Ok(mut guard) = self.last_file.lock() {
            *guard = None;
        }
    }

    // ==========================================
    // 导入主流程
    // ==========================================
    #[instrument(skip(self, raw, digest), fields(batch_id = tracing::field::Empty))]
    fn ingest(&self, raw: &RawTable, digest: String) -> LoadedDataset {
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(total_rows = raw.row_count(), "开始导入 OF 数据");

        let mut table = raw.clone();
        let mut diagnostics = Vec::new();

        // === 步骤 1: 列名映射 ===
        self.field_mapper.apply_aliases(&mut table);

        for column in OPTIONAL_COLUMNS {
            if !table.has_column(column) {
                warn!(column = *column, "可选列缺失");
                diagnostics.push(Diagnostic::table(
                    DiagnosticKind::MissingOptionalColumn,
                    Some(*column),
                    format!("列 '{}' 不存在", column),
                ));
            }
        }

        // === 步骤 2: 余量派生（仅当未提供余量列）===
        if !table.has_column(columns::BALANCE)
            && table.has_column(columns::PLANNED_QTY)
            && table.has_column(columns::PRODUCED_QTY)
        {
            let values = (0..table.row_count())
                .map(|row| {
                    self.derive_balance(&table, row)
                        .map(|b| b.to_string())
                        .unwrap_or_default()
                })
                .collect();
            table.push_column(columns::BALANCE, values);
            debug!("余量列由 计划 - 已产 派生");
        }

        // === 步骤 3: 必需列校验 ===
        let missing = self.field_mapper.missing_required(&table);
        if !missing.is_empty() {
            warn!(missing = ?missing, "必需列缺失，终止加载");
            diagnostics.push(Diagnostic::table(
                DiagnosticKind::MissingColumn,
                None,
                format!("必需列缺失: {}", missing.join(", ")),
            ));
            return LoadedDataset {
                batch_id,
                content_digest: digest,
                outcome: LoadOutcome::MissingColumns { columns: missing },
                summary: LoadSummary {
                    total_rows: raw.row_count(),
                    kept_rows: 0,
                    dropped_rows: 0,
                },
                orders: Vec::new(),
                diagnostics,
                loaded_at: Utc::now(),
            };
        }

        // === 步骤 4: 行转换与过滤 ===
        let mut orders = Vec::with_capacity(table.row_count());
        for row in 0..table.row_count() {
            if let Some(order) = self.map_row(&table, row, &mut diagnostics) {
                orders.push(order);
            }
        }

        let summary = LoadSummary {
            total_rows: table.row_count(),
            kept_rows: orders.len(),
            dropped_rows: table.row_count() - orders.len(),
        };
        info!(
            kept = summary.kept_rows,
            dropped = summary.dropped_rows,
            "OF 数据导入完成"
        );

        let outcome = if orders.is_empty() {
            diagnostics.push(Diagnostic::table(
                DiagnosticKind::EmptyInput,
                None,
                "没有任何行通过导入",
            ));
            LoadOutcome::EmptyInput
        } else {
            LoadOutcome::Loaded
        };

        LoadedDataset {
            batch_id,
            content_digest: digest,
            outcome,
            summary,
            orders,
            diagnostics,
            loaded_at: Utc::now(),
        }
    }

    /// 单行转换；返回 None 表示该行被剔除
    fn map_row(
        &self,
        table: &RawTable,
        row: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<ProductionOrder> {
        let row_number = row + 1;

        // ===== 日期 =====
        let start_date = self.date_cell(table, row, columns::START_DATE, diagnostics);
        let end_date = self.date_cell(table, row, columns::END_DATE, diagnostics);
        let delivery_date = self.date_cell(table, row, columns::DELIVERY_DATE, diagnostics);

        // 存在开始日期列时，缺失或无法解析开始日期的行被剔除
        if table.has_column(columns::START_DATE) && start_date.is_none() {
            return self.drop_row(
                row_number,
                columns::START_DATE,
                format!("行 {} 缺少有效的开始日期", row_number),
                diagnostics,
            );
        }

        // ===== 标识 =====
        // OF 号缺失（整列或单元格）时保留该行，以行号生成标识
        let order_id = match self.text_cell(table, row, columns::ORDER_ID) {
            Some(id) => id,
            None => {
                let synthetic = synthetic_order_id(row_number);
                diagnostics.push(Diagnostic::cell(
                    DiagnosticKind::SyntheticOrderId,
                    row_number,
                    columns::ORDER_ID,
                    format!("行 {} 缺少 OF 号，使用 {}", row_number, synthetic),
                ));
                synthetic
            }
        };

        let plan_id = match self.text_cell(table, row, columns::PLAN_ID) {
            Some(plan) => plan,
            None => {
                return self.drop_row(
                    row_number,
                    columns::PLAN_ID,
                    format!("OF {} 缺少计划代码", order_id),
                    diagnostics,
                )
            }
        };

        // ===== 数量 =====
        let planned_qty = self.quantity_cell(table, row, columns::PLANNED_QTY, diagnostics);
        let produced_qty = self.quantity_cell(table, row, columns::PRODUCED_QTY, diagnostics);

        let balance = match table.cell(row, columns::BALANCE) {
            Some(raw) => match self.data_cleaner.parse_integer(raw) {
                Some(b) if b < 0 => {
                    diagnostics.push(Diagnostic::cell(
                        DiagnosticKind::NegativeBalance,
                        row_number,
                        columns::BALANCE,
                        format!("OF {} 余量为负 ({})，按 0 处理", order_id, b),
                    ));
                    0
                }
                Some(b) => b as u64,
                None => {
                    diagnostics.push(Diagnostic::cell(
                        DiagnosticKind::InvalidNumber,
                        row_number,
                        columns::BALANCE,
                        format!("余量无法解析: {}", raw),
                    ));
                    return self.drop_row(
                        row_number,
                        columns::BALANCE,
                        format!("OF {} 余量无效", order_id),
                        diagnostics,
                    );
                }
            },
            None => match self.derive_balance(table, row) {
                Some(b) => b,
                None => {
                    return self.drop_row(
                        row_number,
                        columns::BALANCE,
                        format!("OF {} 缺少余量且无法派生", order_id),
                        diagnostics,
                    )
                }
            },
        };

        // ===== 工段 =====
        let sector_code = match table.cell(row, columns::SECTOR_CODE) {
            Some(raw) => {
                let parsed = self.data_cleaner.parse_integer(raw);
                if parsed.is_none() {
                    diagnostics.push(Diagnostic::cell(
                        DiagnosticKind::InvalidNumber,
                        row_number,
                        columns::SECTOR_CODE,
                        format!("工段代码无法解析: {}", raw),
                    ));
                }
                parsed
            }
            None => None,
        };

        Some(ProductionOrder {
            order_id,
            product: self.text_cell(table, row, columns::PRODUCT),
            description: self.text_cell(table, row, columns::DESCRIPTION),
            sector_code,
            planned_qty,
            produced_qty,
            balance,
            start_date,
            end_date,
            delivery_date,
            plan_id,
            row_number,
        })
    }

    /// 余量 = 计划 - 已产（已产超出计划时截断为 0）
    fn derive_balance(&self, table: &RawTable, row: usize) -> Option<u64> {
        let planned = table
            .cell(row, columns::PLANNED_QTY)
            .and_then(|v| self.data_cleaner.parse_quantity(v))?;
        let produced = table
            .cell(row, columns::PRODUCED_QTY)
            .and_then(|v| self.data_cleaner.parse_quantity(v))?;
        Some(planned.saturating_sub(produced))
    }

    fn text_cell(&self, table: &RawTable, row: usize, column: &str) -> Option<String> {
        self.data_cleaner.normalize_null(table.cell(row, column))
    }

    fn date_cell(
        &self,
        table: &RawTable,
        row: usize,
        column: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<NaiveDate> {
        let raw = table.cell(row, column)?;
        let parsed = self.data_cleaner.parse_date(raw);
        if parsed.is_none() {
            diagnostics.push(Diagnostic::cell(
                DiagnosticKind::DateParseFailure,
                row + 1,
                column,
                format!("日期无法解析 (期望 {}): {}", self.data_cleaner.date_format(), raw),
            ));
        }
        parsed
    }

    fn quantity_cell(
        &self,
        table: &RawTable,
        row: usize,
        column: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<u64> {
        let raw = table.cell(row, column)?;
        let parsed = self.data_cleaner.parse_quantity(raw);
        if parsed.is_none() {
            diagnostics.push(Diagnostic::cell(
                DiagnosticKind::InvalidNumber,
                row + 1,
                column,
                format!("数量无法解析: {}", raw),
            ));
        }
        parsed
    }

    fn drop_row(
        &self,
        row_number: usize,
        column: &str,
        message: String,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<ProductionOrder> {
        debug!(row_number, column, "剔除行");
        diagnostics.push(Diagnostic::cell(
            DiagnosticKind::RowDropped,
            row_number,
            column,
            message,
        ));
        None
    }
}
