// ==========================================
// Controle PCP - 导入诊断与加载结果
// ==========================================
// 用途: 导入管道输出（OF 列表 + 诊断信息）
// 生命周期: 每次加载整体替换，不与历史加载合并
// ==========================================

use crate::domain::order::ProductionOrder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// DiagnosticKind - 诊断类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    MissingColumn,         // 必需列缺失（终止本次加载）
    MissingOptionalColumn, // 可选列缺失（仅提示）
    DateParseFailure,      // 单元格日期无法解析（按缺失处理）
    InvalidNumber,         // 单元格数值无法解析
    NegativeBalance,       // 余量为负（截断为 0）
    SyntheticOrderId,      // OF 号缺失，按行号生成
    RowDropped,            // 行被质量门剔除
    EmptyInput,            // 没有任何行通过导入
}

// ==========================================
// Diagnostic - 诊断记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub row_number: Option<usize>, // 数据行号（表级诊断为 None）
    pub column: Option<String>,    // 规范列名
    pub message: String,
}

impl Diagnostic {
    pub fn table(kind: DiagnosticKind, column: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            row_number: None,
            column: column.map(str::to_string),
            message: message.into(),
        }
    }

    pub fn cell(
        kind: DiagnosticKind,
        row_number: usize,
        column: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            row_number: Some(row_number),
            column: Some(column.to_string()),
            message: message.into(),
        }
    }
}

// ==========================================
// LoadOutcome - 加载结论
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadOutcome {
    Loaded,
    EmptyInput,
    MissingColumns { columns: Vec<String> },
}

// ==========================================
// LoadSummary - 行数统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
}

// ==========================================
// LoadedDataset - 一次加载的完整结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedDataset {
    pub batch_id: String,       // 批次 ID（UUID）
    pub content_digest: String, // 原始表内容摘要（SHA-256）
    pub outcome: LoadOutcome,
    pub summary: LoadSummary,
    pub orders: Vec<ProductionOrder>,
    pub diagnostics: Vec<Diagnostic>,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedDataset {
    pub fn is_loaded(&self) -> bool {
        matches!(self.outcome, LoadOutcome::Loaded)
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}
