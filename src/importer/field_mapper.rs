// ==========================================
// Controle PCP - 列名映射
// ==========================================
// 职责: 别名表头 → 规范列名（静态别名表，导入时查询一次）
// 规则: 仅当规范列名不存在时才重命名
// ==========================================

use crate::importer::raw_table::RawTable;
use tracing::debug;

/// 规范列名
pub mod columns {
    pub const ORDER_ID: &str = "order_id";
    pub const PRODUCT: &str = "product";
    pub const DESCRIPTION: &str = "description";
    pub const SECTOR_CODE: &str = "sector_code";
    pub const PLANNED_QTY: &str = "planned_qty";
    pub const PRODUCED_QTY: &str = "produced_qty";
    pub const BALANCE: &str = "balance";
    pub const START_DATE: &str = "start_date";
    pub const END_DATE: &str = "end_date";
    pub const PLAN_ID: &str = "plan_id";
    pub const DELIVERY_DATE: &str = "delivery_date";

    /// 缺失时终止加载的列（别名映射与余量派生之后校验）
    pub const REQUIRED: &[&str] = &[END_DATE, BALANCE, PLAN_ID];
}

/// 别名表: (规范列名, 可接受的表头写法)，同一规范列按顺序取第一个存在的别名
pub const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    (columns::ORDER_ID, &["ORDEM_F", "Ordem F", "ORDEM F", "OF"]),
    (columns::PRODUCT, &["PRODUTO", "Produto"]),
    (columns::DESCRIPTION, &["DESCRIÇÃO", "Descrição", "DESCRICAO", "Descricao"]),
    (columns::SECTOR_CODE, &["SUB-G", "Sub-g", "SUB_G"]),
    (columns::PLANNED_QTY, &["PROGRAMADO", "Programado"]),
    (columns::PRODUCED_QTY, &["PRODUZIDO", "Produzido"]),
    (columns::BALANCE, &["SALDO", "Saldo"]),
    (columns::START_DATE, &["INICIO", "Inicio", "INÍCIO", "Início"]),
    (columns::END_DATE, &["FINAL", "Final"]),
    (columns::PLAN_ID, &["PLANO", "Plano"]),
    (columns::DELIVERY_DATE, &["ENTREGA", "Entrega"]),
];

pub struct FieldMapper;

impl FieldMapper {
    /// 对表头应用别名表
    ///
    /// # 返回
    /// - 实际发生的重命名 (别名, 规范列名)
    pub fn apply_aliases(&self, table: &mut RawTable) -> Vec<(String, String)> {
        let mut renamed = Vec::new();
        for (canonical, aliases) in COLUMN_ALIASES {
            if table.has_column(canonical) {
                continue;
            }
            if let Some(alias) = aliases.iter().find(|a| table.has_column(a)) {
                table.rename_column(alias, canonical);
                debug!(alias = *alias, canonical = *canonical, "列名映射");
                renamed.push((alias.to_string(), canonical.to_string()));
            }
        }
        renamed
    }

    /// 别名映射后仍缺失的必需列
    pub fn missing_required(&self, table: &RawTable) -> Vec<String> {
        columns::REQUIRED
            .iter()
            .filter(|c| !table.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }
}
