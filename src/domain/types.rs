// ==========================================
// Controle PCP - 领域类型定义
// ==========================================
// 职责: OF 派生字段与引擎选项的枚举类型
// 红线: 派生字段只由状态分类器写入
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// OF 状态 (Order Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Open,   // 未关闭（aberta）
    Closed, // 已关闭（fechada）
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "OPEN"),
            OrderStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

impl OrderStatus {
    /// 解析状态（接受英文编码与原始葡语标签）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" | "ABERTA" => Some(OrderStatus::Open),
            "CLOSED" | "FECHADA" => Some(OrderStatus::Closed),
            _ => None,
        }
    }

    pub fn all() -> [OrderStatus; 2] {
        [OrderStatus::Open, OrderStatus::Closed]
    }
}

// ==========================================
// 时效 (Situation)
// ==========================================
// 参考日期严格早于 today → Overdue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Situation {
    Overdue,  // 逾期（atrasada）
    Upcoming, // 未到期（futura）
}

impl fmt::Display for Situation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Situation::Overdue => write!(f, "OVERDUE"),
            Situation::Upcoming => write!(f, "UPCOMING"),
        }
    }
}

impl Situation {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OVERDUE" | "ATRASADA" => Some(Situation::Overdue),
            "UPCOMING" | "FUTURA" => Some(Situation::Upcoming),
            _ => None,
        }
    }
}

// ==========================================
// 工段 (Sector)
// ==========================================
// 固定映射: 1→装配, 2→焊接, 3→冲压/机加工, 其他→Unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "Assembly")]
    Assembly, // Montagem
    #[serde(rename = "Welding")]
    Welding, // Solda
    #[serde(rename = "Stamping/Machining")]
    StampingMachining, // Estamparia / Usinagem
    #[serde(rename = "unknown")]
    Unknown,
}

impl Sector {
    /// 从工段代码映射（表外代码不报错，返回 Unknown）
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => Sector::Assembly,
            Some(2) => Sector::Welding,
            Some(3) => Sector::StampingMachining,
            _ => Sector::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Sector::Assembly => "Assembly",
            Sector::Welding => "Welding",
            Sector::StampingMachining => "Stamping/Machining",
            Sector::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ==========================================
// 批次类型 (Lot Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotType {
    Order,    // 订单批次（Pedido）: plan_id 为 "25" 开头的 5 位
    Parallel, // 平行批次（Paralelo）
}

impl fmt::Display for LotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotType::Order => write!(f, "ORDER"),
            LotType::Parallel => write!(f, "PARALLEL"),
        }
    }
}

impl LotType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ORDER" | "PEDIDO" => Some(LotType::Order),
            "PARALLEL" | "PARALELO" => Some(LotType::Parallel),
            _ => None,
        }
    }
}

// ==========================================
// 聚合窗口 (Window Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowKind {
    Weekly,
    Monthly,
    Yearly,
}

impl WindowKind {
    /// 回溯天数（窗口包含两端，共 days + 1 天）
    pub fn days(&self) -> i64 {
        match self {
            WindowKind::Weekly => 7,
            WindowKind::Monthly => 30,
            WindowKind::Yearly => 365,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "WEEKLY" | "SEMANAL" => Some(WindowKind::Weekly),
            "MONTHLY" | "MENSAL" => Some(WindowKind::Monthly),
            "YEARLY" | "ANUAL" => Some(WindowKind::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowKind::Weekly => write!(f, "WEEKLY"),
            WindowKind::Monthly => write!(f, "MONTHLY"),
            WindowKind::Yearly => write!(f, "YEARLY"),
        }
    }
}

// ==========================================
// 状态判定口径 (Status Rule)
// ==========================================
// Balance: saldo == 0 → Closed（默认口径）
// EndDate: 存在结束日期 → Closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusRule {
    #[default]
    Balance,
    EndDate,
}

impl StatusRule {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BALANCE" => Some(StatusRule::Balance),
            "END_DATE" => Some(StatusRule::EndDate),
            _ => None,
        }
    }
}

impl fmt::Display for StatusRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusRule::Balance => write!(f, "BALANCE"),
            StatusRule::EndDate => write!(f, "END_DATE"),
        }
    }
}

// ==========================================
// 计划看板标志方案 (Board Schema)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardSchema {
    /// 五个环节: 排产 / NEC 计算 / 生成 SOC / SOC 邮件 / 生成 OF
    #[default]
    Pipeline,
    /// 仅排产与生成 OF
    Minimal,
}

impl BoardSchema {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PIPELINE" => Some(BoardSchema::Pipeline),
            "MINIMAL" => Some(BoardSchema::Minimal),
            _ => None,
        }
    }
}

impl fmt::Display for BoardSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardSchema::Pipeline => write!(f, "PIPELINE"),
            BoardSchema::Minimal => write!(f, "MINIMAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_from_code() {
        assert_eq!(Sector::from_code(Some(1)), Sector::Assembly);
        assert_eq!(Sector::from_code(Some(2)), Sector::Welding);
        assert_eq!(Sector::from_code(Some(3)), Sector::StampingMachining);
        assert_eq!(Sector::from_code(Some(9)), Sector::Unknown);
        assert_eq!(Sector::from_code(None), Sector::Unknown);
        assert_eq!(Sector::Unknown.name(), "unknown");
    }

    #[test]
    fn test_window_days() {
        assert_eq!(WindowKind::Weekly.days(), 7);
        assert_eq!(WindowKind::Monthly.days(), 30);
        assert_eq!(WindowKind::Yearly.days(), 365);
        assert_eq!(WindowKind::parse("mensal"), Some(WindowKind::Monthly));
    }

    #[test]
    fn test_parse_portuguese_labels() {
        assert_eq!(OrderStatus::parse("fechada"), Some(OrderStatus::Closed));
        assert_eq!(Situation::parse("atrasada"), Some(Situation::Overdue));
        assert_eq!(LotType::parse("Paralelo"), Some(LotType::Parallel));
        assert_eq!(LotType::parse("lote"), None);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&OrderStatus::Closed).unwrap();
        assert_eq!(json, "\"CLOSED\"");
        assert_eq!(StatusRule::default(), StatusRule::Balance);
    }
}
