// ==========================================
// Controle PCP - 计划看板领域模型
// ==========================================
// 用途: Programação 看板上的批次行
// 生命周期: 仅在会话内存活，由用户追加、按标志切换
// ==========================================

use crate::domain::types::BoardSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// StageFlag - 看板环节标志
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageFlag {
    Schedule,       // Programar
    NecCalculation, // Cálculo NEC
    GenerateSoc,    // Gerar SOC
    EmailSoc,       // E-mail SOC
    GenerateOf,     // Gerar OF
}

impl StageFlag {
    pub fn name(&self) -> &'static str {
        match self {
            StageFlag::Schedule => "schedule",
            StageFlag::NecCalculation => "nec_calculation",
            StageFlag::GenerateSoc => "generate_soc",
            StageFlag::EmailSoc => "email_soc",
            StageFlag::GenerateOf => "generate_of",
        }
    }

    /// 看板上显示的原始标签
    pub fn label(&self) -> &'static str {
        match self {
            StageFlag::Schedule => "Programar",
            StageFlag::NecCalculation => "Cálculo NEC",
            StageFlag::GenerateSoc => "Gerar SOC",
            StageFlag::EmailSoc => "E-mail SOC",
            StageFlag::GenerateOf => "Gerar OF",
        }
    }

    /// 按规范名或原始标签解析（忽略大小写）
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|flag| flag.name() == wanted || flag.label().to_lowercase() == wanted)
    }

    pub fn all() -> [StageFlag; 5] {
        [
            StageFlag::Schedule,
            StageFlag::NecCalculation,
            StageFlag::GenerateSoc,
            StageFlag::EmailSoc,
            StageFlag::GenerateOf,
        ]
    }
}

impl fmt::Display for StageFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl BoardSchema {
    /// 方案包含的标志（按看板列顺序）
    pub fn flags(&self) -> &'static [StageFlag] {
        match self {
            BoardSchema::Pipeline => &[
                StageFlag::Schedule,
                StageFlag::NecCalculation,
                StageFlag::GenerateSoc,
                StageFlag::EmailSoc,
                StageFlag::GenerateOf,
            ],
            BoardSchema::Minimal => &[StageFlag::Schedule, StageFlag::GenerateOf],
        }
    }

    pub fn contains(&self, flag: StageFlag) -> bool {
        self.flags().contains(&flag)
    }
}

// ==========================================
// Lot - 看板批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub lot_id: String,
    pub description: String,
    pub color_tag: String,
    pub flags: BTreeMap<StageFlag, bool>,
}

impl Lot {
    pub fn flag(&self, flag: StageFlag) -> Option<bool> {
        self.flags.get(&flag).copied()
    }
}

// ==========================================
// NewLot - 追加请求
// ==========================================
// 未给出的标志按方案默认值补齐（排产、生成 OF 默认开启）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLot {
    pub lot_id: String,
    pub description: String,
    pub color_tag: String,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl NewLot {
    pub fn new(lot_id: &str, description: &str, color_tag: &str) -> Self {
        Self {
            lot_id: lot_id.to_string(),
            description: description.to_string(),
            color_tag: color_tag.to_string(),
            flags: BTreeMap::new(),
        }
    }

    pub fn with_flag(mut self, flag_name: &str, value: bool) -> Self {
        self.flags.insert(flag_name.to_string(), value);
        self
    }
}

/// 表单默认值
pub fn default_flag_value(flag: StageFlag) -> bool {
    matches!(flag, StageFlag::Schedule | StageFlag::GenerateOf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_flag_parse() {
        assert_eq!(StageFlag::parse("schedule"), Some(StageFlag::Schedule));
        assert_eq!(StageFlag::parse("Programar"), Some(StageFlag::Schedule));
        assert_eq!(StageFlag::parse("cálculo nec"), Some(StageFlag::NecCalculation));
        assert_eq!(StageFlag::parse("E-mail SOC"), Some(StageFlag::EmailSoc));
        assert_eq!(StageFlag::parse("deploy"), None);
    }

    #[test]
    fn test_schema_flags() {
        assert_eq!(BoardSchema::Pipeline.flags().len(), 5);
        assert!(BoardSchema::Minimal.contains(StageFlag::GenerateOf));
        assert!(!BoardSchema::Minimal.contains(StageFlag::EmailSoc));
    }
}
