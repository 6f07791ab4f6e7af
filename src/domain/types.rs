// ==========================================
// 产品配置引擎 - 领域类型定义
// ==========================================
// 职责: 规则包含模式、规则动作、比较运算符、公式结果代码等封闭枚举
// 红线: 未知代码必须显式报错,不得静默回退
// ==========================================

use crate::error::{EngineError, EngineResult};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ==========================================
// 包含模式 (Containment Mode)
// ==========================================
// 线路代码: 1=CONTAIN_ONE 2=DONT_CONTAIN_ONE 3=CONTAIN_ALL 4=DONT_CONTAIN_ALL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainmentMode {
    ContainOne,     // 至少一个规则 id 存在
    DontContainOne, // 至少一个规则 id 不存在
    ContainAll,     // 全部规则 id 存在
    DontContainAll, // 全部规则 id 不存在
}

impl ContainmentMode {
    /// 从线路代码解析包含模式
    ///
    /// # 错误
    /// - 代码不在 1..=4 → EngineError::UnknownContainmentMode
    pub fn from_code(code: i64) -> EngineResult<Self> {
        match code {
            1 => Ok(ContainmentMode::ContainOne),
            2 => Ok(ContainmentMode::DontContainOne),
            3 => Ok(ContainmentMode::ContainAll),
            4 => Ok(ContainmentMode::DontContainAll),
            _ => Err(EngineError::UnknownContainmentMode { code }),
        }
    }

    /// 转换为线路代码
    pub fn code(&self) -> i64 {
        match self {
            ContainmentMode::ContainOne => 1,
            ContainmentMode::DontContainOne => 2,
            ContainmentMode::ContainAll => 3,
            ContainmentMode::DontContainAll => 4,
        }
    }
}

impl fmt::Display for ContainmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainmentMode::ContainOne => write!(f, "CONTAIN_ONE"),
            ContainmentMode::DontContainOne => write!(f, "DONT_CONTAIN_ONE"),
            ContainmentMode::ContainAll => write!(f, "CONTAIN_ALL"),
            ContainmentMode::DontContainAll => write!(f, "DONT_CONTAIN_ALL"),
        }
    }
}

// ==========================================
// 规则组动作 (Rule Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    Show, // 命中即显示
    Hide, // 命中即隐藏
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Show => write!(f, "SHOW"),
            RuleAction::Hide => write!(f, "HIDE"),
        }
    }
}

// ==========================================
// 规则约束类别 (Rule Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    Line,
    Print,
    Composition,
    Optional,
    Classification,
    Variable,
    Measure,
}

impl RuleCategory {
    /// 评估顺序
    pub const ALL: [RuleCategory; 7] = [
        RuleCategory::Line,
        RuleCategory::Print,
        RuleCategory::Composition,
        RuleCategory::Optional,
        RuleCategory::Classification,
        RuleCategory::Variable,
        RuleCategory::Measure,
    ];
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCategory::Line => write!(f, "LINE"),
            RuleCategory::Print => write!(f, "PRINT"),
            RuleCategory::Composition => write!(f, "COMPOSITION"),
            RuleCategory::Optional => write!(f, "OPTIONAL"),
            RuleCategory::Classification => write!(f, "CLASSIFICATION"),
            RuleCategory::Variable => write!(f, "VARIABLE"),
            RuleCategory::Measure => write!(f, "MEASURE"),
        }
    }
}

// ==========================================
// 比较运算符 (Comparison Operator)
// ==========================================
// 变量约束只允许这六种运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    NotEqual,       // !=
    LessOrEqual,    // <=
    GreaterOrEqual, // >=
    StrictEqual,    // ===
    Greater,        // >
    Less,           // <
}

impl ComparisonOperator {
    /// 解析顺序: 长运算符优先,避免 ">=" 被拆成 ">"
    pub const PARSE_ORDER: [ComparisonOperator; 6] = [
        ComparisonOperator::StrictEqual,
        ComparisonOperator::NotEqual,
        ComparisonOperator::LessOrEqual,
        ComparisonOperator::GreaterOrEqual,
        ComparisonOperator::Greater,
        ComparisonOperator::Less,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::LessOrEqual => "<=",
            ComparisonOperator::GreaterOrEqual => ">=",
            ComparisonOperator::StrictEqual => "===",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::Less => "<",
        }
    }

    /// 对两个数值应用比较
    pub fn apply(&self, left: f64, right: f64) -> bool {
        match self {
            ComparisonOperator::NotEqual => left != right,
            ComparisonOperator::LessOrEqual => left <= right,
            ComparisonOperator::GreaterOrEqual => left >= right,
            ComparisonOperator::StrictEqual => left == right,
            ComparisonOperator::Greater => left > right,
            ComparisonOperator::Less => left < right,
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ==========================================
// 规则组归属 (Rule Owner Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleOwnerKind {
    Composition,
    Optional,
}

impl fmt::Display for RuleOwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOwnerKind::Composition => write!(f, "COMPOSITION"),
            RuleOwnerKind::Optional => write!(f, "OPTIONAL"),
        }
    }
}

// ==========================================
// 投入品层级 (Commodity Level)
// ==========================================
// Composition: 直接挂在可选项下
// Commodity: 挂在组合(颜色)下,需两跳回溯
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommodityLevel {
    Composition,
    #[default]
    Commodity,
}

// ==========================================
// 公式结果代码 (Formula Code)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormulaCode {
    Ok,
    EmptyFormula,
    ParseError,
    UnknownVariable,
    UnknownFunction,
    ArityMismatch,
    DivisionByZero,
    NonFinite,
    FormulaNotFound,
}

impl FormulaCode {
    pub fn is_ok(&self) -> bool {
        matches!(self, FormulaCode::Ok)
    }
}

impl fmt::Display for FormulaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaCode::Ok => write!(f, "OK"),
            FormulaCode::EmptyFormula => write!(f, "EMPTY_FORMULA"),
            FormulaCode::ParseError => write!(f, "PARSE_ERROR"),
            FormulaCode::UnknownVariable => write!(f, "UNKNOWN_VARIABLE"),
            FormulaCode::UnknownFunction => write!(f, "UNKNOWN_FUNCTION"),
            FormulaCode::ArityMismatch => write!(f, "ARITY_MISMATCH"),
            FormulaCode::DivisionByZero => write!(f, "DIVISION_BY_ZERO"),
            FormulaCode::NonFinite => write!(f, "NON_FINITE"),
            FormulaCode::FormulaNotFound => write!(f, "FORMULA_NOT_FOUND"),
        }
    }
}

// ==========================================
// 公式类别 (Formula Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormulaCategory {
    Consumption, // 消耗量
    Weight,      // 重量
    Technical,   // 技术参数
}

impl fmt::Display for FormulaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaCategory::Consumption => write!(f, "CONSUMPTION"),
            FormulaCategory::Weight => write!(f, "WEIGHT"),
            FormulaCategory::Technical => write!(f, "TECHNICAL"),
        }
    }
}

// ==========================================
// 逗号分隔 id 列表 (IdList)
// ==========================================
// 线路格式: "1,2,3" / 数字 / 数组 / null
// 空列表 = 不限制
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdList(pub Vec<i64>);

impl IdList {
    pub fn new(ids: Vec<i64>) -> Self {
        Self(ids)
    }

    /// 解析逗号分隔字符串,忽略空白与非数字片段
    pub fn parse(raw: &str) -> Self {
        let ids = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| match token.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!(token, "IdList: 跳过非数字 id");
                    None
                }
            })
            .collect();
        Self(ids)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn ids(&self) -> &[i64] {
        &self.0
    }
}

impl From<Vec<i64>> for IdList {
    fn from(ids: Vec<i64>) -> Self {
        Self(ids)
    }
}

impl fmt::Display for IdList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

impl Serialize for IdList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for IdList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdListVisitor;

        impl<'de> Visitor<'de> for IdListVisitor {
            type Value = IdList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("逗号分隔的 id 字符串、数字或数字数组")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<IdList, E> {
                Ok(IdList::parse(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<IdList, E> {
                Ok(IdList(vec![v]))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<IdList, E> {
                i64::try_from(v)
                    .map(|id| IdList(vec![id]))
                    .map_err(|_| E::custom(format!("id 超出范围: {}", v)))
            }

            fn visit_unit<E: de::Error>(self) -> Result<IdList, E> {
                Ok(IdList::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<IdList, E> {
                Ok(IdList::default())
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<IdList, D::Error> {
                d.deserialize_any(IdListVisitor)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<IdList, A::Error> {
                let mut ids = Vec::new();
                while let Some(id) = seq.next_element::<i64>()? {
                    ids.push(id);
                }
                Ok(IdList(ids))
            }
        }

        deserializer.deserialize_any(IdListVisitor)
    }
}
