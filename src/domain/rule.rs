// ==========================================
// 产品配置引擎 - 规则组 / 规则 / 校验器
// ==========================================
// 线路格式: 各类别为逗号分隔 id 字符串 (class/comp/line/opt/print)
//           配对包含模式代码 (rClass/rComp/rLine/rOpt/rPrint/rVariable ∈ 1..4)
// 变量约束: "宽度>=100;高度<2000" 形式的比较表达式列表
// ==========================================

use crate::domain::measure::{MeasureBounds, MeasureRange};
use crate::domain::types::{IdList, RuleAction, RuleCategory, RuleOwnerKind};
use serde::{Deserialize, Deserializer, Serialize};

/// 单条规则
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rule {
    pub id: i64,
    /// 阻断: 不参与评估
    pub blocked: bool,

    #[serde(rename = "line")]
    pub lines: IdList,
    #[serde(rename = "rLine")]
    pub line_mode: i64,

    #[serde(rename = "print")]
    pub prints: IdList,
    #[serde(rename = "rPrint")]
    pub print_mode: i64,

    #[serde(rename = "comp")]
    pub compositions: IdList,
    #[serde(rename = "rComp")]
    pub composition_mode: i64,

    #[serde(rename = "opt")]
    pub optionals: IdList,
    #[serde(rename = "rOpt")]
    pub optional_mode: i64,

    #[serde(rename = "class")]
    pub classifications: IdList,
    #[serde(rename = "rClass")]
    pub classification_mode: i64,

    #[serde(rename = "variable", deserialize_with = "string_or_null")]
    pub variables: String,
    #[serde(rename = "rVariable")]
    pub variable_mode: i64,

    #[serde(rename = "minW")]
    pub min_w: f64,
    #[serde(rename = "maxW")]
    pub max_w: f64,
    #[serde(rename = "minH")]
    pub min_h: f64,
    #[serde(rename = "maxH")]
    pub max_h: f64,
    #[serde(rename = "minA")]
    pub min_a: f64,
    #[serde(rename = "maxA")]
    pub max_a: f64,
}

impl Rule {
    /// 变量约束表达式列表 (以 ';' 或 ',' 分隔)
    pub fn variable_expressions(&self) -> Vec<&str> {
        self.variables
            .split(&[';', ','][..])
            .map(str::trim)
            .filter(|expr| !expr.is_empty())
            .collect()
    }

    pub fn measure_bounds(&self) -> MeasureBounds {
        MeasureBounds {
            width: MeasureRange::new(self.min_w, self.max_w),
            height: MeasureRange::new(self.min_h, self.max_h),
            area: MeasureRange::new(self.min_a, self.max_a),
        }
    }

    /// 类别的声明 id 列表及模式代码 (变量与尺寸类别不适用)
    pub fn id_constraint(&self, category: RuleCategory) -> Option<(&IdList, i64)> {
        match category {
            RuleCategory::Line => Some((&self.lines, self.line_mode)),
            RuleCategory::Print => Some((&self.prints, self.print_mode)),
            RuleCategory::Composition => Some((&self.compositions, self.composition_mode)),
            RuleCategory::Optional => Some((&self.optionals, self.optional_mode)),
            RuleCategory::Classification => {
                Some((&self.classifications, self.classification_mode))
            }
            RuleCategory::Variable | RuleCategory::Measure => None,
        }
    }
}

/// 规则组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    pub id: i64,
    #[serde(default)]
    pub rules: Vec<Rule>,
    pub action: RuleAction,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub owner_kind: Option<RuleOwnerKind>,
    #[serde(default)]
    pub owner_id: Option<i64>,
}

impl RuleGroup {
    pub fn new(id: i64, action: RuleAction, rules: Vec<Rule>) -> Self {
        Self {
            id,
            rules,
            action,
            message: None,
            owner_kind: None,
            owner_id: None,
        }
    }
}

// ==========================================
// 校验器与公式
// ==========================================

/// 公式分配 (一行数据表对应一个分配)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaAssignment {
    pub id: i64,
    /// 最少件数要求
    pub piece: u32,
    #[serde(deserialize_with = "formula_ref")]
    pub consumption: Option<String>,
    #[serde(deserialize_with = "formula_ref")]
    pub weight: Option<String>,
    #[serde(deserialize_with = "formula_ref")]
    pub technical: Option<String>,
}

/// 校验器: 规则集合 + 候选公式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Validator {
    pub id: i64,
    pub title: String,
    #[serde(rename = "formula")]
    pub formulas: Vec<FormulaAssignment>,
    #[serde(rename = "rule")]
    pub rules: Vec<Rule>,
}

impl Validator {
    /// 以规则组形式参与规则引擎评估
    pub fn as_rule_group(&self) -> RuleGroup {
        let mut group = RuleGroup::new(self.id, RuleAction::Show, self.rules.clone());
        group.message = Some(self.title.clone());
        group
    }
}

/// 公式表条目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulaEntry {
    #[serde(default)]
    pub formula: String,
}

/// 名称表条目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameEntry {
    #[serde(default)]
    pub name: String,
}

/// null 视为空字符串
fn string_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// 公式引用: 接受字符串或数字, 空字符串/0 视为未引用
fn formula_ref<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) if n.as_i64() != Some(0) => Some(n.to_string()),
        _ => None,
    })
}
