// ==========================================
// 产品配置引擎 - 变量比较表达式
// ==========================================
// 文法: operand op operand
//       op ∈ { !=, <=, >=, ===, >, < }
//       operand = 数字字面量 | 标识符
// 红线: 封闭文法,不执行任意代码
// ==========================================

use crate::domain::types::ComparisonOperator;
use std::collections::BTreeMap;

/// 比较操作数
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Variable(String),
}

impl Operand {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(value) = raw.parse::<f64>() {
            return Some(Operand::Number(value));
        }
        let mut chars = raw.chars();
        let first = chars.next()?;
        let valid_start = first.is_alphabetic() || first == '_';
        let valid_rest = chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.');
        if valid_start && valid_rest {
            Some(Operand::Variable(raw.to_string()))
        } else {
            None
        }
    }

    fn resolve(&self, variables: &BTreeMap<String, f64>) -> Option<f64> {
        match self {
            Operand::Number(value) => Some(*value),
            Operand::Variable(name) => variables.get(name).copied(),
        }
    }
}

/// 单个比较表达式
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: Operand,
    pub operator: ComparisonOperator,
    pub right: Operand,
}

impl Comparison {
    /// 解析比较表达式, 不符合文法返回 None
    pub fn parse(expr: &str) -> Option<Self> {
        for (index, _) in expr.char_indices() {
            let rest = &expr[index..];
            let matched = ComparisonOperator::PARSE_ORDER
                .iter()
                .find(|op| rest.starts_with(op.symbol()));
            if let Some(operator) = matched {
                let left = Operand::parse(&expr[..index])?;
                let right = Operand::parse(&rest[operator.symbol().len()..])?;
                return Some(Self {
                    left,
                    operator: *operator,
                    right,
                });
            }
        }
        None
    }

    /// 求值; 任一标识符未绑定时返回 None
    pub fn evaluate(&self, variables: &BTreeMap<String, f64>) -> Option<bool> {
        let left = self.left.resolve(variables)?;
        let right = self.right.resolve(variables)?;
        Some(self.operator.apply(left, right))
    }
}

/// 表达式是否满足 (解析失败或未绑定一律视为不满足)
pub fn is_satisfied(expr: &str, variables: &BTreeMap<String, f64>) -> bool {
    match Comparison::parse(expr) {
        Some(comparison) => comparison.evaluate(variables).unwrap_or(false),
        None => {
            tracing::warn!(expr, "变量约束表达式无法解析, 视为不满足");
            false
        }
    }
}
