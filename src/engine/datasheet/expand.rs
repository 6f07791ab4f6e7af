use super::DatasheetGenerator;
use crate::catalog::DatasheetBundle;
use crate::domain::datasheet::{DatasheetRow, FormulaIssue};
use crate::domain::rule::{FormulaAssignment, Validator};
use crate::domain::state::ConfigurationState;
use crate::domain::types::{FormulaCategory, FormulaCode};
use crate::engine::formula::{FormulaEvaluator, FormulaOutcome};
use std::collections::BTreeMap;

/// 公式引用解析: 数字为公式表 id, 其余视为内联表达式
fn resolve_formula<'a>(reference: &'a str, bundle: &'a DatasheetBundle) -> Option<&'a str> {
    match reference.parse::<i64>() {
        Ok(id) => bundle.formula_text(id),
        Err(_) => Some(reference),
    }
}

impl DatasheetGenerator {
    /// 公式展开
    ///
    /// # 规则
    /// - 无校验器或无件数满足的公式 → 原样一行
    /// - 否则每个公式分配克隆一行, 各类别独立求值
    pub(super) fn expand(
        &self,
        base: DatasheetRow,
        validator: Option<&Validator>,
        bundle: &DatasheetBundle,
        state: &ConfigurationState,
    ) -> Vec<DatasheetRow> {
        let Some(validator) = validator else {
            return vec![base];
        };

        let pieces = state.piece_count();
        let assignments: Vec<&FormulaAssignment> = validator
            .formulas
            .iter()
            .filter(|f| f.piece as usize <= pieces)
            .collect();
        if assignments.is_empty() {
            return vec![base];
        }

        let variables = state.formula_variables();
        assignments
            .into_iter()
            .map(|assignment| {
                let mut row = base.clone();
                row.validator_id = Some(validator.id);
                row.formula_id = Some(assignment.id);

                row.consumption = evaluate_category(
                    &mut row.issues,
                    &row.name,
                    FormulaCategory::Consumption,
                    assignment.consumption.as_deref(),
                    bundle,
                    &variables,
                );
                row.weight = evaluate_category(
                    &mut row.issues,
                    &row.name,
                    FormulaCategory::Weight,
                    assignment.weight.as_deref(),
                    bundle,
                    &variables,
                );
                row.technical = evaluate_category(
                    &mut row.issues,
                    &row.name,
                    FormulaCategory::Technical,
                    assignment.technical.as_deref(),
                    bundle,
                    &variables,
                );

                if row.has_issues() {
                    tracing::warn!(
                        commodity_id = row.commodity_id,
                        formula_id = assignment.id,
                        issues = row.issues.len(),
                        "公式求值失败"
                    );
                }
                row
            })
            .collect()
    }
}

/// 求值单个类别; 失败时追加 FormulaIssue 并返回 None
fn evaluate_category(
    issues: &mut Vec<FormulaIssue>,
    name: &str,
    category: FormulaCategory,
    reference: Option<&str>,
    bundle: &DatasheetBundle,
    variables: &BTreeMap<String, f64>,
) -> Option<f64> {
    let reference = reference?;
    let (formula, outcome) = match resolve_formula(reference, bundle) {
        Some(text) => (text.to_string(), FormulaEvaluator::evaluate(text, variables)),
        None => (
            reference.to_string(),
            FormulaOutcome::failure(
                FormulaCode::FormulaNotFound,
                format!("公式不存在: {}", reference),
            ),
        ),
    };

    if outcome.is_ok() {
        return outcome.result;
    }
    issues.push(FormulaIssue {
        category,
        code: outcome.code,
        title: format!("{} [{}]", name, category),
        message: outcome.message.unwrap_or_default(),
        formula,
        variables: outcome.variables,
    });
    None
}
