// ==========================================
// 产品配置引擎 - 规则组评估引擎
// ==========================================
// 职责: 按七个约束类别评估规则, 按 AND 聚合为规则组结果
// 输入: 规则组 + 配置状态
// 输出: RuleGroupResult (含逐规则、逐类别诊断) 或快速布尔结果
// ==========================================
// 红线: 完整路径与快速路径共用同一评估器,只以 short_circuit 区分
// 红线: 声明为空的类别恒真且标记为"未声明"
// ==========================================

use crate::domain::rule::{Rule, RuleGroup};
use crate::domain::state::ConfigurationState;
use crate::domain::types::{ContainmentMode, RuleAction, RuleCategory};
use crate::engine::comparator;
use crate::engine::containment::ContainmentCore;
use crate::error::EngineResult;
use serde::Serialize;

/// 单个类别的评估结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResult {
    pub category: RuleCategory,
    /// 规则是否声明了该类别
    pub present: bool,
    pub is_valid: bool,
}

/// 单条规则的评估结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    pub rule_id: i64,
    pub blocked: bool,
    pub is_valid: bool,
    pub categories: Vec<CategoryResult>,
}

/// 规则组评估结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleGroupResult {
    pub group_id: i64,
    pub is_valid: bool,
    pub action: RuleAction,
    pub message: Option<String>,
    pub rules: Vec<RuleResult>,
}

// ==========================================
// RuleEngine - 规则组评估引擎
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    // 无状态引擎,不需要注入依赖
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 公开接口
    // ==========================================

    /// 评估一批规则组 (完整路径, 记录诊断)
    pub fn evaluate_groups(
        &self,
        groups: &[RuleGroup],
        state: &ConfigurationState,
    ) -> EngineResult<Vec<RuleGroupResult>> {
        groups
            .iter()
            .map(|group| self.evaluate_group(group, state))
            .collect()
    }

    /// 评估单个规则组 (完整路径)
    pub fn evaluate_group(
        &self,
        group: &RuleGroup,
        state: &ConfigurationState,
    ) -> EngineResult<RuleGroupResult> {
        let mut rules = Vec::with_capacity(group.rules.len());
        for rule in &group.rules {
            rules.push(self.evaluate_rule(rule, state, false)?);
        }
        let is_valid = rules.iter().filter(|r| !r.blocked).all(|r| r.is_valid);

        tracing::debug!(
            group_id = group.id,
            is_valid,
            action = %group.action,
            "规则组评估完成"
        );

        Ok(RuleGroupResult {
            group_id: group.id,
            is_valid,
            action: group.action,
            message: group.message.clone(),
            rules,
        })
    }

    /// 快速路径: 首个失败规则/类别即返回, 不记录诊断
    pub fn evaluate_group_fast(
        &self,
        group: &RuleGroup,
        state: &ConfigurationState,
    ) -> EngineResult<bool> {
        // 先校验全部模式代码, 与完整路径的报错保持一致
        for rule in group.rules.iter().filter(|r| !r.blocked) {
            Self::check_modes(rule)?;
        }
        for rule in group.rules.iter().filter(|r| !r.blocked) {
            if !self.evaluate_rule(rule, state, true)?.is_valid {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ==========================================
    // 内部评估
    // ==========================================

    /// 评估单条规则
    ///
    /// short_circuit=true 时遇到首个失败类别即停止
    fn evaluate_rule(
        &self,
        rule: &Rule,
        state: &ConfigurationState,
        short_circuit: bool,
    ) -> EngineResult<RuleResult> {
        if rule.blocked {
            return Ok(RuleResult {
                rule_id: rule.id,
                blocked: true,
                is_valid: true,
                categories: Vec::new(),
            });
        }

        let mut categories = Vec::with_capacity(RuleCategory::ALL.len());
        let mut is_valid = true;
        for category in RuleCategory::ALL {
            let result = self.evaluate_category(rule, category, state)?;
            is_valid &= result.is_valid;
            let failed = !result.is_valid;
            if !short_circuit {
                categories.push(result);
            }
            if failed && short_circuit {
                break;
            }
        }

        Ok(RuleResult {
            rule_id: rule.id,
            blocked: false,
            is_valid,
            categories,
        })
    }

    /// 已声明类别的包含模式代码必须可识别
    fn check_modes(rule: &Rule) -> EngineResult<()> {
        for category in RuleCategory::ALL {
            match category {
                RuleCategory::Measure => {}
                RuleCategory::Variable => {
                    if !rule.variable_expressions().is_empty() {
                        ContainmentMode::from_code(rule.variable_mode)?;
                    }
                }
                id_category => {
                    if let Some((declared, code)) = rule.id_constraint(id_category) {
                        if !declared.is_empty() {
                            ContainmentMode::from_code(code)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate_category(
        &self,
        rule: &Rule,
        category: RuleCategory,
        state: &ConfigurationState,
    ) -> EngineResult<CategoryResult> {
        let (present, is_valid) = match category {
            RuleCategory::Variable => {
                let expressions = rule.variable_expressions();
                if expressions.is_empty() {
                    (false, true)
                } else {
                    let mode = ContainmentMode::from_code(rule.variable_mode)?;
                    let satisfied = ContainmentCore::evaluate_by(mode, &expressions, |expr| {
                        comparator::is_satisfied(expr, &state.derived_variables)
                    });
                    (true, satisfied)
                }
            }
            RuleCategory::Measure => {
                let bounds = rule.measure_bounds();
                if bounds.is_bounded() {
                    let inside = bounds.contains(
                        state.total_width(),
                        state.total_height(),
                        state.total_area(),
                    );
                    (true, inside)
                } else {
                    (false, true)
                }
            }
            id_category => match rule.id_constraint(id_category) {
                Some((declared, _)) if declared.is_empty() => (false, true),
                Some((declared, code)) => {
                    let mode = ContainmentMode::from_code(code)?;
                    let current = Self::current_ids(id_category, state);
                    (true, ContainmentCore::evaluate(mode, declared.ids(), &current))
                }
                None => (false, true),
            },
        };

        Ok(CategoryResult {
            category,
            present,
            is_valid,
        })
    }

    /// 从配置状态解析类别的当前 id 集合
    fn current_ids(category: RuleCategory, state: &ConfigurationState) -> Vec<i64> {
        match category {
            RuleCategory::Line => state.line_ids(),
            RuleCategory::Print => state.print_ids(),
            RuleCategory::Composition => state.composition_ids(),
            RuleCategory::Optional => state.optional_ids(),
            RuleCategory::Classification => state.classification_ids(),
            RuleCategory::Variable | RuleCategory::Measure => Vec::new(),
        }
    }
}
