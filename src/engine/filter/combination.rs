use super::ConfigurationFilter;
use crate::domain::catalog::Combination;
use crate::domain::state::{ConfigurationState, ConfirmedOption};

/// 自动配色: 从候选组合中挑选最匹配依赖项颜色的组合
///
/// # 规则
/// 1) 依赖项按确认时间倒序 (最近确认优先)
/// 2) 每个依赖项先匹配主色, 再匹配副色列表; 首个命中即返回
/// 3) 无命中 → 默认组合 → 列表首个
///
/// # 参数
/// - `dependents`: 已确认的依赖项, 按确认先后排列 (末尾最新)
/// - `combinations`: 候选组合
pub fn select_optimal_combination<'a>(
    dependents: &[&ConfirmedOption],
    combinations: &'a [Combination],
) -> Option<&'a Combination> {
    for dependent in dependents.iter().rev() {
        let Some(color) = dependent.color_id else {
            continue;
        };
        let by_primary = combinations.iter().find(|c| c.color == Some(color));
        let matched =
            by_primary.or_else(|| combinations.iter().find(|c| c.secondary_colors.contains(color)));
        if let Some(combination) = matched {
            tracing::debug!(
                dependent_optional = dependent.optional_id,
                color,
                combination_id = combination.id,
                "依赖项颜色命中组合"
            );
            return Some(combination);
        }
    }

    combinations
        .iter()
        .find(|c| c.is_default)
        .or_else(|| combinations.first())
}

impl ConfigurationFilter {
    /// 可选项的最佳组合 (在有效组合中自动配色)
    ///
    /// # 返回
    /// - None: 可选项不存在或无有效组合
    pub fn get_optimal_combination_for_optional(
        &self,
        state: &ConfigurationState,
        optional_id: i64,
    ) -> Option<Combination> {
        let optional = self.catalog.optional(optional_id)?;
        let combinations = self.get_visible_combinations_for_optional(state, optional_id);

        let dependents: Vec<&ConfirmedOption> = state
            .confirmed_options
            .iter()
            .filter(|o| optional.dependents.contains(o.optional_id))
            .collect();

        select_optimal_combination(&dependents, &combinations).cloned()
    }
}
