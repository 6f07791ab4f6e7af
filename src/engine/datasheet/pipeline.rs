use super::DatasheetGenerator;
use crate::catalog::{DatasheetBundle, ResourceCatalog};
use crate::domain::catalog::Commodity;
use crate::domain::datasheet::{Datasheet, DatasheetRow};
use crate::domain::rule::Validator;
use crate::domain::state::ConfigurationState;
use crate::domain::types::CommodityLevel;
use crate::engine::filter::MeasureCheck;
use crate::error::EngineResult;

/// 投入品在分组树中的归属
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommodityContext {
    pub group_name: Option<String>,
    pub composition_id: Option<i64>,
    pub option_id: Option<i64>,
    pub option_title: Option<String>,
}

impl CommodityContext {
    /// 回溯归属
    ///
    /// - 组成级: opt → 可选项 → 组成
    /// - 投入品级: parent → 组合 → 可选项 → 组成 (组合缺失时退回 opt)
    pub fn resolve(catalog: &ResourceCatalog, commodity: &Commodity) -> Self {
        let direct = || commodity.opt.and_then(|id| catalog.optional(id));
        let optional = match commodity.level {
            CommodityLevel::Composition => direct(),
            CommodityLevel::Commodity => commodity
                .parent
                .and_then(|id| catalog.combination(id))
                .and_then(|combination| catalog.optional(combination.parent))
                .or_else(direct),
        };
        let composition = optional.and_then(|o| catalog.composition(o.parent));

        Self {
            group_name: catalog.group(commodity.group_id).map(|g| g.name.clone()),
            composition_id: composition.map(|c| c.id),
            option_id: optional.map(|o| o.id),
            option_title: optional.map(|o| o.title.clone()),
        }
    }
}

/// 校验器选择结果
enum ValidatorChoice<'a> {
    /// 未绑定校验器
    Unbound,
    /// 首个有效校验器
    Valid(&'a Validator),
    /// 绑定了校验器但全部无效
    Rejected,
}

impl DatasheetGenerator {
    /// 生成技术数据表
    ///
    /// # 错误
    /// - 校验器规则声明了未知包含模式代码 → EngineError::UnknownContainmentMode
    pub fn generate(
        &self,
        catalog: &ResourceCatalog,
        bundle: &DatasheetBundle,
        state: &ConfigurationState,
    ) -> EngineResult<Datasheet> {
        let mut datasheet = Datasheet::default();
        let group_ids = state.group_ids();
        let mut kept = 0usize;

        for commodity in &bundle.commodities {
            // ===== 1) 名称 =====
            let (name, name_missing) = match bundle.name_of(commodity.input) {
                Some(name) => (name.to_string(), false),
                None => {
                    tracing::warn!(
                        commodity_id = commodity.id,
                        input = commodity.input,
                        "投入品名称缺失"
                    );
                    (self.config.missing_name(commodity.input), true)
                }
            };

            // ===== 2) 有效性 =====
            if !group_ids.contains(&commodity.group_id) {
                continue;
            }
            if !self.matches_single_option(catalog, commodity, state) {
                continue;
            }
            if !MeasureCheck::total_valid(state, &commodity.constraints)
                || !MeasureCheck::pieces_valid(state, &commodity.constraints)
            {
                tracing::debug!(commodity_id = commodity.id, "投入品尺寸超出区间");
                continue;
            }

            for missing in commodity
                .validator
                .ids()
                .iter()
                .filter(|id| bundle.validator(**id).is_none())
            {
                datasheet.warnings.push(format!(
                    "投入品 {} 引用的校验器 {} 不存在",
                    commodity.id, missing
                ));
            }
            let validator = match self.choose_validator(bundle, commodity, state)? {
                ValidatorChoice::Unbound => None,
                ValidatorChoice::Valid(validator) => Some(validator),
                ValidatorChoice::Rejected => {
                    tracing::debug!(commodity_id = commodity.id, "投入品校验器均无效");
                    continue;
                }
            };

            // ===== 3) 上下文 =====
            let context = CommodityContext::resolve(catalog, commodity);
            let base = DatasheetRow {
                commodity_id: commodity.id,
                input: commodity.input,
                name,
                name_missing,
                group_id: commodity.group_id,
                group_name: context.group_name,
                composition_id: context.composition_id,
                option_id: context.option_id,
                option_title: context.option_title,
                validator_id: None,
                formula_id: None,
                consumption: None,
                weight: None,
                technical: None,
                issues: Vec::new(),
            };

            // ===== 4) 公式展开 =====
            kept += 1;
            datasheet
                .rows
                .extend(self.expand(base, validator, bundle, state));
        }

        tracing::info!(
            product_id = state.product.id,
            commodities = bundle.commodities.len(),
            kept,
            rows = datasheet.rows.len(),
            issues = datasheet.issue_count(),
            "技术数据表生成完成"
        );
        Ok(datasheet)
    }

    /// 恰好一个已确认选项与投入品匹配
    ///
    /// # 规则
    /// - 可选项 id 相等 (opt 缺失时经组合回溯)
    /// - 投入品声明颜色且非 colorFree → 颜色 id 相等
    /// - relComm → 已确认组合 id 等于投入品 parent
    fn matches_single_option(
        &self,
        catalog: &ResourceCatalog,
        commodity: &Commodity,
        state: &ConfigurationState,
    ) -> bool {
        let Some(optional_id) = commodity.opt.or_else(|| {
            commodity
                .parent
                .and_then(|id| catalog.combination(id))
                .map(|combination| combination.parent)
        }) else {
            return false;
        };

        let matches = state
            .confirmed_options
            .iter()
            .filter(|o| o.optional_id == optional_id)
            .filter(|o| {
                commodity.color_independent
                    || commodity.color_id.is_none()
                    || o.color_id == commodity.color_id
            })
            .filter(|o| !commodity.exact || o.combination_id == commodity.parent)
            .count();

        if matches != 1 {
            tracing::debug!(commodity_id = commodity.id, matches, "投入品未唯一匹配已确认选项");
        }
        matches == 1
    }

    fn choose_validator<'a>(
        &self,
        bundle: &'a DatasheetBundle,
        commodity: &Commodity,
        state: &ConfigurationState,
    ) -> EngineResult<ValidatorChoice<'a>> {
        let bound: Vec<&Validator> = commodity
            .validator
            .ids()
            .iter()
            .filter_map(|id| bundle.validator(*id))
            .collect();
        if bound.is_empty() {
            return Ok(ValidatorChoice::Unbound);
        }
        for validator in bound {
            if self
                .rule_engine
                .evaluate_group_fast(&validator.as_rule_group(), state)?
            {
                return Ok(ValidatorChoice::Valid(validator));
            }
        }
        Ok(ValidatorChoice::Rejected)
    }
}
