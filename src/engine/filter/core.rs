use super::ConfigurationFilter;
use crate::domain::catalog::{
    CatalogEntity, Classification, Combination, Commodity, Constraints, Environment, Form, Group,
    Line, Model, Warranty,
};
use crate::domain::state::ConfigurationState;
use crate::engine::containment::ContainmentCore;
use serde::Serialize;
use std::fmt;

/// 候选项被剔除的原因 (首个失败谓词)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rejection {
    PieceCount,
    RelatedProducts,
    TotalMeasures,
    PieceMeasures,
    PredefinedMeasures,
    ModelRelation,
    LineRelation,
    ClassificationRelation,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rejection::PieceCount => "件数不匹配",
            Rejection::RelatedProducts => "购物车缺少关联产品",
            Rejection::TotalMeasures => "总尺寸超出区间",
            Rejection::PieceMeasures => "单件尺寸超出区间",
            Rejection::PredefinedMeasures => "尺寸不在预设列表",
            Rejection::ModelRelation => "型号关系不匹配",
            Rejection::LineRelation => "产品线关系不匹配",
            Rejection::ClassificationRelation => "分类关系不匹配",
        };
        f.write_str(label)
    }
}

// ==========================================
// MeasureCheck - 尺寸判定纯函数
// ==========================================
// 过滤器与数据表生成器共用
pub struct MeasureCheck;

impl MeasureCheck {
    /// 总尺寸区间
    ///
    /// # 规则
    /// - ignoreMeasures → 恒有效
    /// - 状态为非标尺寸 → 以非标区间替代总区间
    /// - 总宽 = 宽度之和, 总高 = 高度最大值, 总面积 = 面积之和
    pub fn total_valid(state: &ConfigurationState, constraints: &Constraints) -> bool {
        if constraints.ignore_measures {
            return true;
        }
        let bounds = if state.is_non_standard {
            constraints.non_standard_bounds()
        } else {
            constraints.total_bounds()
        };
        bounds.contains(state.total_width(), state.total_height(), state.total_area())
    }

    /// 单件尺寸区间: 每一件都须满足
    pub fn pieces_valid(state: &ConfigurationState, constraints: &Constraints) -> bool {
        let bounds = constraints.piece_bounds();
        if !bounds.is_bounded() {
            return true;
        }
        state.measures.iter().all(|m| bounds.contains_measure(m))
    }

    /// 预设尺寸: 仅在 checkWidth/checkHeight 置位且列表非空时校验每一件
    pub fn predefined_valid(state: &ConfigurationState, constraints: &Constraints) -> bool {
        let widths_ok = !constraints.check_width
            || constraints.predefined_widths.is_empty()
            || state
                .measures
                .iter()
                .all(|m| constraints.predefined_widths.contains(m.width));
        let heights_ok = !constraints.check_height
            || constraints.predefined_heights.is_empty()
            || state
                .measures
                .iter()
                .all(|m| constraints.predefined_heights.contains(m.height));
        widths_ok && heights_ok
    }
}

impl ConfigurationFilter {
    // ==========================================
    // 有效性谓词
    // ==========================================

    /// 首个失败的有效性谓词; None = 有效
    pub fn rejection<E: CatalogEntity>(
        &self,
        state: &ConfigurationState,
        entity: &E,
    ) -> Option<Rejection> {
        let c = entity.constraints();
        let require = self.config.require_selection_for_relations;

        if !self.piece_count_matches(state, c) {
            return Some(Rejection::PieceCount);
        }
        if !self.related_products_present(c) {
            return Some(Rejection::RelatedProducts);
        }
        if !MeasureCheck::total_valid(state, c) {
            return Some(Rejection::TotalMeasures);
        }
        if !MeasureCheck::pieces_valid(state, c) {
            return Some(Rejection::PieceMeasures);
        }
        if !MeasureCheck::predefined_valid(state, c) {
            return Some(Rejection::PredefinedMeasures);
        }

        let model: Vec<i64> = state.model.into_iter().collect();
        if !ContainmentCore::relation_allows(&c.models, &model, require) {
            return Some(Rejection::ModelRelation);
        }
        if !ContainmentCore::relation_allows(&c.lines, &state.line_ids(), require) {
            return Some(Rejection::LineRelation);
        }
        if !ContainmentCore::relation_allows(
            &c.classifications,
            &state.classification_ids(),
            require,
        ) {
            return Some(Rejection::ClassificationRelation);
        }
        None
    }

    pub fn is_valid<E: CatalogEntity>(&self, state: &ConfigurationState, entity: &E) -> bool {
        match self.rejection(state, entity) {
            None => true,
            Some(reason) => {
                tracing::debug!(entity_id = entity.id(), %reason, "候选项无效");
                false
            }
        }
    }

    /// 声明件数 == 尺寸件数; 宽高输入均隐藏时跳过
    fn piece_count_matches(&self, state: &ConfigurationState, c: &Constraints) -> bool {
        if c.piece == 0 || state.product.layout.measures_hidden() {
            return true;
        }
        c.piece as usize == state.piece_count()
    }

    fn related_products_present(&self, c: &Constraints) -> bool {
        if c.related_products.is_empty() {
            return true;
        }
        let in_cart = self.cart.product_ids_in_cart();
        ContainmentCore::intersects(c.related_products.ids(), &in_cart)
    }

    fn filter_valid<'a, E, I>(&self, state: &ConfigurationState, items: I) -> Vec<E>
    where
        E: CatalogEntity + Clone + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        items
            .into_iter()
            .filter(|item| self.is_valid(state, *item))
            .cloned()
            .collect()
    }

    // ==========================================
    // 顶层查询
    // ==========================================
    // candidates 为 None 时取目录全集

    pub fn get_valid_models(
        &self,
        state: &ConfigurationState,
        candidates: Option<&[Model]>,
    ) -> Vec<Model> {
        self.filter_valid(state, candidates.unwrap_or(self.catalog.models()))
    }

    pub fn get_valid_lines(
        &self,
        state: &ConfigurationState,
        candidates: Option<&[Line]>,
    ) -> Vec<Line> {
        self.filter_valid(state, candidates.unwrap_or(self.catalog.lines()))
    }

    /// 根分类
    pub fn get_valid_classifications(
        &self,
        state: &ConfigurationState,
        candidates: Option<&[Classification]>,
    ) -> Vec<Classification> {
        match candidates {
            Some(items) => self.filter_valid(state, items),
            None => self.filter_valid(state, self.catalog.root_classifications()),
        }
    }

    pub fn get_visible_subclassifications_for_classification(
        &self,
        state: &ConfigurationState,
        classification_id: i64,
    ) -> Vec<Classification> {
        self.filter_valid(state, self.catalog.subclassifications_of(classification_id))
    }

    pub fn get_valid_forms(
        &self,
        state: &ConfigurationState,
        candidates: Option<&[Form]>,
    ) -> Vec<Form> {
        self.filter_valid(state, candidates.unwrap_or(self.catalog.forms()))
    }

    pub fn get_valid_environments(
        &self,
        state: &ConfigurationState,
        candidates: Option<&[Environment]>,
    ) -> Vec<Environment> {
        self.filter_valid(state, candidates.unwrap_or(self.catalog.environments()))
    }

    pub fn get_valid_warranties(
        &self,
        state: &ConfigurationState,
        candidates: Option<&[Warranty]>,
    ) -> Vec<Warranty> {
        self.filter_valid(state, candidates.unwrap_or(self.catalog.warranties()))
    }

    /// 有效分组: 自身有效且至少含一个有效组成, 按 order 排序
    pub fn get_valid_groups(
        &self,
        state: &ConfigurationState,
        candidates: Option<&[Group]>,
    ) -> Vec<Group> {
        let mut groups: Vec<Group> = candidates
            .unwrap_or(self.catalog.groups())
            .iter()
            .filter(|group| self.is_valid(state, *group))
            .filter(|group| {
                self.catalog
                    .compositions_for_group(group.id)
                    .into_iter()
                    .any(|comp| self.is_valid(state, comp))
            })
            .cloned()
            .collect();
        groups.sort_by_key(|g| g.order);
        groups
    }

    // ==========================================
    // 嵌套查询 (仅有效性, 不评估规则组)
    // ==========================================

    pub fn get_visible_combinations_for_optional(
        &self,
        state: &ConfigurationState,
        optional_id: i64,
    ) -> Vec<Combination> {
        self.filter_valid(state, self.catalog.combinations_for_optional(optional_id))
    }

    pub fn get_valid_commodities_for_combination(
        &self,
        state: &ConfigurationState,
        combination_id: i64,
    ) -> Vec<Commodity> {
        self.filter_valid(state, self.catalog.commodities_for_combination(combination_id))
    }
}
