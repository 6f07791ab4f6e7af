// ==========================================
// 产品配置引擎 - 资源目录
// ==========================================
// 职责: 目录文档解析 + 父子关系索引 + 规则组归属索引
// 红线: 构建后只读; 查询层只借用
// ==========================================
// 文档:
//   catalog      → CatalogDocument (顶层选择实体 + 分组树 + 规则组)
//   names        → { "<input>": { "name": ... } }
//   validators   → { "<id>": { "title", "formula": [...], "rule": [...] } }
//   commodities  → { "commodity": [...] }
//   formulas     → { "<id>": { "formula": "..." } }
// ==========================================

use crate::domain::catalog::{
    Classification, Combination, Commodity, Composition, Environment, Form, Group, Line, Model,
    Optional, Warranty,
};
use crate::domain::rule::{FormulaEntry, NameEntry, RuleGroup, Validator};
use crate::domain::state::ProductDescriptor;
use crate::domain::types::RuleOwnerKind;
use crate::error::{CatalogError, CatalogResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// 目录文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Catalog,
    Names,
    Validators,
    Commodities,
    Formulas,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Catalog => "catalog",
            DocumentKind::Names => "names",
            DocumentKind::Validators => "validators",
            DocumentKind::Commodities => "commodities",
            DocumentKind::Formulas => "formulas",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_document<T: DeserializeOwned>(kind: DocumentKind, json: &str) -> CatalogResult<T> {
    serde_json::from_str(json).map_err(|e| CatalogError::Parse {
        document: kind.to_string(),
        message: e.to_string(),
    })
}

// ==========================================
// CatalogDocument - 目录文档 (线路格式)
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogDocument {
    pub product: Option<ProductDescriptor>,
    pub models: Vec<Model>,
    pub lines: Vec<Line>,
    /// 根分类与子分类 (子分类 parent 非空)
    pub classifications: Vec<Classification>,
    pub forms: Vec<Form>,
    pub environments: Vec<Environment>,
    pub warranties: Vec<Warranty>,
    pub groups: Vec<Group>,
    pub compositions: Vec<Composition>,
    pub optionals: Vec<Optional>,
    pub combinations: Vec<Combination>,
    pub commodities: Vec<Commodity>,
    pub rule_groups: Vec<RuleGroup>,
}

impl CatalogDocument {
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        parse_document(DocumentKind::Catalog, json)
    }
}

// ==========================================
// ResourceCatalog - 带索引的只读目录
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    product_id: i64,
    doc: CatalogDocument,

    group_by_id: HashMap<i64, usize>,
    composition_by_id: HashMap<i64, usize>,
    optional_by_id: HashMap<i64, usize>,
    combination_by_id: HashMap<i64, usize>,

    compositions_by_group: HashMap<i64, Vec<usize>>,
    optionals_by_composition: HashMap<i64, Vec<usize>>,
    combinations_by_optional: HashMap<i64, Vec<usize>>,
    commodities_by_combination: HashMap<i64, Vec<usize>>,
    subclassifications_by_parent: HashMap<i64, Vec<usize>>,
    rule_groups_by_owner: HashMap<(RuleOwnerKind, i64), Vec<usize>>,
}

fn index_by_id<T>(items: &[T], id: impl Fn(&T) -> i64) -> HashMap<i64, usize> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| (id(item), index))
        .collect()
}

fn index_by_parent<T>(items: &[T], parent: impl Fn(&T) -> Option<i64>) -> HashMap<i64, Vec<usize>> {
    let mut index: HashMap<i64, Vec<usize>> = HashMap::new();
    for (position, item) in items.iter().enumerate() {
        if let Some(parent_id) = parent(item) {
            index.entry(parent_id).or_default().push(position);
        }
    }
    index
}

fn pick<'a, T>(items: &'a [T], positions: Option<&Vec<usize>>) -> Vec<&'a T> {
    positions
        .map(|positions| positions.iter().filter_map(|p| items.get(*p)).collect())
        .unwrap_or_default()
}

impl ResourceCatalog {
    /// 从目录文档构建索引
    pub fn new(product_id: i64, doc: CatalogDocument) -> Self {
        let mut rule_groups_by_owner: HashMap<(RuleOwnerKind, i64), Vec<usize>> = HashMap::new();
        for (position, group) in doc.rule_groups.iter().enumerate() {
            match (group.owner_kind, group.owner_id) {
                (Some(kind), Some(owner_id)) => rule_groups_by_owner
                    .entry((kind, owner_id))
                    .or_default()
                    .push(position),
                _ => tracing::warn!(
                    product_id,
                    rule_group_id = group.id,
                    "规则组缺少归属 (ownerKind/ownerId), 不参与可见性评估"
                ),
            }
        }

        let catalog = Self {
            product_id,
            group_by_id: index_by_id(&doc.groups, |g| g.id),
            composition_by_id: index_by_id(&doc.compositions, |c| c.id),
            optional_by_id: index_by_id(&doc.optionals, |o| o.id),
            combination_by_id: index_by_id(&doc.combinations, |c| c.id),
            compositions_by_group: index_by_parent(&doc.compositions, |c| Some(c.group_id)),
            optionals_by_composition: index_by_parent(&doc.optionals, |o| Some(o.parent)),
            combinations_by_optional: index_by_parent(&doc.combinations, |c| Some(c.parent)),
            commodities_by_combination: index_by_parent(&doc.commodities, |c| c.parent),
            subclassifications_by_parent: index_by_parent(&doc.classifications, |c| c.parent),
            rule_groups_by_owner,
            doc,
        };

        tracing::debug!(
            product_id,
            models = catalog.doc.models.len(),
            groups = catalog.doc.groups.len(),
            compositions = catalog.doc.compositions.len(),
            optionals = catalog.doc.optionals.len(),
            rule_groups = catalog.doc.rule_groups.len(),
            "资源目录索引完成"
        );
        catalog
    }

    pub fn from_json(product_id: i64, json: &str) -> CatalogResult<Self> {
        Ok(Self::new(product_id, CatalogDocument::from_json(json)?))
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn document(&self) -> &CatalogDocument {
        &self.doc
    }

    pub fn product(&self) -> Option<&ProductDescriptor> {
        self.doc.product.as_ref()
    }

    // ===== 顶层实体 =====

    pub fn models(&self) -> &[Model] {
        &self.doc.models
    }

    pub fn lines(&self) -> &[Line] {
        &self.doc.lines
    }

    /// 全部分类 (含子分类)
    pub fn classifications(&self) -> &[Classification] {
        &self.doc.classifications
    }

    pub fn root_classifications(&self) -> Vec<&Classification> {
        self.doc
            .classifications
            .iter()
            .filter(|c| c.is_root())
            .collect()
    }

    pub fn subclassifications_of(&self, classification_id: i64) -> Vec<&Classification> {
        pick(
            &self.doc.classifications,
            self.subclassifications_by_parent.get(&classification_id),
        )
    }

    pub fn forms(&self) -> &[Form] {
        &self.doc.forms
    }

    pub fn environments(&self) -> &[Environment] {
        &self.doc.environments
    }

    pub fn warranties(&self) -> &[Warranty] {
        &self.doc.warranties
    }

    // ===== 分组树 =====

    pub fn groups(&self) -> &[Group] {
        &self.doc.groups
    }

    pub fn group(&self, id: i64) -> Option<&Group> {
        self.group_by_id.get(&id).and_then(|p| self.doc.groups.get(*p))
    }

    pub fn composition(&self, id: i64) -> Option<&Composition> {
        self.composition_by_id
            .get(&id)
            .and_then(|p| self.doc.compositions.get(*p))
    }

    pub fn optional(&self, id: i64) -> Option<&Optional> {
        self.optional_by_id
            .get(&id)
            .and_then(|p| self.doc.optionals.get(*p))
    }

    pub fn combination(&self, id: i64) -> Option<&Combination> {
        self.combination_by_id
            .get(&id)
            .and_then(|p| self.doc.combinations.get(*p))
    }

    pub fn compositions_for_group(&self, group_id: i64) -> Vec<&Composition> {
        pick(&self.doc.compositions, self.compositions_by_group.get(&group_id))
    }

    pub fn optionals_for_composition(&self, composition_id: i64) -> Vec<&Optional> {
        pick(
            &self.doc.optionals,
            self.optionals_by_composition.get(&composition_id),
        )
    }

    pub fn combinations_for_optional(&self, optional_id: i64) -> Vec<&Combination> {
        pick(
            &self.doc.combinations,
            self.combinations_by_optional.get(&optional_id),
        )
    }

    pub fn commodities_for_combination(&self, combination_id: i64) -> Vec<&Commodity> {
        pick(
            &self.doc.commodities,
            self.commodities_by_combination.get(&combination_id),
        )
    }

    // ===== 规则组 =====

    pub fn rule_groups(&self) -> &[RuleGroup] {
        &self.doc.rule_groups
    }

    /// 归属于某实体的规则组 (保持文档顺序)
    pub fn rule_groups_for(&self, kind: RuleOwnerKind, owner_id: i64) -> Vec<&RuleGroup> {
        pick(
            &self.doc.rule_groups,
            self.rule_groups_by_owner.get(&(kind, owner_id)),
        )
    }
}

// ==========================================
// DatasheetBundle - 数据表文档集合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasheetBundle {
    pub names: BTreeMap<i64, NameEntry>,
    pub validators: BTreeMap<i64, Validator>,
    pub commodities: Vec<Commodity>,
    pub formulas: BTreeMap<i64, FormulaEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct CommodityDocument {
    #[serde(default)]
    commodity: Vec<Commodity>,
}

impl DatasheetBundle {
    pub fn parse_names(json: &str) -> CatalogResult<BTreeMap<i64, NameEntry>> {
        parse_document(DocumentKind::Names, json)
    }

    /// 校验器表; 以表键回填校验器 id
    pub fn parse_validators(json: &str) -> CatalogResult<BTreeMap<i64, Validator>> {
        let mut validators: BTreeMap<i64, Validator> =
            parse_document(DocumentKind::Validators, json)?;
        for (id, validator) in validators.iter_mut() {
            validator.id = *id;
        }
        Ok(validators)
    }

    pub fn parse_commodities(json: &str) -> CatalogResult<Vec<Commodity>> {
        let doc: CommodityDocument = parse_document(DocumentKind::Commodities, json)?;
        Ok(doc.commodity)
    }

    pub fn parse_formulas(json: &str) -> CatalogResult<BTreeMap<i64, FormulaEntry>> {
        parse_document(DocumentKind::Formulas, json)
    }

    /// 由四个原始文档构建 (任一失败则整体失败)
    pub fn from_documents(
        names: &str,
        validators: &str,
        commodities: &str,
        formulas: &str,
    ) -> CatalogResult<Self> {
        Ok(Self {
            names: Self::parse_names(names)?,
            validators: Self::parse_validators(validators)?,
            commodities: Self::parse_commodities(commodities)?,
            formulas: Self::parse_formulas(formulas)?,
        })
    }

    pub fn name_of(&self, input: i64) -> Option<&str> {
        self.names
            .get(&input)
            .map(|entry| entry.name.as_str())
            .filter(|name| !name.trim().is_empty())
    }

    pub fn validator(&self, id: i64) -> Option<&Validator> {
        self.validators.get(&id)
    }

    pub fn formula_text(&self, id: i64) -> Option<&str> {
        self.formulas.get(&id).map(|entry| entry.formula.as_str())
    }
}
