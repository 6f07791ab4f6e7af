// ==========================================
// 产品配置引擎 - 配置状态
// ==========================================
// 职责: 单个产品实例的选择状态 (型号/产品线/分类/尺寸/已确认选项)
// 红线: 查询引擎只读此状态; 变更由会话方直接操作
// 生命周期: 购物车项移除或完成时销毁
// ==========================================

use crate::domain::measure::Measure;
use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 数量下限 (增减操作)
pub const QUANTITY_MIN: u32 = 1;
/// 数量上限
pub const QUANTITY_MAX: u32 = 10;
/// 数量下限 (显式设置)
pub const QUANTITY_EXPLICIT_MIN: u32 = 0;

/// 产品布局配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductLayout {
    pub hide_width: bool,
    pub hide_height: bool,
}

impl ProductLayout {
    /// 宽高输入均隐藏时不校验件数
    pub fn measures_hidden(&self) -> bool {
        self.hide_width && self.hide_height
    }
}

/// 产品描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub layout: ProductLayout,
}

impl ProductDescriptor {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            layout: ProductLayout::default(),
        }
    }
}

/// 已确认的选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedOption {
    pub group_id: i64,
    /// Composition.id (类别 id)
    pub composition_id: i64,
    pub optional_id: i64,
    #[serde(default)]
    pub combination_id: Option<i64>,
    /// 已选颜色
    #[serde(default)]
    pub color_id: Option<i64>,
}

impl ConfirmedOption {
    pub fn new(group_id: i64, composition_id: i64, optional_id: i64) -> Self {
        Self {
            group_id,
            composition_id,
            optional_id,
            combination_id: None,
            color_id: None,
        }
    }

    pub fn with_combination(mut self, combination_id: i64, color_id: Option<i64>) -> Self {
        self.combination_id = Some(combination_id);
        self.color_id = color_id;
        self
    }
}

// ==========================================
// ConfigurationState - 配置状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationState {
    pub instance_id: Uuid,
    pub product: ProductDescriptor,

    // ===== 顶层选择 =====
    pub model: Option<i64>,
    pub line: Option<i64>,
    pub classification: Option<i64>,
    pub subclassification: Option<i64>,
    pub form: Option<i64>,
    pub environment: Option<i64>,
    pub warranty: Option<i64>,
    pub information: Option<String>,

    // ===== 尺寸 =====
    pub measures: Vec<Measure>,
    /// 非标尺寸: 启用实体的非标区间
    pub is_non_standard: bool,

    // ===== 选项 =====
    /// 按确认先后排列, 末尾为最近确认
    pub confirmed_options: Vec<ConfirmedOption>,

    pub quantity: u32,
    pub derived_variables: BTreeMap<String, f64>,

    pub updated_at: DateTime<Utc>,
}

/// 外部快照 (产品描述可能缺失)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StateSnapshot {
    pub product: Option<ProductDescriptor>,
    pub model: Option<i64>,
    pub line: Option<i64>,
    pub classification: Option<i64>,
    pub subclassification: Option<i64>,
    pub form: Option<i64>,
    pub environment: Option<i64>,
    pub warranty: Option<i64>,
    pub information: Option<String>,
    pub measures: Vec<Measure>,
    pub is_non_standard: bool,
    pub confirmed_options: Vec<ConfirmedOption>,
    pub quantity: Option<u32>,
    pub derived_variables: BTreeMap<String, f64>,
}

impl ConfigurationState {
    /// 创建新的配置状态
    pub fn new(product: ProductDescriptor) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            product,
            model: None,
            line: None,
            classification: None,
            subclassification: None,
            form: None,
            environment: None,
            warranty: None,
            information: None,
            measures: Vec::new(),
            is_non_standard: false,
            confirmed_options: Vec::new(),
            quantity: QUANTITY_MIN,
            derived_variables: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// 从外部快照恢复
    ///
    /// # 错误
    /// - 快照缺少产品描述 → EngineError::MissingProductDescriptor
    pub fn from_snapshot(snapshot: StateSnapshot) -> EngineResult<Self> {
        let product = snapshot
            .product
            .ok_or(EngineError::MissingProductDescriptor)?;

        let mut state = Self::new(product);
        state.model = snapshot.model;
        state.line = snapshot.line;
        state.classification = snapshot.classification;
        state.subclassification = snapshot.subclassification;
        state.form = snapshot.form;
        state.environment = snapshot.environment;
        state.warranty = snapshot.warranty;
        state.information = snapshot.information;
        state.measures = snapshot.measures;
        state.is_non_standard = snapshot.is_non_standard;
        state.confirmed_options = snapshot.confirmed_options;
        state.derived_variables = snapshot.derived_variables;
        if let Some(quantity) = snapshot.quantity {
            state.set_quantity(quantity);
        }
        Ok(state)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ==========================================
    // 选择变更
    // ==========================================

    pub fn set_model(&mut self, model: Option<i64>) {
        self.model = model;
        self.touch();
    }

    pub fn set_line(&mut self, line: Option<i64>) {
        self.line = line;
        self.touch();
    }

    pub fn set_classification(&mut self, classification: Option<i64>) {
        self.classification = classification;
        self.subclassification = None;
        self.touch();
    }

    pub fn set_subclassification(&mut self, subclassification: Option<i64>) {
        self.subclassification = subclassification;
        self.touch();
    }

    /// 确认选项; 同一组成下的旧确认被替换并移到末尾
    pub fn confirm_option(&mut self, option: ConfirmedOption) {
        self.confirmed_options
            .retain(|o| o.composition_id != option.composition_id);
        self.confirmed_options.push(option);
        self.touch();
    }

    /// 移除某可选项的确认, 返回是否有移除
    pub fn remove_confirmed_option(&mut self, optional_id: i64) -> bool {
        let before = self.confirmed_options.len();
        self.confirmed_options.retain(|o| o.optional_id != optional_id);
        let removed = self.confirmed_options.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// 清空某分组下的全部确认
    pub fn clear_group(&mut self, group_id: i64) {
        self.confirmed_options.retain(|o| o.group_id != group_id);
        self.touch();
    }

    pub fn add_measure(&mut self, measure: Measure) {
        self.measures.push(measure);
        self.touch();
    }

    pub fn remove_measure(&mut self, measure_id: i64) -> bool {
        let before = self.measures.len();
        self.measures.retain(|m| m.id != measure_id);
        let removed = self.measures.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: f64) {
        self.derived_variables.insert(name.into(), value);
        self.touch();
    }

    // ==========================================
    // 数量
    // ==========================================

    pub fn increment_quantity(&mut self) {
        self.quantity = self
            .quantity
            .saturating_add(1)
            .clamp(QUANTITY_MIN, QUANTITY_MAX);
        self.touch();
    }

    pub fn decrement_quantity(&mut self) {
        self.quantity = self
            .quantity
            .saturating_sub(1)
            .clamp(QUANTITY_MIN, QUANTITY_MAX);
        self.touch();
    }

    /// 显式设置数量 (允许 0)
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.clamp(QUANTITY_EXPLICIT_MIN, QUANTITY_MAX);
        self.touch();
    }

    // ==========================================
    // 尺寸汇总
    // ==========================================

    pub fn piece_count(&self) -> usize {
        self.measures.len()
    }

    /// 总宽 = 各件宽度之和
    pub fn total_width(&self) -> f64 {
        self.measures.iter().map(|m| m.width).sum()
    }

    /// 总高 = 各件高度最大值
    pub fn total_height(&self) -> f64 {
        self.measures.iter().map(|m| m.height).fold(0.0, f64::max)
    }

    /// 总面积 = 各件面积之和
    pub fn total_area(&self) -> f64 {
        self.measures.iter().map(Measure::effective_area).sum()
    }

    // ==========================================
    // 规则引擎的当前 id 集合
    // ==========================================

    pub fn line_ids(&self) -> Vec<i64> {
        self.line.into_iter().collect()
    }

    pub fn classification_ids(&self) -> Vec<i64> {
        self.classification
            .into_iter()
            .chain(self.subclassification)
            .collect()
    }

    pub fn group_ids(&self) -> Vec<i64> {
        self.confirmed_options.iter().map(|o| o.group_id).collect()
    }

    pub fn composition_ids(&self) -> Vec<i64> {
        self.confirmed_options
            .iter()
            .map(|o| o.composition_id)
            .collect()
    }

    pub fn optional_ids(&self) -> Vec<i64> {
        self.confirmed_options.iter().map(|o| o.optional_id).collect()
    }

    /// 印花/变体 = 已确认选项的组合 id
    pub fn print_ids(&self) -> Vec<i64> {
        self.confirmed_options
            .iter()
            .filter_map(|o| o.combination_id)
            .collect()
    }

    /// 公式变量: 内置尺寸变量, 再以派生变量覆盖
    pub fn formula_variables(&self) -> BTreeMap<String, f64> {
        let mut vars = BTreeMap::new();
        vars.insert("width".to_string(), self.total_width());
        vars.insert("height".to_string(), self.total_height());
        vars.insert("area".to_string(), self.total_area());
        vars.insert("pieces".to_string(), self.piece_count() as f64);
        vars.insert("quantity".to_string(), f64::from(self.quantity));
        for (index, measure) in self.measures.iter().enumerate() {
            let n = index + 1;
            vars.insert(format!("width_{}", n), measure.width);
            vars.insert(format!("height_{}", n), measure.height);
            vars.insert(format!("area_{}", n), measure.effective_area());
        }
        for (name, value) in &self.derived_variables {
            vars.insert(name.clone(), *value);
        }
        vars
    }
}
