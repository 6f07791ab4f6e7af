// ==========================================
// 产品配置引擎 - 目录实体
// ==========================================
// 职责: 模型/产品线/分类/分组/组成/可选项/组合/投入品等目录实体
// 红线: 目录按产品 id 获取后只读,引擎不得修改
// ==========================================
// 关系: Composition.groupID → Group
//       Optional.parent → Composition.id
//       Combination.parent → Optional.id
//       Commodity.parent → Combination.id
// ==========================================

use crate::domain::measure::{MeasureBounds, MeasureRange, NumberList};
use crate::domain::types::{CommodityLevel, IdList};
use serde::{Deserialize, Serialize};

// ==========================================
// Constraints - 通用过滤约束
// ==========================================
// 所有可过滤实体平铺携带此结构
// 区间边界 0 = 不限制; 关系列表为空 = 对全部有效
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Constraints {
    // ===== 件数 =====
    pub piece: u32, // 声明件数 (0 = 不校验)

    // ===== 关联产品 =====
    pub related_products: IdList, // 购物车中须已存在其一

    // ===== 总尺寸区间 =====
    pub ignore_measures: bool,
    pub min_w: f64,
    pub max_w: f64,
    pub min_h: f64,
    pub max_h: f64,
    pub min_a: f64,
    pub max_a: f64,

    // ===== 单件尺寸区间 =====
    pub p_min_w: f64,
    pub p_max_w: f64,
    pub p_min_h: f64,
    pub p_max_h: f64,
    pub p_min_a: f64,
    pub p_max_a: f64,

    // ===== 非标尺寸区间 (状态 is_non_standard 时替代总尺寸区间) =====
    pub ns_min_w: f64,
    pub ns_max_w: f64,
    pub ns_min_h: f64,
    pub ns_max_h: f64,
    pub ns_min_a: f64,
    pub ns_max_a: f64,

    // ===== 预设尺寸 =====
    pub check_width: bool,
    pub check_height: bool,
    pub predefined_widths: NumberList,
    pub predefined_heights: NumberList,

    // ===== 外键关系 =====
    pub models: IdList,
    pub lines: IdList,
    pub classifications: IdList,
}

impl Constraints {
    pub fn total_bounds(&self) -> MeasureBounds {
        MeasureBounds {
            width: MeasureRange::new(self.min_w, self.max_w),
            height: MeasureRange::new(self.min_h, self.max_h),
            area: MeasureRange::new(self.min_a, self.max_a),
        }
    }

    pub fn piece_bounds(&self) -> MeasureBounds {
        MeasureBounds {
            width: MeasureRange::new(self.p_min_w, self.p_max_w),
            height: MeasureRange::new(self.p_min_h, self.p_max_h),
            area: MeasureRange::new(self.p_min_a, self.p_max_a),
        }
    }

    pub fn non_standard_bounds(&self) -> MeasureBounds {
        MeasureBounds {
            width: MeasureRange::new(self.ns_min_w, self.ns_max_w),
            height: MeasureRange::new(self.ns_min_h, self.ns_max_h),
            area: MeasureRange::new(self.ns_min_a, self.ns_max_a),
        }
    }
}

/// 可过滤的目录实体
pub trait CatalogEntity {
    fn id(&self) -> i64;
    fn constraints(&self) -> &Constraints;
}

macro_rules! impl_catalog_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CatalogEntity for $ty {
                fn id(&self) -> i64 {
                    self.id
                }

                fn constraints(&self) -> &Constraints {
                    &self.constraints
                }
            }
        )*
    };
}

// ==========================================
// 顶层选择实体
// ==========================================

/// 型号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// 产品线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// 分类 (parent 为空 = 根分类, 否则为子分类)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(flatten)]
    pub constraints: Constraints,
}

impl Classification {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// 造型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// 使用环境
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// 质保
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warranty {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub years: u32,
    #[serde(flatten)]
    pub constraints: Constraints,
}

// ==========================================
// 分组 → 组成 → 可选项 → 组合 → 投入品
// ==========================================

/// 分组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order: i32,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// 组成 (分组内的可选槽位)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub id: i64,
    #[serde(rename = "groupID", alias = "groupId")]
    pub group_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// 可选项 (组成下的具体选择)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Optional {
    pub id: i64,
    pub parent: i64, // Composition.id
    #[serde(default)]
    pub title: String,
    /// 依赖项: 这些可选项的已确认选择参与自动配色
    #[serde(default)]
    pub dependents: IdList,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// 组合 (可选项下的颜色/变体搭配)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    pub id: i64,
    pub parent: i64, // Optional.id
    #[serde(default)]
    pub name: String,
    /// 主色
    #[serde(default)]
    pub color: Option<i64>,
    /// 副色列表
    #[serde(default)]
    pub secondary_colors: IdList,
    #[serde(default)]
    pub is_default: bool,
    #[serde(flatten)]
    pub constraints: Constraints,
}

/// 投入品 (原材料行)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commodity {
    pub id: i64,
    /// 投入品编号 (名称表键)
    pub input: i64,
    /// Combination.id (投入品级)
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(rename = "groupId", alias = "groupID", default)]
    pub group_id: i64,
    /// Optional.id
    #[serde(default)]
    pub opt: Option<i64>,
    /// 颜色 id
    #[serde(rename = "fK", alias = "colorId", default)]
    pub color_id: Option<i64>,
    /// 与颜色无关
    #[serde(rename = "colorFree", default)]
    pub color_independent: bool,
    /// 精确匹配: 已确认选项的组合 id 必须等于 parent
    #[serde(rename = "relComm", default)]
    pub exact: bool,
    #[serde(default)]
    pub level: CommodityLevel,
    /// 绑定的校验器 id 列表
    #[serde(default)]
    pub validator: IdList,
    #[serde(flatten)]
    pub constraints: Constraints,
}

impl_catalog_entity!(
    Model,
    Line,
    Classification,
    Form,
    Environment,
    Warranty,
    Group,
    Composition,
    Optional,
    Combination,
    Commodity,
);
