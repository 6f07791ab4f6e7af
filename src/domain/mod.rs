// ==========================================
// 产品配置引擎 - 领域模型层
// ==========================================
// 职责: 定义目录实体、配置状态、规则与数据表类型
// 红线: 不含获取逻辑,不含引擎逻辑
// ==========================================

pub mod catalog;
pub mod datasheet;
pub mod measure;
pub mod rule;
pub mod state;
pub mod types;

// 重导出核心类型
pub use catalog::{
    CatalogEntity, Classification, Combination, Commodity, Composition, Constraints, Environment,
    Form, Group, Line, Model, Optional, Warranty,
};
pub use datasheet::{Datasheet, DatasheetRow, FormulaIssue, SummaryLine};
pub use measure::{Measure, MeasureBounds, MeasureRange, NumberList};
pub use rule::{FormulaAssignment, FormulaEntry, NameEntry, Rule, RuleGroup, Validator};
pub use state::{
    ConfigurationState, ConfirmedOption, ProductDescriptor, ProductLayout, StateSnapshot,
};
pub use types::{
    CommodityLevel, ComparisonOperator, ContainmentMode, FormulaCategory, FormulaCode, IdList,
    RuleAction, RuleCategory, RuleOwnerKind,
};
