// ==========================================
// 产品配置引擎 - 引擎层
// ==========================================
// 职责: 规则组评估 / 候选过滤 / 公式求值 / 数据表生成
// 红线: 引擎只读配置状态与目录, 查询不产生副作用 (诊断日志除外)
// 红线: 全部同步, 无 I/O
// ==========================================

pub mod cart;
pub mod comparator;
pub mod containment;
pub mod datasheet;
pub mod filter;
pub mod formula;
pub mod rule_engine;

// 重导出核心引擎
pub use cart::{CartAdapter, NoOpCart, StaticCart};
pub use containment::ContainmentCore;
pub use datasheet::{CommodityContext, DatasheetGenerator};
pub use filter::{ConfigurationFilter, MeasureCheck, Rejection, RuleCheckLog};
pub use formula::{FormulaEvaluator, FormulaOutcome};
pub use rule_engine::{CategoryResult, RuleEngine, RuleGroupResult, RuleResult};
