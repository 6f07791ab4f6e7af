// ==========================================
// 产品配置引擎 - 核心库
// ==========================================
// 系统定位: 可配置产品的候选有效性判定 + 技术数据表推导
// 数据流: 会话修改 ConfigurationState → 过滤查询重算 → 界面刷新
//         特定时机 → DatasheetGenerator 重算数据表
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 目录层 - 获取 / 索引 / 缓存
pub mod catalog;

// 引擎层 - 规则与过滤
pub mod engine;

// 配置层 - 引擎配置
pub mod config;

// 错误类型
pub mod error;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CommodityLevel, ContainmentMode, FormulaCategory, FormulaCode, IdList, RuleAction,
    RuleCategory, RuleOwnerKind,
};

// 领域实体
pub use domain::{
    Combination, Commodity, Composition, ConfigurationState, ConfirmedOption, Datasheet,
    DatasheetRow, Measure, Model, Optional, ProductDescriptor, RuleGroup, StateSnapshot,
    Validator,
};

// 目录
pub use catalog::{
    CatalogDocument, CatalogService, CatalogSource, DatasheetBundle, FileCatalogSource,
    ResourceCatalog, StaticCatalogSource,
};

// 引擎
pub use engine::{
    CartAdapter, ConfigurationFilter, DatasheetGenerator, FormulaEvaluator, NoOpCart,
    RuleEngine,
};

// 配置与错误
pub use config::EngineConfig;
pub use error::{CatalogError, CatalogResult, EngineError, EngineResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "产品配置引擎";
