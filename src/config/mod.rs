// ==========================================
// 产品配置引擎 - 配置层
// ==========================================
// 职责: 引擎行为配置 (默认可见性/名称缺失标记/关系判定)
// 存储: JSON
// ==========================================

pub mod engine_config;

pub use engine_config::{DefaultVisibility, EngineConfig};
