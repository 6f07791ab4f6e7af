// ==========================================
// 产品配置引擎 - 配置过滤器
// ==========================================
// 职责: 从目录推导当前有效/可见的候选项
// 输入: ConfigurationState (只读) + ResourceCatalog (只读) + 购物车适配器
// 输出: 候选项副本列表
// ==========================================
// 有效性: 件数 / 关联产品 / 总尺寸 / 单件尺寸 / 预设尺寸 / 外键关系 (AND)
// 可见性: 有效性 + 排除已确认 + 规则组评估 (首个有效组的 SHOW/HIDE)
// 诊断日志: 实例级, 仅追加, 由调用方显式清空
// ==========================================

mod combination;
mod core;
mod visibility;


pub use self::combination::select_optimal_combination;
pub use self::core::{MeasureCheck, Rejection};
pub use self::visibility::RuleCheckLog;

use crate::catalog::ResourceCatalog;
use crate::config::EngineConfig;
use crate::engine::cart::CartAdapter;
use crate::engine::rule_engine::RuleEngine;
use std::sync::Arc;

// ==========================================
// ConfigurationFilter - 配置过滤器
// ==========================================
pub struct ConfigurationFilter {
    catalog: Arc<ResourceCatalog>,
    config: EngineConfig,
    cart: Arc<dyn CartAdapter>,
    rule_engine: RuleEngine,

    // ===== 诊断日志 =====
    composition_log: Vec<RuleCheckLog>,
    optional_log: Vec<RuleCheckLog>,
}

impl ConfigurationFilter {
    /// 构造函数
    ///
    /// # 参数
    /// - `catalog`: 产品目录 (共享只读)
    /// - `config`: 引擎配置
    /// - `cart`: 购物车适配器 (关联产品判定)
    pub fn new(
        catalog: Arc<ResourceCatalog>,
        config: EngineConfig,
        cart: Arc<dyn CartAdapter>,
    ) -> Self {
        Self {
            catalog,
            config,
            cart,
            rule_engine: RuleEngine::new(),
            composition_log: Vec::new(),
            optional_log: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 组成可见性评估日志
    pub fn composition_log(&self) -> &[RuleCheckLog] {
        &self.composition_log
    }

    /// 可选项可见性评估日志
    pub fn optional_log(&self) -> &[RuleCheckLog] {
        &self.optional_log
    }

    /// 清空诊断日志
    pub fn clear_logs(&mut self) {
        self.composition_log.clear();
        self.optional_log.clear();
    }
}
