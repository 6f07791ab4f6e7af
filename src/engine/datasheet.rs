// ==========================================
// 产品配置引擎 - 技术数据表生成器
// ==========================================
// 职责: 由已确认选项推导投入品清单并展开公式
// 输入: ResourceCatalog + DatasheetBundle + ConfigurationState (只读)
// 输出: Datasheet (行 + 告警)
// ==========================================
// 流水线:
// 1) 名称挂载 (缺失 → 带内错误标记)
// 2) 有效性过滤 (分组 / 唯一确认选项 / 尺寸区间 / 校验器)
// 3) 上下文挂载 (分组名 / 可选项 / 组成)
// 4) 公式展开 (首个有效校验器 × 件数满足的公式)
// ==========================================
// 红线: 公式失败作为数据挂在行上,不中断整批
// ==========================================

mod expand;
pub mod export;
mod pipeline;


pub use self::pipeline::CommodityContext;

use crate::config::EngineConfig;
use crate::engine::rule_engine::RuleEngine;

// ==========================================
// DatasheetGenerator - 技术数据表生成器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DatasheetGenerator {
    config: EngineConfig,
    rule_engine: RuleEngine,
}

impl DatasheetGenerator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            rule_engine: RuleEngine::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
