use super::ConfigurationFilter;
use crate::domain::catalog::{Composition, Optional};
use crate::domain::state::ConfigurationState;
use crate::domain::types::{RuleAction, RuleOwnerKind};
use crate::error::EngineResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 规则组可见性评估日志条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCheckLog {
    /// 来源实体类型
    pub source: RuleOwnerKind,
    /// 所属实体 id
    pub owner_id: i64,
    pub group_id: i64,
    pub is_valid: bool,
    pub action: RuleAction,
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl ConfigurationFilter {
    // ==========================================
    // 可见性查询 (评估规则组, 写入诊断日志)
    // ==========================================

    /// 分组下可见的组成
    ///
    /// # 规则
    /// 1) 排除已确认的组成
    /// 2) 有效性谓词
    /// 3) 规则组可见性
    ///
    /// # 错误
    /// - 规则声明了未知包含模式代码 → EngineError::UnknownContainmentMode
    pub fn get_visible_compositions_for_group(
        &mut self,
        state: &ConfigurationState,
        group_id: i64,
    ) -> EngineResult<Vec<Composition>> {
        let catalog = self.catalog.clone();
        let confirmed = state.composition_ids();

        let mut visible = Vec::new();
        for composition in catalog.compositions_for_group(group_id) {
            if confirmed.contains(&composition.id) {
                continue;
            }
            if !self.is_valid(state, composition) {
                continue;
            }
            if self.rule_visibility(RuleOwnerKind::Composition, composition.id, state)? {
                visible.push(composition.clone());
            }
        }

        tracing::debug!(group_id, visible = visible.len(), "组成可见性过滤完成");
        Ok(visible)
    }

    /// 组成下可见的可选项
    pub fn get_visible_optionals_for_composition(
        &mut self,
        state: &ConfigurationState,
        composition_id: i64,
    ) -> EngineResult<Vec<Optional>> {
        let catalog = self.catalog.clone();
        let confirmed = state.optional_ids();

        let mut visible = Vec::new();
        for optional in catalog.optionals_for_composition(composition_id) {
            if confirmed.contains(&optional.id) {
                continue;
            }
            if !self.is_valid(state, optional) {
                continue;
            }
            if self.rule_visibility(RuleOwnerKind::Optional, optional.id, state)? {
                visible.push(optional.clone());
            }
        }

        tracing::debug!(composition_id, visible = visible.len(), "可选项可见性过滤完成");
        Ok(visible)
    }

    /// 规则组可见性
    ///
    /// 评估归属于该实体的全部规则组并逐一记录日志;
    /// 首个有效组决定 SHOW/HIDE, 无有效组时取配置的默认可见性
    fn rule_visibility(
        &mut self,
        kind: RuleOwnerKind,
        owner_id: i64,
        state: &ConfigurationState,
    ) -> EngineResult<bool> {
        let catalog = self.catalog.clone();
        let mut decided: Option<RuleAction> = None;

        for group in catalog.rule_groups_for(kind, owner_id) {
            let result = self.rule_engine.evaluate_group(group, state)?;
            let entry = RuleCheckLog {
                source: kind,
                owner_id,
                group_id: result.group_id,
                is_valid: result.is_valid,
                action: result.action,
                message: result.message.clone(),
                checked_at: Utc::now(),
            };
            match kind {
                RuleOwnerKind::Composition => self.composition_log.push(entry),
                RuleOwnerKind::Optional => self.optional_log.push(entry),
            }
            if decided.is_none() && result.is_valid {
                decided = Some(result.action);
            }
        }

        Ok(match decided {
            Some(RuleAction::Show) => true,
            Some(RuleAction::Hide) => false,
            None => match kind {
                RuleOwnerKind::Composition => self.config.default_visibility.composition,
                RuleOwnerKind::Optional => self.config.default_visibility.optional,
            },
        })
    }
}
