// ==========================================
// 产品配置引擎 - 包含判定纯函数库
// ==========================================
// 职责: 四种包含模式的集合比较 + 外键关系判定
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::types::{ContainmentMode, IdList};

// ==========================================
// ContainmentCore - 纯函数工具类
// ==========================================
pub struct ContainmentCore;

impl ContainmentCore {
    /// 比较声明 id 集合与当前 id 集合
    ///
    /// # 规则
    /// - CONTAIN_ONE: 至少一个声明 id 在当前集合中
    /// - DONT_CONTAIN_ONE: 至少一个声明 id 不在当前集合中
    /// - CONTAIN_ALL: 全部声明 id 都在当前集合中
    /// - DONT_CONTAIN_ALL: 全部声明 id 都不在当前集合中
    /// - 声明为空 → 恒真
    pub fn evaluate(mode: ContainmentMode, declared: &[i64], current: &[i64]) -> bool {
        Self::evaluate_by(mode, declared, |id| current.contains(id))
    }

    /// 以谓词判定"存在"的通用版本 (变量表达式使用"已满足"作为存在)
    pub fn evaluate_by<T>(
        mode: ContainmentMode,
        declared: &[T],
        is_present: impl Fn(&T) -> bool,
    ) -> bool {
        if declared.is_empty() {
            return true;
        }
        match mode {
            ContainmentMode::ContainOne => declared.iter().any(&is_present),
            ContainmentMode::DontContainOne => declared.iter().any(|item| !is_present(item)),
            ContainmentMode::ContainAll => declared.iter().all(&is_present),
            ContainmentMode::DontContainAll => declared.iter().all(|item| !is_present(item)),
        }
    }

    /// 外键关系判定
    ///
    /// # 规则
    /// - 关系列表为空 → 有效 (不限制)
    /// - 当前无选择 → 取决于 require_selection (true 则无效)
    /// - 否则 → 任一当前选择 id 在关系列表中
    pub fn relation_allows(relations: &IdList, selected: &[i64], require_selection: bool) -> bool {
        if relations.is_empty() {
            return true;
        }
        if selected.is_empty() {
            return !require_selection;
        }
        selected.iter().any(|id| relations.contains(*id))
    }

    /// 两个集合是否有交集
    pub fn intersects(left: &[i64], right: &[i64]) -> bool {
        left.iter().any(|id| right.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================
    // 测试 1: 包含模式真值表
    // ==========================================

    #[test]
    fn test_truth_table_partial_overlap() {
        let current = [1, 2];
        let declared = [2, 3];
        assert!(ContainmentCore::evaluate(ContainmentMode::ContainOne, &declared, &current));
        assert!(!ContainmentCore::evaluate(ContainmentMode::ContainAll, &declared, &current));
        assert!(ContainmentCore::evaluate(ContainmentMode::DontContainOne, &declared, &current));
        assert!(!ContainmentCore::evaluate(ContainmentMode::DontContainAll, &declared, &current));
    }

    #[test]
    fn test_truth_table_full_overlap() {
        let current = [1, 2, 3];
        let declared = [2, 3];
        assert!(ContainmentCore::evaluate(ContainmentMode::ContainAll, &declared, &current));
        assert!(!ContainmentCore::evaluate(ContainmentMode::DontContainOne, &declared, &current));
    }

    #[test]
    fn test_truth_table_disjoint() {
        let current = [7];
        let declared = [2, 3];
        assert!(!ContainmentCore::evaluate(ContainmentMode::ContainOne, &declared, &current));
        assert!(ContainmentCore::evaluate(ContainmentMode::DontContainAll, &declared, &current));
    }

    #[test]
    fn test_empty_declaration_is_vacuously_true() {
        for mode in [
            ContainmentMode::ContainOne,
            ContainmentMode::DontContainOne,
            ContainmentMode::ContainAll,
            ContainmentMode::DontContainAll,
        ] {
            assert!(ContainmentCore::evaluate(mode, &[], &[1]));
        }
    }

    // ==========================================
    // 测试 2: 外键关系
    // ==========================================

    #[test]
    fn test_relation_empty_list_always_valid() {
        assert!(ContainmentCore::relation_allows(&IdList::default(), &[], true));
    }

    #[test]
    fn test_relation_requires_selection() {
        let rel = IdList::new(vec![1, 2]);
        assert!(!ContainmentCore::relation_allows(&rel, &[], true));
        assert!(ContainmentCore::relation_allows(&rel, &[], false));
        assert!(ContainmentCore::relation_allows(&rel, &[2], true));
        assert!(!ContainmentCore::relation_allows(&rel, &[3], true));
    }
}
