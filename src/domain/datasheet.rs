// ==========================================
// 产品配置引擎 - 技术数据表
// ==========================================
// 职责: 数据表行 / 公式错误 / 汇总
// 约定: 公式失败作为数据挂在行上,不中断整批
// ==========================================

use crate::domain::types::{FormulaCategory, FormulaCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个类别的公式错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaIssue {
    pub category: FormulaCategory,
    pub code: FormulaCode,
    pub title: String,
    pub message: String,
    pub formula: String,
    pub variables: BTreeMap<String, f64>,
}

/// 数据表行 (一个投入品 × 一个公式分配)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasheetRow {
    pub commodity_id: i64,
    pub input: i64,
    /// 名称; 缺失时为带内错误标记
    pub name: String,
    pub name_missing: bool,

    // ===== 上下文 =====
    pub group_id: i64,
    pub group_name: Option<String>,
    pub composition_id: Option<i64>,
    pub option_id: Option<i64>,
    pub option_title: Option<String>,

    // ===== 公式展开 =====
    pub validator_id: Option<i64>,
    pub formula_id: Option<i64>,
    pub consumption: Option<f64>,
    pub weight: Option<f64>,
    pub technical: Option<f64>,
    pub issues: Vec<FormulaIssue>,
}

impl DatasheetRow {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// 按投入品汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryLine {
    pub input: i64,
    pub name: String,
    pub consumption: f64,
    pub weight: f64,
    pub rows: usize,
}

/// 技术数据表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datasheet {
    pub rows: Vec<DatasheetRow>,
    /// 非致命告警 (文档获取失败等)
    pub warnings: Vec<String>,
}

impl Datasheet {
    /// 空数据表 + 告警
    pub fn degraded(warning: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            warnings: vec![warning.into()],
        }
    }

    pub fn issue_count(&self) -> usize {
        self.rows.iter().map(|r| r.issues.len()).sum()
    }

    /// 按投入品汇总消耗量与重量, 乘以产品数量
    pub fn summary(&self, quantity: u32) -> Vec<SummaryLine> {
        let factor = f64::from(quantity);
        let mut by_input: BTreeMap<i64, SummaryLine> = BTreeMap::new();
        for row in &self.rows {
            let line = by_input.entry(row.input).or_insert_with(|| SummaryLine {
                input: row.input,
                name: row.name.clone(),
                consumption: 0.0,
                weight: 0.0,
                rows: 0,
            });
            line.consumption += row.consumption.unwrap_or(0.0) * factor;
            line.weight += row.weight.unwrap_or(0.0) * factor;
            line.rows += 1;
        }
        by_input.into_values().collect()
    }
}
