// ==========================================
// 技术数据表 CSV 导出
// ==========================================

use crate::domain::datasheet::{Datasheet, DatasheetRow};
use serde::Serialize;
use std::io;

const HEADERS: [&str; 12] = [
    "commodity_id",
    "input",
    "name",
    "group",
    "option_id",
    "option",
    "validator_id",
    "formula_id",
    "consumption",
    "weight",
    "technical",
    "issues",
];

#[derive(Serialize)]
struct CsvRecord<'a> {
    commodity_id: i64,
    input: i64,
    name: &'a str,
    group: &'a str,
    option_id: Option<i64>,
    option: &'a str,
    validator_id: Option<i64>,
    formula_id: Option<i64>,
    consumption: Option<f64>,
    weight: Option<f64>,
    technical: Option<f64>,
    /// "CATEGORY:CODE" 以 ';' 连接
    issues: String,
}

impl<'a> From<&'a DatasheetRow> for CsvRecord<'a> {
    fn from(row: &'a DatasheetRow) -> Self {
        let issues = row
            .issues
            .iter()
            .map(|issue| format!("{}:{}", issue.category, issue.code))
            .collect::<Vec<_>>()
            .join(";");
        Self {
            commodity_id: row.commodity_id,
            input: row.input,
            name: &row.name,
            group: row.group_name.as_deref().unwrap_or_default(),
            option_id: row.option_id,
            option: row.option_title.as_deref().unwrap_or_default(),
            validator_id: row.validator_id,
            formula_id: row.formula_id,
            consumption: row.consumption,
            weight: row.weight,
            technical: row.technical,
            issues,
        }
    }
}

/// 写出数据表 (始终包含表头)
pub fn write_csv<W: io::Write>(datasheet: &Datasheet, writer: W) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(HEADERS)?;
    for row in &datasheet.rows {
        writer.serialize(CsvRecord::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::datasheet::FormulaIssue;
    use crate::domain::types::{FormulaCategory, FormulaCode};
    use std::collections::BTreeMap;

    fn row() -> DatasheetRow {
        DatasheetRow {
            commodity_id: 1,
            input: 501,
            name: "Vidro 4mm".to_string(),
            name_missing: false,
            group_id: 3,
            group_name: Some("Vidros".to_string()),
            composition_id: Some(30),
            option_id: Some(300),
            option_title: Some("Temperado".to_string()),
            validator_id: Some(7),
            formula_id: Some(1),
            consumption: Some(1.5),
            weight: None,
            technical: None,
            issues: vec![FormulaIssue {
                category: FormulaCategory::Weight,
                code: FormulaCode::DivisionByZero,
                title: "Vidro 4mm [WEIGHT]".to_string(),
                message: "除数为零".to_string(),
                formula: "1/0".to_string(),
                variables: BTreeMap::new(),
            }],
        }
    }

    #[test]
    fn test_write_csv() {
        let datasheet = Datasheet {
            rows: vec![row()],
            warnings: Vec::new(),
        };
        let mut buffer = Vec::new();
        write_csv(&datasheet, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("commodity_id,input,name"));
        assert_eq!(
            lines.next().unwrap(),
            "1,501,Vidro 4mm,Vidros,300,Temperado,7,1,1.5,,,WEIGHT:DIVISION_BY_ZERO"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_datasheet_writes_header_only() {
        let mut buffer = Vec::new();
        write_csv(&Datasheet::default(), &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap().lines().count(), 1);
    }
}
