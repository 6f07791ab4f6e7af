// ==========================================
// 技术数据表集成测试
// ==========================================
// 覆盖: 目录 + 文档集合 → 数据表 → 汇总 / CSV
// ==========================================

mod helpers;

use helpers::product_fixture::{ProductFixture, PRODUCT_ID};
use helpers::state_builder::StateBuilder;
use product_configurator::catalog::{DatasheetBundle, DocumentKind, ResourceCatalog};
use product_configurator::domain::state::StateSnapshot;
use product_configurator::engine::datasheet::export::write_csv;
use product_configurator::{
    ConfigurationState, Datasheet, DatasheetGenerator, FormulaCategory, FormulaCode,
};

fn load(fixture: &ProductFixture) -> (ResourceCatalog, DatasheetBundle) {
    let catalog =
        ResourceCatalog::from_json(PRODUCT_ID, &fixture.document(DocumentKind::Catalog)).unwrap();
    let bundle = DatasheetBundle::from_documents(
        &fixture.document(DocumentKind::Names),
        &fixture.document(DocumentKind::Validators),
        &fixture.document(DocumentKind::Commodities),
        &fixture.document(DocumentKind::Formulas),
    )
    .unwrap();
    (catalog, bundle)
}

/// 两件 100x50 + 80x60, 已选 Incolor(颜色 1) 与 Alça
fn configured_state() -> ConfigurationState {
    StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .confirm_colored(1, 10, 100, 1000, 1)
        .confirm(2, 20, 200)
        .build()
}

fn generate(state: &ConfigurationState) -> Datasheet {
    let fixture = ProductFixture::window();
    let (catalog, bundle) = load(&fixture);
    DatasheetGenerator::default()
        .generate(&catalog, &bundle, state)
        .unwrap()
}

#[test]
fn test_commodity_expands_per_matching_formula() {
    let sheet = generate(&configured_state());
    let ids: Vec<i64> = sheet.rows.iter().map(|r| r.commodity_id).collect();
    assert_eq!(ids, vec![1, 1, 2]);
    assert!(sheet.warnings.is_empty());

    let first = &sheet.rows[0];
    assert_eq!(first.name, "Vidro incolor 4mm");
    assert_eq!(first.group_name.as_deref(), Some("Vidros"));
    assert_eq!(first.option_title.as_deref(), Some("Incolor"));
    assert_eq!(first.validator_id, Some(7));
    assert_eq!(first.formula_id, Some(1));
    // 面积 = 0.005 + 0.0048
    assert!((first.consumption.unwrap() - 0.01078).abs() < 1e-9);
    assert!((first.weight.unwrap() - 0.098).abs() < 1e-9);
    assert!(first.issues.is_empty());

    let second = &sheet.rows[1];
    assert_eq!(second.formula_id, Some(2));
    assert_eq!(second.consumption, Some(2.0));
    assert_eq!(second.technical, None);
    assert_eq!(second.issues.len(), 1);
    assert_eq!(second.issues[0].category, FormulaCategory::Technical);
    assert_eq!(second.issues[0].code, FormulaCode::DivisionByZero);
    assert_eq!(second.issues[0].variables["width_1"], 100.0);
    assert_eq!(second.issues[0].variables["width_2"], 80.0);
}

#[test]
fn test_composition_level_commodity_without_validator() {
    let sheet = generate(&configured_state());
    let row = sheet.rows.iter().find(|r| r.commodity_id == 2).unwrap();
    assert_eq!(row.name, "Puxador alça");
    assert_eq!(row.group_name.as_deref(), Some("Ferragens"));
    assert_eq!(row.composition_id, Some(20));
    assert_eq!(row.option_id, Some(200));
    assert_eq!(row.validator_id, None);
    assert_eq!(row.formula_id, None);
    assert!(row.issues.is_empty());
}

#[test]
fn test_unconfirmed_group_and_single_piece() {
    // 分组 2 未确认 → 投入品 2 不出现; 单件 → 公式 2 (piece=2) 不展开
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .confirm_colored(1, 10, 100, 1000, 1)
        .build();
    let sheet = generate(&state);
    let ids: Vec<i64> = sheet.rows.iter().map(|r| r.commodity_id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(sheet.rows[0].formula_id, Some(1));
}

#[test]
fn test_color_mismatch_excludes_commodity() {
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .confirm_colored(1, 10, 100, 1000, 2)
        .build();
    assert!(generate(&state).rows.is_empty());
}

#[test]
fn test_summary_scales_with_quantity() {
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .confirm_colored(1, 10, 100, 1000, 1)
        .confirm(2, 20, 200)
        .quantity(3)
        .build();
    let sheet = generate(&state);
    let summary = sheet.summary(state.quantity);

    assert_eq!(summary.len(), 2);
    let glass = summary.iter().find(|l| l.input == 501).unwrap();
    assert_eq!(glass.rows, 2);
    assert!((glass.consumption - (0.01078 + 2.0) * 3.0).abs() < 1e-9);
    assert!((glass.weight - 0.294).abs() < 1e-9);

    let handle = summary.iter().find(|l| l.input == 601).unwrap();
    assert_eq!(handle.rows, 1);
    assert_eq!(handle.consumption, 0.0);
}

#[test]
fn test_csv_export_lists_rows_and_issues() {
    let sheet = generate(&configured_state());
    let mut buffer = Vec::new();
    write_csv(&sheet, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("commodity_id,input,name"));
    assert!(lines[2].ends_with("TECHNICAL:DIVISION_BY_ZERO"));
    assert!(lines[3].starts_with("2,601,Puxador alça,Ferragens"));
}

#[test]
fn test_state_restored_from_snapshot_json() {
    let snapshot: StateSnapshot = serde_json::from_str(
        r#"{
            "product": {"id": 42, "name": "Janela de correr"},
            "measures": [
                {"id": 1, "width": 100, "height": 50},
                {"id": 2, "width": 80, "height": 60}
            ],
            "confirmedOptions": [
                {"groupId": 1, "compositionId": 10, "optionalId": 100,
                 "combinationId": 1000, "colorId": 1}
            ],
            "quantity": 2
        }"#,
    )
    .unwrap();
    let state = ConfigurationState::from_snapshot(snapshot).unwrap();
    assert_eq!(state.quantity, 2);

    // 快照未提供面积, 由宽高推导
    let sheet = generate(&state);
    let ids: Vec<i64> = sheet.rows.iter().map(|r| r.commodity_id).collect();
    assert_eq!(ids, vec![1, 1]);
    assert!((sheet.rows[0].consumption.unwrap() - 0.01078).abs() < 1e-9);
}
