// ==========================================
// ConfigurationFilter 集成测试
// ==========================================
// 目录夹具: tests/helpers/product_fixture.rs (产品 42)
// ==========================================

mod helpers;

use helpers::product_fixture::{ProductFixture, PRODUCT_ID};
use helpers::state_builder::StateBuilder;
use product_configurator::catalog::{DocumentKind, ResourceCatalog};
use product_configurator::config::EngineConfig;
use product_configurator::domain::types::RuleOwnerKind;
use product_configurator::engine::{ConfigurationFilter, NoOpCart};
use product_configurator::logging;
use product_configurator::ConfigurationState;
use std::sync::Arc;

fn filter() -> ConfigurationFilter {
    logging::init_test();
    let fixture = ProductFixture::window();
    let catalog =
        ResourceCatalog::from_json(PRODUCT_ID, &fixture.document(DocumentKind::Catalog)).unwrap();
    ConfigurationFilter::new(Arc::new(catalog), EngineConfig::default(), Arc::new(NoOpCart))
}

fn model_ids(filter: &ConfigurationFilter, state: &ConfigurationState) -> Vec<i64> {
    filter
        .get_valid_models(state, None)
        .iter()
        .map(|m| m.id)
        .collect()
}

#[test]
fn test_end_to_end_piece_requirement() {
    let f = filter();
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .build();

    // 型号 A: piece=2, maxW=500 → 有效; 型号 B: piece=1 → 无效
    assert_eq!(model_ids(&f, &state), vec![1]);

    let single = StateBuilder::new(PRODUCT_ID).measure(100.0, 50.0).build();
    assert_eq!(model_ids(&f, &single), vec![2]);
}

#[test]
fn test_composition_cascade_with_rule_groups() {
    let mut f = filter();
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .build();

    let visible: Vec<i64> = f
        .get_visible_compositions_for_group(&state, 1)
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(visible, vec![10, 11]);

    // 选择 Fumê → 组成 10 已确认, 组成 11 被 HIDE 规则组隐藏
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .confirm(1, 10, 101)
        .build();
    f.clear_logs();
    assert!(f.get_visible_compositions_for_group(&state, 1).unwrap().is_empty());

    let log = f.composition_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].source, RuleOwnerKind::Composition);
    assert_eq!(log[0].owner_id, 11);
    assert!(log[0].is_valid);
    assert_eq!(
        log[0].message.as_deref(),
        Some("Película indisponível para vidro fumê")
    );
}

#[test]
fn test_optionals_exclude_confirmed() {
    let mut f = filter();
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .confirm(1, 10, 100)
        .build();

    let visible: Vec<i64> = f
        .get_visible_optionals_for_composition(&state, 10)
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(visible, vec![101]);
    assert!(f.optional_log().is_empty());
}

#[test]
fn test_optimal_combination_prefers_most_recent_dependent() {
    let f = filter();
    // D1 (较早) Incolor 颜色 1 → 2001; D2 (较新) Jateada 颜色 2 → 2002
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .confirm_colored(1, 10, 100, 1000, 1)
        .confirm_colored(1, 11, 110, 1100, 2)
        .build();
    let best = f.get_optimal_combination_for_optional(&state, 200).unwrap();
    assert_eq!(best.id, 2002);

    // 仅较早依赖项可命中时回退到较早依赖项
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .confirm_colored(1, 10, 100, 1000, 1)
        .confirm_colored(1, 11, 110, 1100, 42)
        .build();
    let best = f.get_optimal_combination_for_optional(&state, 200).unwrap();
    assert_eq!(best.id, 2001);

    // 无依赖项 → 默认组合
    let state = StateBuilder::new(PRODUCT_ID).build();
    let best = f.get_optimal_combination_for_optional(&state, 200).unwrap();
    assert_eq!(best.id, 2003);
}

#[test]
fn test_queries_are_idempotent() {
    let mut f = filter();
    let state = StateBuilder::new(PRODUCT_ID)
        .measure(100.0, 50.0)
        .measure(80.0, 60.0)
        .model(1)
        .confirm(1, 10, 100)
        .build();

    assert_eq!(f.get_valid_models(&state, None), f.get_valid_models(&state, None));
    assert_eq!(f.get_valid_lines(&state, None), f.get_valid_lines(&state, None));
    assert_eq!(f.get_valid_groups(&state, None), f.get_valid_groups(&state, None));
    assert_eq!(
        f.get_valid_classifications(&state, None),
        f.get_valid_classifications(&state, None)
    );
    assert_eq!(
        f.get_visible_combinations_for_optional(&state, 200),
        f.get_visible_combinations_for_optional(&state, 200)
    );

    let first = f.get_visible_compositions_for_group(&state, 1).unwrap();
    let second = f.get_visible_compositions_for_group(&state, 1).unwrap();
    assert_eq!(first, second);

    let first = f.get_visible_optionals_for_composition(&state, 10).unwrap();
    let second = f.get_visible_optionals_for_composition(&state, 10).unwrap();
    assert_eq!(first, second);
}
