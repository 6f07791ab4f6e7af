// ==========================================
// 产品配置引擎 - 命令行入口
// ==========================================
// 用法:
//   configurator <catalog_root> <product_id> <state.json> [engine_config.json]
//
// 输出: 有效型号 / 各有效分组的可见组成 / 数据表 CSV (stdout)
// ==========================================

use anyhow::{bail, Context};
use product_configurator::catalog::{CatalogService, FileCatalogSource};
use product_configurator::config::EngineConfig;
use product_configurator::domain::state::{ConfigurationState, StateSnapshot};
use product_configurator::engine::datasheet::export::write_csv;
use product_configurator::engine::{ConfigurationFilter, NoOpCart};
use product_configurator::logging;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let (Some(catalog_root), Some(product_id), Some(state_path)) =
        (args.next(), args.next(), args.next())
    else {
        bail!("用法: configurator <catalog_root> <product_id> <state.json> [engine_config.json]");
    };
    let product_id: i64 = product_id
        .trim()
        .parse()
        .with_context(|| format!("无效的产品 id: {}", product_id))?;

    let mut config = match args.next() {
        Some(path) => EngineConfig::from_json_file(&path)?,
        None => EngineConfig::default(),
    };
    config.catalog_root = Some(catalog_root.clone().into());

    let snapshot: StateSnapshot = serde_json::from_str(
        &std::fs::read_to_string(&state_path)
            .with_context(|| format!("无法读取配置状态: {}", state_path))?,
    )
    .with_context(|| format!("配置状态解析失败: {}", state_path))?;
    let state = ConfigurationState::from_snapshot(snapshot)?;

    tracing::info!("{} v{}", product_configurator::APP_NAME, product_configurator::VERSION);
    tracing::info!(product_id, catalog_root = %catalog_root, "加载目录");

    let source = Arc::new(FileCatalogSource::new(catalog_root));
    let service = CatalogService::new(source, config.clone());
    let catalog = service.catalog(product_id).await?;

    let mut filter = ConfigurationFilter::new(catalog, config, Arc::new(NoOpCart));

    println!("# 有效型号");
    for model in filter.get_valid_models(&state, None) {
        println!("{}\t{}", model.id, model.name);
    }

    for group in filter.get_valid_groups(&state, None) {
        println!("# 分组 {} {}", group.id, group.name);
        for composition in filter.get_visible_compositions_for_group(&state, group.id)? {
            println!("{}\t{}", composition.id, composition.name);
        }
    }

    let datasheet = service.datasheet(product_id, &state).await;
    for warning in &datasheet.warnings {
        tracing::warn!("{}", warning);
    }
    println!("# 数据表");
    write_csv(&datasheet, std::io::stdout().lock())?;

    Ok(())
}
