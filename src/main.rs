use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use wfs_harvest::config::layer_refs;
use wfs_harvest::core::{ConfigProvider, SchemaSource, Storage};
use wfs_harvest::utils::{logger, validation::Validate};
use wfs_harvest::{
    AttributeHarvester, CachedSchemaSource, CliConfig, HarvestConfig, HarvestReport, LayerRef,
    LocalStorage, SchemaFetcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting wfs-harvest CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match args.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    let layers = layer_refs(&config)?;

    let mut client = reqwest::Client::builder();
    if let Some(timeout) = config.timeout_seconds() {
        client = client.timeout(Duration::from_secs(timeout));
    }
    let fetcher = SchemaFetcher::with_client(client.build().context("building HTTP client")?);

    let report = if config.cache_enabled() {
        tracing::info!("🔍 Schema cache enabled");
        harvest(AttributeHarvester::new(CachedSchemaSource::new(fetcher)), &config, &layers).await
    } else {
        harvest(AttributeHarvester::new(fetcher), &config, &layers).await
    };

    let json = report.to_json(config.pretty_output())?;

    match config.output_path() {
        Some(path) => {
            let storage = LocalStorage::new(path.to_string());
            storage
                .write_file(config.report_filename(), json.as_bytes())
                .await
                .with_context(|| format!("writing report to {}", path))?;
            tracing::info!("📁 Report saved to: {}/{}", path, config.report_filename());
        }
        None => println!("{}", json),
    }

    if report.failed_layers() > 0 {
        tracing::warn!("{} layer(s) could not be harvested", report.failed_layers());
        std::process::exit(2);
    }

    Ok(())
}

async fn harvest<S: SchemaSource>(
    harvester: AttributeHarvester<S>,
    config: &HarvestConfig,
    layers: &[LayerRef],
) -> HarvestReport {
    harvester
        .harvest(config.endpoint(), layers, config.mode())
        .await
}
