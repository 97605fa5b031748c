use clap::Parser;
use dp_map::core::ConfigProvider;
use dp_map::utils::error::MapError;
use dp_map::utils::{logger, validation::Validate};
use dp_map::{CliArgs, EtlEngine, HazardMapPipeline, LocalStorage, MapConfig};

fn report_failure(stage: &str, e: &MapError) {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

fn print_plan(config: &MapConfig) {
    println!("Map: {} (zoom {})", config.title(), config.zoom());
    for source in config.datasets() {
        println!(
            "  fetch {} [{}] {} as '{}'",
            source.kind, source.encoding, source.url, source.layer_name
        );
    }
    for overlay in config.hazard_layers() {
        println!("  overlay '{}' {} @ {}", overlay.name, overlay.url, overlay.opacity);
    }
    println!("  write {}", config.output_file());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting dp-map");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = match args.load_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            report_failure("Configuration", &e);
            std::process::exit(1);
        }
    };

    if args.dry_run {
        print_plan(&config);
        return Ok(());
    }

    if args.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = HazardMapPipeline::new(storage, config)?;
    let engine = EtlEngine::new_with_monitoring(pipeline, args.monitor);

    match engine.run().await {
        Ok(report) => {
            for stats in &report.stats {
                println!(
                    "  {}: {} markers ({} rows skipped)",
                    stats.layer_name, stats.markers_placed, stats.rows_skipped
                );
            }
            println!("✅ Map saved to: {}", report.output_path);
        }
        Err(e) => {
            report_failure("Map build", &e);
            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}
