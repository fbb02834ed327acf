use anyhow::Context;
use clap::Parser;
use imgcompress::app::{interactive, runner};
use imgcompress::domain::model::Quality;
use imgcompress::utils::{logger, validation::Validate};
use imgcompress::TomlConfig;

#[derive(Parser)]
#[command(name = "toml-compress")]
#[command(about = "Image compressor driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "imgcompress.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override output format from config
    #[arg(long)]
    format: Option<String>,

    /// Override quality from config
    #[arg(long)]
    quality: Option<u8>,

    /// Override worker count from config
    #[arg(long)]
    workers: Option<usize>,

    /// Wait for Enter before exiting
    #[arg(long)]
    pause: bool,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

fn load_config(args: &Args) -> anyhow::Result<TomlConfig> {
    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    // 應用命令列覆蓋設定
    if let Some(format) = &args.format {
        config.compression.format = format.clone();
        tracing::info!("🔧 Format overridden to: {}", format);
    }
    if let Some(quality) = args.quality {
        config.compression.quality = Some(Quality::new(quality)?.value());
        tracing::info!("🔧 Quality overridden to: {}", quality);
    }
    if let Some(workers) = args.workers {
        let performance = config
            .performance
            .get_or_insert(imgcompress::config::toml_config::PerformanceConfig { workers: None });
        performance.workers = Some(workers);
        tracing::info!("🔧 Workers overridden to: {}", workers);
    }
    if let Some(monitor) = args.monitor {
        let monitoring = config.monitoring.get_or_insert(
            imgcompress::config::toml_config::MonitoringConfig {
                enabled: false,
                log_level: None,
            },
        );
        monitoring.enabled = monitor;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 設定檔中的 log_level = "debug" 等同於 --verbose
    let verbose = args.verbose
        || std::fs::read_to_string(&args.config)
            .ok()
            .and_then(|content| TomlConfig::from_toml_str(&content).ok())
            .is_some_and(|config| config.log_level() == Some("debug"));
    logger::init_cli_logger(verbose);

    tracing::info!("🚀 Starting TOML-based image compressor");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            if args.pause {
                interactive::wait_for_enter("\nPress Enter to exit...");
            }
            std::process::exit(1);
        }
    };

    let exit_code = match config.validate() {
        Ok(()) => {
            tracing::info!("✅ Configuration loaded and validated successfully");
            runner::execute(config, args.dry_run).await
        }
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            runner::report_error(&e)
        }
    };

    if args.pause {
        interactive::wait_for_enter("\nDone. Press Enter to exit...");
    }

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
