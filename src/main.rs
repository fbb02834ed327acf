use anyhow::Context;
use clap::Parser;
use imgcompress::app::{interactive, runner};
use imgcompress::utils::logger;
use imgcompress::utils::validation::Validate;
use imgcompress::CliConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting imgcompress");

    // 沒有輸入路徑時進入互動模式，結束前等待 Enter
    let interactive_mode = config.is_interactive();
    if interactive_mode {
        let stdin = std::io::stdin();
        let mut reader = stdin.lock();
        let mut writer = std::io::stdout();
        config = interactive::prompt_config(&mut reader, &mut writer, config)
            .context("failed to read interactive answers")?;
    }
    let pause = config.pause || interactive_mode;

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let exit_code = match config.validate() {
        Ok(()) => runner::execute(config.clone(), config.dry_run).await,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            runner::report_error(&e)
        }
    };

    if pause {
        interactive::wait_for_enter("\nDone. Press Enter to exit...");
    }

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
