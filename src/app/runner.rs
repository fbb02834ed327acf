use crate::adapters::{codec::ImageRsCodec, reporter::LogReporter, storage::LocalStorage};
use crate::core::engine::{CompressionEngine, RunOutcome};
use crate::core::pipeline::CompressionPipeline;
use crate::core::{preflight, CancelHandle, ConfigProvider, Pipeline};
use crate::utils::error::{CompressError, ErrorSeverity};
use crate::utils::size::format_file_size;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 批次中有檔案失敗時的退出碼
pub const PARTIAL_FAILURE_EXIT_CODE: i32 = 2;

/// 第二次 Ctrl-C 強制結束時的退出碼 (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

pub fn report_error(error: &CompressError) -> i32 {
    tracing::error!(
        "❌ Compression failed: {} (Category: {:?}, Severity: {:?})",
        error,
        error.category(),
        error.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", error.recovery_suggestion());

    eprintln!("❌ {}", error.user_friendly_message());
    eprintln!("💡 建議: {}", error.recovery_suggestion());

    error.severity().exit_code()
}

/// 執行前置檢查與整個批次，回傳程序退出碼
pub async fn execute<C: ConfigProvider + 'static>(config: C, dry_run: bool) -> i32 {
    let codec = ImageRsCodec::new();

    let checked = match preflight::run(&config, &codec) {
        Ok(report) => report,
        Err(e) => return report_error(&e),
    };
    tracing::info!("✅ Preflight checks passed");

    println!("📋 Settings:");
    println!("  Format: {}", checked.settings.format);
    println!("  Quality: {}", checked.settings.quality);
    println!(
        "  Delete originals: {}",
        if checked.settings.delete_original { "yes" } else { "no" }
    );
    if !checked.settings.delete_original {
        println!("  Postfix: {}", checked.settings.postfix());
    }
    println!("  Workers: {}", checked.workers);
    println!("{}", "=".repeat(50));

    let monitor_enabled = config.monitor_enabled();
    let pipeline = match CompressionPipeline::new(LocalStorage::new(), config, codec) {
        Ok(pipeline) => pipeline,
        Err(e) => return report_error(&e),
    };

    if dry_run {
        return perform_dry_run(&pipeline).await;
    }

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = CompressionEngine::new_with_monitoring(
        pipeline,
        Arc::new(LogReporter::default()),
        monitor_enabled,
    );

    let cancel = engine.cancel_handle();
    let finished = Arc::new(AtomicBool::new(false));
    spawn_interrupt_listener(cancel, Arc::clone(&finished));

    let result = engine.run().await;
    finished.store(true, Ordering::SeqCst);

    match result {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) if e.severity() == ErrorSeverity::Low => {
            report_error(&e);
            0
        }
        Err(e) => report_error(&e),
    }
}

/// 第一次 Ctrl-C 取消批次；再按一次或批次已結束時直接結束程式
fn spawn_interrupt_listener(cancel: CancelHandle, finished: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt_should_exit(&cancel, &finished) {
                tracing::error!("⏹️ Aborted");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            tracing::warn!(
                "⏹️ Cancel requested, finishing files in progress (Ctrl-C again to abort)..."
            );
            cancel.cancel();
        }
    });
}

fn interrupt_should_exit(cancel: &CancelHandle, finished: &AtomicBool) -> bool {
    cancel.is_cancelled() || finished.load(Ordering::SeqCst)
}

async fn perform_dry_run<P: Pipeline>(pipeline: &P) -> i32 {
    tracing::info!("🔍 DRY RUN MODE - No files will be written");
    let discovery = match pipeline.discover().await {
        Ok(discovery) => discovery,
        Err(e) => return report_error(&e),
    };

    for task in &discovery.tasks {
        println!("  {} -> {}", task.input.display(), task.output.display());
    }
    if discovery.duplicates_removed > 0 {
        println!("⚠️ Duplicates removed: {}", discovery.duplicates_removed);
    }
    println!("✅ {} file(s) would be compressed", discovery.tasks.len());
    0
}

fn print_outcome(outcome: &RunOutcome) -> i32 {
    let summary = &outcome.summary;

    for path in &outcome.missing {
        println!("⚠️ Skipped missing path: {}", path.display());
    }

    println!("{}", "=".repeat(50));
    if summary.cancelled {
        println!("⏹️ Processing cancelled by user");
    } else {
        println!("✅ Processing complete!");
    }
    println!("📊 Successful: {}, Errors: {}", summary.successful, summary.errors);

    let saved = summary.total_saved_bytes();
    if saved > 0 {
        println!(
            "💾 Saved {} of {}",
            format_file_size(saved as u64),
            format_file_size(summary.total_original_bytes())
        );
    }
    for failure in &summary.failures {
        println!("❌ {}: {}", failure.input.display(), failure.message);
    }
    if let Some(path) = &outcome.report_path {
        println!("📝 Report saved to: {}", path.display());
    }

    if summary.errors > 0 {
        PARTIAL_FAILURE_EXIT_CODE
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BatchSummary, FileFailure};
    use std::path::PathBuf;

    fn outcome(errors: usize) -> RunOutcome {
        RunOutcome {
            summary: BatchSummary {
                total: 2,
                successful: 2 - errors,
                errors,
                failures: (0..errors)
                    .map(|_| FileFailure {
                        input: PathBuf::from("broken.png"),
                        message: "decode failed".to_string(),
                    })
                    .collect(),
                ..Default::default()
            },
            missing: Vec::new(),
            report_path: None,
        }
    }

    #[test]
    fn test_exit_code_reflects_failures() {
        assert_eq!(print_outcome(&outcome(0)), 0);
        assert_eq!(print_outcome(&outcome(1)), PARTIAL_FAILURE_EXIT_CODE);
    }

    #[test]
    fn test_second_interrupt_or_idle_interrupt_exits() {
        let cancel = CancelHandle::new();
        let finished = AtomicBool::new(false);
        assert!(!interrupt_should_exit(&cancel, &finished));

        cancel.cancel();
        assert!(interrupt_should_exit(&cancel, &finished));

        let fresh = CancelHandle::new();
        finished.store(true, Ordering::SeqCst);
        assert!(interrupt_should_exit(&fresh, &finished));
    }

    #[test]
    fn test_report_error_uses_severity() {
        let code = report_error(&CompressError::NoImagesFound);
        assert_eq!(code, 1);
    }
}
