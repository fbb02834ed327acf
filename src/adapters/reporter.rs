use crate::domain::ports::{BatchEvent, ProgressSink};
use crate::utils::size::format_file_size;
use std::sync::atomic::{AtomicU8, Ordering};

/// 將批次事件轉成日誌輸出；進度只在跨過 `step` 百分比時記錄一次
pub struct LogReporter {
    step: u8,
    last_logged: AtomicU8,
}

impl LogReporter {
    pub fn new(step: u8) -> Self {
        Self {
            step: step.max(1),
            last_logged: AtomicU8::new(0),
        }
    }

    fn should_log_progress(&self, percent: u8) -> bool {
        let bucket = if percent >= 100 {
            100
        } else {
            percent / self.step * self.step
        };
        let previous = self.last_logged.fetch_max(bucket, Ordering::SeqCst);
        bucket > previous
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressSink for LogReporter {
    fn on_event(&self, event: BatchEvent) {
        match event {
            BatchEvent::Started { total, duplicates } => {
                tracing::info!("🚀 Starting compression of {} file(s)...", total);
                if duplicates > 0 {
                    tracing::warn!("⚠️ Duplicates removed: {}", duplicates);
                }
            }
            BatchEvent::FileStarted { input, .. } => {
                tracing::debug!("🔄 Started: {}", input.display());
            }
            BatchEvent::FileCompressed(_) | BatchEvent::FileFailed(_) => {}
            BatchEvent::Progress {
                completed,
                total,
                percent,
            } => {
                if self.should_log_progress(percent) {
                    tracing::info!("📊 Progress: {}% ({}/{})", percent, completed, total);
                }
            }
            BatchEvent::Finished(summary) => {
                if summary.cancelled {
                    tracing::warn!("⏹️ Processing cancelled by user");
                }
                tracing::info!(
                    "📊 Successful: {}, Errors: {}",
                    summary.successful,
                    summary.errors
                );
                let saved = summary.total_saved_bytes();
                if saved > 0 {
                    tracing::info!(
                        "💾 Total saved: {} of {}",
                        format_file_size(saved as u64),
                        format_file_size(summary.total_original_bytes())
                    );
                }
            }
        }
    }
}
