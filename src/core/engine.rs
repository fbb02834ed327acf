use crate::domain::model::BatchSummary;
use crate::domain::ports::{CancelHandle, Pipeline, ProgressSink};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: BatchSummary,
    pub missing: Vec<PathBuf>,
    pub report_path: Option<PathBuf>,
}

pub struct CompressionEngine<P: Pipeline> {
    pipeline: P,
    sink: Arc<dyn ProgressSink>,
    cancel: CancelHandle,
    monitor: SystemMonitor,
}

impl<P: Pipeline> CompressionEngine<P> {
    pub fn new(pipeline: P, sink: Arc<dyn ProgressSink>) -> Self {
        Self::new_with_monitoring(pipeline, sink, false)
    }

    pub fn new_with_monitoring(
        pipeline: P,
        sink: Arc<dyn ProgressSink>,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            pipeline,
            sink,
            cancel: CancelHandle::new(),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        self.monitor.log_stats("Start");

        tracing::info!("🔍 Discovering images...");
        let discovery = self.pipeline.discover().await?;
        let missing = discovery.missing.clone();
        tracing::info!("📁 Found {} image(s)", discovery.tasks.len());
        self.monitor.log_stats("Discovery");

        let summary = self
            .pipeline
            .process(discovery, Arc::clone(&self.sink), self.cancel.clone())
            .await?;
        self.monitor.log_stats("Compression");

        let report_path = self.pipeline.report(&summary).await?;
        if let Some(path) = &report_path {
            tracing::info!("📝 Report saved to: {}", path.display());
        }

        self.monitor.log_final_stats(summary.successful + summary.errors);

        Ok(RunOutcome {
            summary,
            missing,
            report_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CompressionTask, Discovery, FileOutcome};
    use crate::domain::ports::NoopSink;
    use crate::utils::error::CompressError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockPipeline {
        images: usize,
        reported: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Pipeline for MockPipeline {
        async fn discover(&self) -> Result<Discovery> {
            if self.images == 0 {
                return Err(CompressError::NoImagesFound);
            }
            Ok(Discovery {
                tasks: (0..self.images)
                    .map(|i| CompressionTask {
                        index: i,
                        input: PathBuf::from(format!("{}.png", i)),
                        output: PathBuf::from(format!("{}.webp", i)),
                    })
                    .collect(),
                duplicates_removed: 0,
                missing: vec![PathBuf::from("gone")],
            })
        }

        async fn process(
            &self,
            discovery: Discovery,
            _sink: Arc<dyn ProgressSink>,
            cancel: CancelHandle,
        ) -> Result<BatchSummary> {
            let outcomes: Vec<FileOutcome> = discovery
                .tasks
                .into_iter()
                .take_while(|_| !cancel.is_cancelled())
                .map(|t| FileOutcome {
                    input: t.input,
                    output: t.output,
                    original_size: 10,
                    compressed_size: 5,
                    saved_bytes: 5,
                    saved_percent: 50.0,
                    original_deleted: false,
                    delete_error: None,
                })
                .collect();
            Ok(BatchSummary {
                total: self.images,
                successful: outcomes.len(),
                cancelled: cancel.is_cancelled(),
                outcomes,
                ..Default::default()
            })
        }

        async fn report(&self, _summary: &BatchSummary) -> Result<Option<PathBuf>> {
            self.reported.fetch_add(1, Ordering::SeqCst);
            Ok(Some(PathBuf::from("report.json")))
        }
    }

    #[tokio::test]
    async fn test_run_executes_all_phases() {
        let engine = CompressionEngine::new(
            MockPipeline {
                images: 3,
                reported: AtomicUsize::new(0),
            },
            Arc::new(NoopSink),
        );

        let outcome = engine.run().await.unwrap();
        assert_eq!(outcome.summary.successful, 3);
        assert_eq!(outcome.missing, vec![PathBuf::from("gone")]);
        assert_eq!(outcome.report_path, Some(PathBuf::from("report.json")));
        assert_eq!(engine.pipeline.reported.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_discovery_error_stops_run() {
        let engine = CompressionEngine::new(
            MockPipeline {
                images: 0,
                reported: AtomicUsize::new(0),
            },
            Arc::new(NoopSink),
        );

        assert!(matches!(engine.run().await, Err(CompressError::NoImagesFound)));
        assert_eq!(engine.pipeline.reported.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_handle_is_shared_with_pipeline() {
        let engine = CompressionEngine::new(
            MockPipeline {
                images: 2,
                reported: AtomicUsize::new(0),
            },
            Arc::new(NoopSink),
        );
        engine.cancel_handle().cancel();

        let outcome = engine.run().await.unwrap();
        assert!(outcome.summary.cancelled);
        assert_eq!(outcome.summary.successful, 0);
    }
}
