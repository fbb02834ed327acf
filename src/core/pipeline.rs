use crate::core::discovery::{collect_images, dedup_preserving_order};
use crate::core::naming::plan_output;
use crate::domain::model::{
    BatchSummary, CompressionSettings, CompressionTask, Discovery, FileFailure, FileOutcome,
};
use crate::domain::ports::{
    BatchEvent, CancelHandle, ConfigProvider, ImageCodec, Pipeline, ProgressSink, Storage,
};
use crate::utils::error::{CompressError, Result};
use crate::utils::size::{format_file_size, savings_info};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct CompressionPipeline<S: Storage, C: ConfigProvider, K: ImageCodec> {
    storage: Arc<S>,
    config: C,
    codec: Arc<K>,
    settings: CompressionSettings,
}

impl<S, C, K> CompressionPipeline<S, C, K>
where
    S: Storage + 'static,
    C: ConfigProvider,
    K: ImageCodec,
{
    pub fn new(storage: S, config: C, codec: K) -> Result<Self> {
        let settings = config.settings()?;
        Ok(Self {
            storage: Arc::new(storage),
            config,
            codec: Arc::new(codec),
            settings,
        })
    }

    pub fn settings(&self) -> &CompressionSettings {
        &self.settings
    }

    /// 依輸入建立任務；若輸出會覆蓋其他輸入或前面任務的輸出，改用後綴檔名。
    /// 比對不分大小寫，因為目標檔案系統可能不分大小寫。
    fn plan_tasks(&self, images: Vec<PathBuf>) -> Vec<CompressionTask> {
        let inputs: HashSet<String> = images.iter().map(|p| fold_case(p)).collect();
        let mut claimed: HashSet<String> = HashSet::new();
        let mut tasks = Vec::with_capacity(images.len());

        for (index, input) in images.into_iter().enumerate() {
            let planned = plan_output(&input, &self.settings);
            let own = fold_case(&input);
            let taken = |candidate: &Path, claimed: &HashSet<String>| {
                let key = fold_case(candidate);
                (key != own && inputs.contains(&key)) || claimed.contains(&key)
            };

            let mut output = planned.clone();
            let mut attempt = 1;
            while taken(&output, &claimed) {
                output = postfixed(&input, &self.settings, attempt);
                attempt += 1;
            }
            if output != planned {
                tracing::warn!(
                    "⚠️ Output {} would overwrite another file, using {}",
                    planned.display(),
                    output.display()
                );
            }

            claimed.insert(fold_case(&output));
            tasks.push(CompressionTask {
                index,
                input,
                output,
            });
        }

        tasks
    }
}

fn fold_case(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// 第一次嘗試使用 `stem + postfix`，之後加上編號
fn postfixed(input: &Path, settings: &CompressionSettings, attempt: usize) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = if attempt <= 1 {
        format!("{}{}{}", stem, settings.postfix(), settings.format.extension())
    } else {
        format!(
            "{}{}_{}{}",
            stem,
            settings.postfix(),
            attempt,
            settings.format.extension()
        )
    };
    input.with_file_name(name)
}

fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 壓縮單一檔案：讀取 → 轉碼 → 寫入 → 驗證 → 統計 → (選擇性) 刪除原檔
async fn compress_one<S: Storage, K: ImageCodec>(
    storage: &S,
    codec: Arc<K>,
    settings: &CompressionSettings,
    task: &CompressionTask,
) -> Result<FileOutcome> {
    let dir = output_dir(&task.output);
    if !storage.is_writable_dir(dir).await {
        return Err(CompressError::PermissionDenied {
            path: dir.to_path_buf(),
        });
    }

    let bytes = storage.read_file(&task.input).await?;
    let original_size = bytes.len() as u64;

    let encode_settings = settings.clone();
    let encoded =
        tokio::task::spawn_blocking(move || codec.transcode(&bytes, &encode_settings)).await??;

    storage.write_file(&task.output, &encoded).await?;

    if !storage.exists(&task.output).await {
        return Err(CompressError::OutputMissing {
            path: task.output.clone(),
        });
    }

    let compressed_size = storage.file_size(&task.output).await?;
    let (saved_bytes, saved_percent) = savings_info(original_size, compressed_size);

    let mut outcome = FileOutcome {
        input: task.input.clone(),
        output: task.output.clone(),
        original_size,
        compressed_size,
        saved_bytes,
        saved_percent,
        original_deleted: false,
        delete_error: None,
    };

    if outcome.size_increased() {
        tracing::info!(
            "✅ {} -> {} (size increased)",
            display_name(&task.input),
            display_name(&task.output)
        );
    } else {
        tracing::info!(
            "✅ {} -> {}",
            display_name(&task.input),
            display_name(&task.output)
        );
        tracing::info!(
            "   💾 Saved: {} bytes ({:.1}%), {} -> {}",
            saved_bytes,
            saved_percent,
            format_file_size(original_size),
            format_file_size(compressed_size)
        );
    }

    if settings.delete_original && task.input != task.output {
        delete_original(storage, task, &mut outcome).await;
    }

    Ok(outcome)
}

/// 刪除原檔；輸出若與原檔是同一個檔案 (只差大小寫) 則不刪除
async fn delete_original<S: Storage>(
    storage: &S,
    task: &CompressionTask,
    outcome: &mut FileOutcome,
) {
    match storage.is_same_file(&task.input, &task.output).await {
        Ok(true) => {
            tracing::debug!(
                "Output replaced {} in place, nothing to delete",
                display_name(&task.input)
            );
            return;
        }
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(
                "⚠️ Could not compare {} with its output, keeping it: {}",
                display_name(&task.input),
                e
            );
            outcome.delete_error = Some(e.to_string());
            return;
        }
    }

    match storage.remove_file(&task.input).await {
        Ok(()) => {
            outcome.original_deleted = true;
            tracing::info!("🗑️ Deleted original file: {}", display_name(&task.input));
        }
        Err(e) => {
            tracing::warn!(
                "⚠️ Could not delete original {}: {}",
                display_name(&task.input),
                e
            );
            outcome.delete_error = Some(e.to_string());
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: String,
    format: &'a str,
    quality: u8,
    delete_original: bool,
    total_saved_bytes: i64,
    summary: &'a BatchSummary,
}

#[async_trait::async_trait]
impl<S, C, K> Pipeline for CompressionPipeline<S, C, K>
where
    S: Storage + 'static,
    C: ConfigProvider,
    K: ImageCodec,
{
    async fn discover(&self) -> Result<Discovery> {
        let inputs = self.config.inputs();
        tracing::debug!("Scanning {} input path(s)", inputs.len());

        let collected = collect_images(&inputs);
        let (unique, duplicates_removed) = dedup_preserving_order(collected.images);
        if duplicates_removed > 0 {
            tracing::warn!("⚠️ Removed duplicate files: {}", duplicates_removed);
        }

        if unique.is_empty() {
            return Err(CompressError::NoImagesFound);
        }

        Ok(Discovery {
            tasks: self.plan_tasks(unique),
            duplicates_removed,
            missing: collected.missing,
        })
    }

    async fn process(
        &self,
        discovery: Discovery,
        sink: Arc<dyn ProgressSink>,
        cancel: CancelHandle,
    ) -> Result<BatchSummary> {
        let started = Instant::now();
        let total = discovery.tasks.len();
        let workers = self.config.workers().max(1);

        sink.on_event(BatchEvent::Started {
            total,
            duplicates: discovery.duplicates_removed,
        });
        tracing::debug!("Processing {} file(s) with {} worker(s)", total, workers);

        let semaphore = Arc::new(Semaphore::new(workers));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut join_set = JoinSet::new();

        for task in discovery.tasks {
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&completed);
            let storage = Arc::clone(&self.storage);
            let codec = Arc::clone(&self.codec);
            let settings = self.settings.clone();
            let sink = Arc::clone(&sink);
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (task, Err(CompressError::Cancelled));
                };
                if cancel.is_cancelled() {
                    return (task, Err(CompressError::Cancelled));
                }

                tracing::debug!("🔄 Processing: {}", task.input.display());
                tracing::debug!("📁 Output path: {}", task.output.display());
                sink.on_event(BatchEvent::FileStarted {
                    input: task.input.clone(),
                    output: task.output.clone(),
                });

                let result = compress_one(storage.as_ref(), codec, &settings, &task).await;
                match &result {
                    Ok(outcome) => sink.on_event(BatchEvent::FileCompressed(outcome.clone())),
                    Err(e) => {
                        tracing::error!("❌ Error {}: {}", display_name(&task.input), e);
                        sink.on_event(BatchEvent::FileFailed(FileFailure {
                            input: task.input.clone(),
                            message: e.to_string(),
                        }));
                    }
                }

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                sink.on_event(BatchEvent::Progress {
                    completed: done,
                    total,
                    percent: (done * 100 / total) as u8,
                });

                (task, result)
            });
        }

        let mut results = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            results.push(joined?);
        }
        results.sort_by_key(|(task, _)| task.index);

        let mut summary = BatchSummary {
            total,
            duplicates_removed: discovery.duplicates_removed,
            ..Default::default()
        };
        for (task, result) in results {
            match result {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(CompressError::Cancelled) => {}
                Err(e) => summary.failures.push(FileFailure {
                    input: task.input,
                    message: e.to_string(),
                }),
            }
        }
        summary.successful = summary.outcomes.len();
        summary.errors = summary.failures.len();
        summary.cancelled = cancel.is_cancelled();
        summary.elapsed = started.elapsed();

        sink.on_event(BatchEvent::Finished(summary.clone()));
        Ok(summary)
    }

    async fn report(&self, summary: &BatchSummary) -> Result<Option<PathBuf>> {
        let Some(path) = self.config.report_path() else {
            return Ok(None);
        };

        let report = Report {
            generated_at: chrono::Utc::now().to_rfc3339(),
            format: self.settings.format.name(),
            quality: self.settings.quality.value(),
            delete_original: self.settings.delete_original,
            total_saved_bytes: summary.total_saved_bytes(),
            summary,
        };
        let json = serde_json::to_string_pretty(&report)?;

        tracing::debug!("Writing report ({} bytes) to {}", json.len(), path.display());
        self.storage.write_file(&path, json.as_bytes()).await?;
        Ok(Some(path))
    }
}
