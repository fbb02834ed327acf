use crate::domain::model::{
    BatchSummary, CompressionSettings, Discovery, FileFailure, FileOutcome, OutputFormat,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &Path) -> impl std::future::Future<Output = Result<()>> + Send;
    fn file_size(&self, path: &Path) -> impl std::future::Future<Output = Result<u64>> + Send;
    fn exists(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;
    fn is_writable_dir(&self, path: &Path) -> impl std::future::Future<Output = bool> + Send;
    /// 兩個路徑是否指向同一個檔案 (例如大小寫不同但檔案系統不分大小寫)
    fn is_same_file(
        &self,
        a: &Path,
        b: &Path,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn inputs(&self) -> Vec<PathBuf>;
    fn settings(&self) -> Result<CompressionSettings>;
    fn workers(&self) -> usize;
    fn monitor_enabled(&self) -> bool;
    fn report_path(&self) -> Option<PathBuf>;
}

/// 將原始圖片位元組重新編碼為目標格式
pub trait ImageCodec: Send + Sync + 'static {
    fn supports(&self, format: OutputFormat) -> bool;
    fn transcode(&self, input: &[u8], settings: &CompressionSettings) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { total: usize, duplicates: usize },
    FileStarted { input: PathBuf, output: PathBuf },
    FileCompressed(FileOutcome),
    FileFailed(FileFailure),
    Progress { completed: usize, total: usize, percent: u8 },
    Finished(BatchSummary),
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: BatchEvent);
}

/// 不需要進度回報時使用
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_event(&self, _event: BatchEvent) {}
}

/// 共用的取消旗標；設定後不再開始新的檔案，進行中的檔案會完成
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn discover(&self) -> Result<Discovery>;
    async fn process(
        &self,
        discovery: Discovery,
        sink: Arc<dyn ProgressSink>,
        cancel: CancelHandle,
    ) -> Result<BatchSummary>;
    async fn report(&self, summary: &BatchSummary) -> Result<Option<PathBuf>>;
}
