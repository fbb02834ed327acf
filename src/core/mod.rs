pub mod discovery;
pub mod engine;
pub mod naming;
pub mod pipeline;
pub mod preflight;

pub use crate::domain::model::{BatchSummary, CompressionSettings, Discovery, OutputFormat};
pub use crate::domain::ports::{CancelHandle, ConfigProvider, ImageCodec, Pipeline, Storage};
pub use crate::utils::error::Result;
