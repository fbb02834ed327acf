pub mod adapters;
#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TomlConfig;

pub use crate::adapters::{codec::ImageRsCodec, reporter::LogReporter, storage::LocalStorage};
pub use crate::core::{engine::CompressionEngine, pipeline::CompressionPipeline};
pub use crate::domain::model::{BatchSummary, CompressionSettings, OutputFormat, Quality};
pub use crate::utils::error::{CompressError, Result};
