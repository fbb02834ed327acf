use crate::domain::model::CompressionSettings;
use crate::domain::ports::{ConfigProvider, ImageCodec};
use crate::utils::error::{CompressError, Result};
use crate::utils::validation::{validate_positive_number, validate_postfix};
use std::path::PathBuf;

/// 通過檢查後實際會使用的輸入與設定
#[derive(Debug, Clone)]
pub struct PreflightReport {
    pub inputs: Vec<PathBuf>,
    pub settings: CompressionSettings,
    pub workers: usize,
}

pub fn check_inputs(inputs: &[PathBuf]) -> Result<()> {
    if inputs.is_empty() {
        return Err(CompressError::MissingConfigError {
            field: "inputs".to_string(),
        });
    }
    match inputs.iter().find(|path| !path.exists()) {
        Some(path) => Err(CompressError::InputNotFound { path: path.clone() }),
        None => Ok(()),
    }
}

pub fn check_encoder<K: ImageCodec + ?Sized>(codec: &K, settings: &CompressionSettings) -> Result<()> {
    if codec.supports(settings.format) {
        Ok(())
    } else {
        Err(CompressError::EncoderUnavailable {
            format: settings.format.name().to_string(),
        })
    }
}

/// 依序執行所有前置檢查，遇到第一個失敗就中止
pub fn run<C: ConfigProvider + ?Sized, K: ImageCodec + ?Sized>(
    config: &C,
    codec: &K,
) -> Result<PreflightReport> {
    let inputs = config.inputs();
    check_inputs(&inputs)?;
    tracing::debug!("✅ {} input path(s) found", inputs.len());

    let settings = config.settings()?;
    check_encoder(codec, &settings)?;
    tracing::debug!("✅ Encoder available for {}", settings.format);

    let workers = config.workers();
    validate_positive_number("workers", workers, 1)?;
    validate_postfix("postfix", settings.postfix())?;

    Ok(PreflightReport {
        inputs,
        settings,
        workers,
    })
}
