use crate::config::default_workers;
use crate::core::discovery::strip_quotes;
use crate::core::ConfigProvider;
use crate::domain::model::{
    CompressionSettings, OutputFormat, Quality, DEFAULT_AVIF_SPEED, DEFAULT_POSTFIX,
    DEFAULT_QUALITY,
};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_paths, validate_positive_number, validate_postfix, validate_range, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "imgcompress")]
#[command(about = "Compress images into WEBP, AVIF or JPEG next to the originals")]
pub struct CliConfig {
    /// Files or directories to compress (directories are scanned recursively).
    /// Leave empty for interactive mode.
    pub inputs: Vec<String>,

    /// Output format: HEIF, WEBP, AVIF or JPEG
    #[arg(short, long, default_value = "WEBP")]
    pub format: String,

    /// Compression quality (0-100)
    #[arg(short, long, default_value_t = DEFAULT_QUALITY,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: u8,

    /// Delete the original file after a successful compression
    #[arg(long)]
    pub delete_original: bool,

    /// Postfix added to the file name when input and output extensions match
    #[arg(long, default_value = DEFAULT_POSTFIX)]
    pub postfix: String,

    /// Number of files processed in parallel (defaults to the CPU count)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// AVIF encoder speed (1 = slowest/best, 10 = fastest)
    #[arg(long, default_value_t = DEFAULT_AVIF_SPEED)]
    pub avif_speed: u8,

    /// Write a JSON report of the run to this path
    #[arg(long)]
    pub report: Option<String>,

    #[arg(long, help = "Log CPU and memory usage")]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Wait for Enter before exiting")]
    pub pause: bool,

    #[arg(long, help = "List the planned outputs without compressing")]
    pub dry_run: bool,
}

impl CliConfig {
    pub fn is_interactive(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl ConfigProvider for CliConfig {
    fn inputs(&self) -> Vec<PathBuf> {
        self.inputs.iter().map(|raw| strip_quotes(raw)).collect()
    }

    fn settings(&self) -> Result<CompressionSettings> {
        let settings = CompressionSettings::new(
            OutputFormat::parse(&self.format)?,
            Quality::new(self.quality)?,
        )
        .with_delete_original(self.delete_original)
        .with_avif_speed(self.avif_speed)
        .with_postfix(&self.postfix);
        Ok(settings)
    }

    fn workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers)
    }

    fn monitor_enabled(&self) -> bool {
        self.monitor
    }

    fn report_path(&self) -> Option<PathBuf> {
        self.report.as_deref().map(strip_quotes)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_paths("inputs", &self.inputs)?;
        OutputFormat::parse(&self.format)?;
        validate_range("quality", self.quality, 0, Quality::MAX)?;
        validate_range("avif_speed", self.avif_speed, 1, 10)?;
        validate_positive_number("workers", self.workers(), 1)?;
        validate_postfix("postfix", &self.postfix)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = CliConfig::parse_from(["imgcompress", "photos"]);
        assert_eq!(config.inputs, vec!["photos"]);
        assert_eq!(config.quality, 80);
        assert_eq!(config.postfix, "_compressed");
        assert!(!config.is_interactive());

        let settings = config.settings().unwrap();
        assert_eq!(settings.format, OutputFormat::Webp);
        assert!(!settings.delete_original);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_arguments() {
        let config = CliConfig::parse_from([
            "imgcompress",
            "\"a dir\"",
            "b.png",
            "--format",
            "avif",
            "-q",
            "35",
            "--delete-original",
            "--workers",
            "3",
            "--report",
            "out.json",
        ]);
        assert_eq!(
            config.inputs(),
            vec![PathBuf::from("a dir"), PathBuf::from("b.png")]
        );
        let settings = config.settings().unwrap();
        assert_eq!(settings.format, OutputFormat::Avif);
        assert_eq!(settings.quality.value(), 35);
        assert!(settings.delete_original);
        assert_eq!(ConfigProvider::workers(&config), 3);
        assert_eq!(config.report_path(), Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_quality_out_of_range_rejected_by_parser() {
        assert!(CliConfig::try_parse_from(["imgcompress", "x", "-q", "101"]).is_err());
    }

    #[test]
    fn test_validation_catches_bad_values() {
        let mut config = CliConfig::parse_from(["imgcompress", "x"]);
        config.format = "bmp".to_string();
        assert!(config.validate().is_err());

        let mut config = CliConfig::parse_from(["imgcompress", "x"]);
        config.workers = Some(0);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["imgcompress"]);
        assert!(config.is_interactive());
        assert!(config.validate().is_err());
    }
}
