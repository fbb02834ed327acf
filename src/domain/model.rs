use crate::utils::error::{CompressError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// 可作為輸入的副檔名（小寫比對）
pub const SUPPORTED_INPUT_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "heic", "heif", "avif"];

pub const DEFAULT_POSTFIX: &str = "_compressed";
pub const DEFAULT_QUALITY: u8 = 80;
pub const DEFAULT_AVIF_SPEED: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutputFormat {
    Heif,
    Webp,
    Avif,
    Jpeg,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Heif,
        OutputFormat::Webp,
        OutputFormat::Avif,
        OutputFormat::Jpeg,
    ];

    pub fn parse(value: &str) -> Result<Self> {
        let wanted = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|format| format.name() == wanted)
            .ok_or_else(|| CompressError::UnsupportedFormat {
                value: value.to_string(),
                supported: Self::ALL.map(|f| f.name()).join(", "),
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Heif => "HEIF",
            OutputFormat::Webp => "WEBP",
            OutputFormat::Avif => "AVIF",
            OutputFormat::Jpeg => "JPEG",
        }
    }

    /// 輸出檔案的副檔名，含前導點
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Heif => ".heic",
            OutputFormat::Webp => ".webp",
            OutputFormat::Avif => ".avif",
            OutputFormat::Jpeg => ".jpg",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            OutputFormat::Heif => "high compression efficiency",
            OutputFormat::Webp => "good compatibility and quality",
            OutputFormat::Avif => "newest format with the strongest compression",
            OutputFormat::Jpeg => "universal standard format",
        }
    }

    /// 互動選單的編號：1=HEIF 2=WEBP 3=AVIF 4=JPEG，其他輸入使用預設
    pub fn from_menu_choice(choice: &str, default: OutputFormat) -> Self {
        match choice.trim() {
            "1" => OutputFormat::Heif,
            "2" => OutputFormat::Webp,
            "3" => OutputFormat::Avif,
            "4" => OutputFormat::Jpeg,
            _ => default,
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Webp
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self> {
        crate::utils::validation::validate_range("quality", value, 0, Self::MAX)?;
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_QUALITY)
    }
}

impl TryFrom<u8> for Quality {
    type Error = CompressError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionSettings {
    pub format: OutputFormat,
    pub quality: Quality,
    pub avif_speed: u8,
    pub delete_original: bool,
    postfix: String,
}

impl CompressionSettings {
    pub fn new(format: OutputFormat, quality: Quality) -> Self {
        Self {
            format,
            quality,
            avif_speed: DEFAULT_AVIF_SPEED,
            delete_original: false,
            postfix: DEFAULT_POSTFIX.to_string(),
        }
    }

    pub fn with_delete_original(mut self, delete_original: bool) -> Self {
        self.delete_original = delete_original;
        self
    }

    pub fn with_avif_speed(mut self, speed: u8) -> Self {
        self.avif_speed = speed;
        self
    }

    /// 空白後綴會退回預設值 `_compressed`
    pub fn with_postfix(mut self, postfix: &str) -> Self {
        let trimmed = postfix.trim();
        self.postfix = if trimmed.is_empty() {
            DEFAULT_POSTFIX.to_string()
        } else {
            trimmed.to_string()
        };
        self
    }

    pub fn postfix(&self) -> &str {
        &self.postfix
    }
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self::new(OutputFormat::default(), Quality::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionTask {
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub tasks: Vec<CompressionTask>,
    pub duplicates_removed: usize,
    pub missing: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
    pub saved_bytes: i64,
    pub saved_percent: f64,
    pub original_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_error: Option<String>,
}

impl FileOutcome {
    pub fn size_increased(&self) -> bool {
        self.saved_percent <= 0.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub input: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub errors: usize,
    pub duplicates_removed: usize,
    pub cancelled: bool,
    pub outcomes: Vec<FileOutcome>,
    pub failures: Vec<FileFailure>,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn total_saved_bytes(&self) -> i64 {
        self.outcomes.iter().map(|o| o.saved_bytes).sum()
    }

    pub fn total_original_bytes(&self) -> u64 {
        self.outcomes.iter().map(|o| o.original_size).sum()
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_case_insensitive() {
        assert_eq!(OutputFormat::parse("webp").unwrap(), OutputFormat::Webp);
        assert_eq!(OutputFormat::parse(" Avif ").unwrap(), OutputFormat::Avif);
        assert_eq!(OutputFormat::parse("JPEG").unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::parse("heif").unwrap(), OutputFormat::Heif);
    }

    #[test]
    fn test_parse_unknown_format_lists_supported() {
        let err = OutputFormat::parse("gif").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("gif"));
        assert!(message.contains("HEIF, WEBP, AVIF, JPEG"));
    }

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormat::Heif.extension(), ".heic");
        assert_eq!(OutputFormat::Webp.extension(), ".webp");
        assert_eq!(OutputFormat::Avif.extension(), ".avif");
        assert_eq!(OutputFormat::Jpeg.extension(), ".jpg");
    }

    #[test]
    fn test_menu_choice_falls_back_to_default() {
        assert_eq!(
            OutputFormat::from_menu_choice("3", OutputFormat::Webp),
            OutputFormat::Avif
        );
        assert_eq!(
            OutputFormat::from_menu_choice("", OutputFormat::Webp),
            OutputFormat::Webp
        );
        assert_eq!(
            OutputFormat::from_menu_choice("9", OutputFormat::Jpeg),
            OutputFormat::Jpeg
        );
    }

    #[test]
    fn test_quality_range() {
        assert!(Quality::new(0).is_ok());
        assert!(Quality::new(100).is_ok());
        assert!(Quality::new(101).is_err());
    }

    #[test]
    fn test_postfix_falls_back_when_blank() {
        let settings = CompressionSettings::default().with_postfix("   ");
        assert_eq!(settings.postfix(), DEFAULT_POSTFIX);

        let settings = CompressionSettings::default().with_postfix(" _small ");
        assert_eq!(settings.postfix(), "_small");
    }

    #[test]
    fn test_summary_serializes_elapsed_as_seconds() {
        let summary = BatchSummary {
            total: 1,
            elapsed: Duration::from_millis(1500),
            ..Default::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["elapsed"], 1.5);
        assert_eq!(json["cancelled"], false);
    }
}
