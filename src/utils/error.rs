use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Worker task failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unsupported output format '{value}'. Supported formats: {supported}")]
    UnsupportedFormat { value: String, supported: String },

    #[error("{format} codec failed: {message}")]
    CodecFailed { format: String, message: String },

    #[error("No encoder available for {format}")]
    EncoderUnavailable { format: String },

    #[error("Input path does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("No supported images found in the given paths")]
    NoImagesFound,

    #[error("No write permission for directory: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Output file was not created: {}", path.display())]
    OutputMissing { path: PathBuf },

    #[error("Processing cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Codec,
    Io,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 依嚴重程度對應的程序退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl CompressError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompressError::ConfigError { .. }
            | CompressError::ConfigValidationError { .. }
            | CompressError::InvalidConfigValueError { .. }
            | CompressError::MissingConfigError { .. }
            | CompressError::UnsupportedFormat { .. } => ErrorCategory::Configuration,
            CompressError::InputNotFound { .. } | CompressError::NoImagesFound => {
                ErrorCategory::Input
            }
            CompressError::ImageError(_)
            | CompressError::CodecFailed { .. }
            | CompressError::EncoderUnavailable { .. } => ErrorCategory::Codec,
            CompressError::IoError(_)
            | CompressError::PermissionDenied { .. }
            | CompressError::OutputMissing { .. } => ErrorCategory::Io,
            CompressError::SerializationError(_) | CompressError::Cancelled => {
                ErrorCategory::Processing
            }
            CompressError::JoinError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CompressError::Cancelled => ErrorSeverity::Low,
            CompressError::ImageError(_)
            | CompressError::CodecFailed { .. }
            | CompressError::OutputMissing { .. } => ErrorSeverity::Medium,
            CompressError::JoinError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CompressError::ConfigError { .. }
            | CompressError::ConfigValidationError { .. }
            | CompressError::InvalidConfigValueError { .. }
            | CompressError::MissingConfigError { .. } => {
                "Check the command line arguments or the TOML configuration file".to_string()
            }
            CompressError::UnsupportedFormat { supported, .. } => {
                format!("Choose one of: {}", supported)
            }
            CompressError::EncoderUnavailable { format } if format == "AVIF" => {
                "Rebuild with the 'avif' feature enabled, or pick WEBP/JPEG".to_string()
            }
            CompressError::EncoderUnavailable { format } if format == "HEIF" => {
                "Rebuild with the 'heif' feature enabled (needs libheif), or pick WEBP/AVIF/JPEG"
                    .to_string()
            }
            CompressError::EncoderUnavailable { .. } => {
                "Pick an output format with an available encoder (WEBP, AVIF or JPEG)".to_string()
            }
            CompressError::InputNotFound { .. } => {
                "Make sure the path exists; surrounding quotes are stripped automatically"
                    .to_string()
            }
            CompressError::NoImagesFound => {
                "Supported inputs are .jpg, .jpeg, .png, .heic, .heif and .avif".to_string()
            }
            CompressError::PermissionDenied { .. } => {
                "Grant write access to the folder or move the images elsewhere".to_string()
            }
            CompressError::ImageError(_) | CompressError::CodecFailed { .. } => {
                "The file may be corrupt or use an encoding that cannot be decoded".to_string()
            }
            CompressError::IoError(_) | CompressError::OutputMissing { .. } => {
                "Check free disk space and file permissions".to_string()
            }
            CompressError::SerializationError(_) => {
                "Check that the report path is writable".to_string()
            }
            CompressError::JoinError(_) => "Re-run with --verbose and report the issue".to_string(),
            CompressError::Cancelled => "Run again to process the remaining files".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CompressError::InputNotFound { path } => {
                format!("指定的路徑不存在: {}", path.display())
            }
            CompressError::NoImagesFound => "找不到可處理的圖片".to_string(),
            CompressError::EncoderUnavailable { format } => {
                format!("{} 編碼器不可用", format)
            }
            CompressError::Cancelled => "處理已被使用者取消".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressError>;
