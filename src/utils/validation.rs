use crate::utils::error::{CompressError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(CompressError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CompressError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_paths(field_name: &str, paths: &[String]) -> Result<()> {
    if paths.is_empty() {
        return Err(CompressError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    paths
        .iter()
        .try_for_each(|path| validate_path(field_name, path))
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(CompressError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(CompressError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 後綴會直接拼進檔名，不允許路徑分隔符
pub fn validate_postfix(field_name: &str, postfix: &str) -> Result<()> {
    if postfix.contains(['/', '\\', '\0']) {
        return Err(CompressError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: postfix.to_string(),
            reason: "Postfix cannot contain path separators".to_string(),
        });
    }
    Ok(())
}
