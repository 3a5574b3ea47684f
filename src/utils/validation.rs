use crate::utils::error::{CurateError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CurateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CurateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => {}
            Some(extension) => {
                return Err(CurateError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(CurateError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| CurateError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CurateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
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
        return Err(CurateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 分隔符號必須是單一 ASCII 字元
pub fn validate_delimiter(field_name: &str, delimiter: &str) -> Result<u8> {
    match delimiter.as_bytes() {
        [byte] if byte.is_ascii() && !byte.is_ascii_alphanumeric() => Ok(*byte),
        _ => Err(CurateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: delimiter.to_string(),
            reason: "Delimiter must be a single ASCII punctuation or whitespace character"
                .to_string(),
        }),
    }
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    let valid_formats = ["json", "csv"];
    if formats.is_empty() {
        return Err(CurateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }
    for format in formats {
        if !valid_formats.contains(&format.as_str()) {
            return Err(CurateError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    valid_formats.join(", ")
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("export.output_path", "./output").is_ok());
        assert!(validate_path("export.output_path", "").is_err());
        assert!(validate_path("export.output_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = ["dataset/mpa_fish.csv", "dataset/mpa_site.TSV"];
        assert!(validate_file_extensions("sources", &files, &["csv", "tsv"]).is_ok());

        let invalid_files = ["dataset/mpa_fish.xlsx"];
        assert!(validate_file_extensions("sources", &invalid_files, &["csv", "tsv"]).is_err());

        let no_extension = ["dataset/mpa_fish"];
        assert!(validate_file_extensions("sources", &no_extension, &["csv"]).is_err());
    }

    #[test]
    fn test_validate_delimiter() {
        assert_eq!(validate_delimiter("sources.delimiter", ";").unwrap(), b';');
        assert_eq!(validate_delimiter("sources.delimiter", "\t").unwrap(), b'\t');
        assert!(validate_delimiter("sources.delimiter", "ab").is_err());
        assert!(validate_delimiter("sources.delimiter", "a").is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        assert!(validate_output_formats("export.formats", &["json".to_string()]).is_ok());
        assert!(validate_output_formats("export.formats", &["xlsx".to_string()]).is_err());
        assert!(validate_output_formats("export.formats", &[]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("curation.drop_trailing_site_columns", 8, 0, 8).is_ok());
        assert!(validate_range("curation.drop_trailing_site_columns", 9, 0, 8).is_err());
        assert!(validate_range("visibility", -0.5, 0.0, 40.0).is_err());
    }
}
