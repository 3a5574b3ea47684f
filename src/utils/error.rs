use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurateError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

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

    #[error("Cannot parse '{value}' as a number in column '{column}' (row {row})")]
    ParseError {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Schema error in column '{column}' (row {row}): {message}")]
    SchemaError {
        column: String,
        row: usize,
        message: String,
    },

    #[error("Column '{column}' not found in {table} table")]
    MissingColumn { table: String, column: String },

    #[error("Header '{label}' appears more than once after normalization")]
    HeaderCollision { label: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Data,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CurateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CurateError::ConfigError { .. }
            | CurateError::ConfigValidationError { .. }
            | CurateError::InvalidConfigValueError { .. }
            | CurateError::MissingConfigError { .. }
            | CurateError::HeaderCollision { .. } => ErrorCategory::Configuration,
            CurateError::CsvError(_) | CurateError::IoError(_) => ErrorCategory::Input,
            CurateError::ParseError { .. }
            | CurateError::SchemaError { .. }
            | CurateError::MissingColumn { .. } => ErrorCategory::Data,
            CurateError::ZipError(_) | CurateError::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Input => ErrorSeverity::Critical,
            ErrorCategory::Output => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CurateError::ParseError { column, .. } => format!(
                "Fix the cell in column '{}' so it holds a number like 12,5 or n/a, then re-run",
                column
            ),
            CurateError::SchemaError { column, .. } => format!(
                "Column '{}' must hold whole numbers; check the sheet for decimals or blanks",
                column
            ),
            CurateError::MissingColumn { column, .. } => format!(
                "Add a '{}' column to the sheet or check the header spelling",
                column
            ),
            CurateError::HeaderCollision { label } => format!(
                "Rename one of the columns that normalize to '{}'",
                label
            ),
            CurateError::CsvError(_) => {
                "Check the sheet export and the configured delimiter".to_string()
            }
            CurateError::IoError(_) => "Check that the input files exist and are readable".to_string(),
            CurateError::ZipError(_) | CurateError::SerializationError(_) => {
                "Check the output directory and available disk space".to_string()
            }
            CurateError::ConfigError { .. }
            | CurateError::ConfigValidationError { .. }
            | CurateError::InvalidConfigValueError { .. }
            | CurateError::MissingConfigError { .. } => {
                "Review the configuration file and command-line flags".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read input: {}", self),
            ErrorCategory::Data => format!("Dataset is malformed: {}", self),
            ErrorCategory::Output => format!("Could not write output: {}", self),
        }
    }

    /// 程式結束碼，依嚴重程度決定
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, CurateError>;
