use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Input header is missing required columns: {}", .columns.join(", "))]
    MissingColumnsError { columns: Vec<String> },

    #[error("Unknown time zone: {zone}")]
    InvalidTimeZoneError { zone: String },

    #[error("Bulk load of {rows} rows failed: {message}")]
    LoadError { rows: usize, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Database,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidTimeZoneError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_) | EtlError::IoError(_) | EtlError::MissingColumnsError { .. } => {
                ErrorCategory::Input
            }
            EtlError::DatabaseError(_) | EtlError::LoadError { .. } => ErrorCategory::Database,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::Database => ErrorSeverity::Critical,
        }
    }

    /// 程序結束碼：設定錯誤為 1，處理過程中的錯誤為 2
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            _ => 2,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::CsvError(_) => "Check that the input file is well-formed delimited text",
            EtlError::IoError(_) => "Check that the file paths exist and are readable/writable",
            EtlError::DatabaseError(_) | EtlError::LoadError { .. } => {
                "Check the database connection and that the target table matches the expected schema"
            }
            EtlError::MissingConfigError { .. } | EtlError::ConfigError { .. } => {
                "Set the value in the config file or via the DATABASE_URL environment variable"
            }
            EtlError::InvalidConfigValueError { .. } | EtlError::ConfigValidationError { .. } => {
                "Fix the reported configuration value and run again"
            }
            EtlError::MissingColumnsError { .. } => {
                "Make sure the input header contains the pickup, dropoff and passenger count columns"
            }
            EtlError::InvalidTimeZoneError { .. } => {
                "Use an IANA time zone name such as America/New_York"
            }
            EtlError::ProcessingError { .. } => "Re-run with --verbose for more details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("ERROR: {} is missing. Add it to the config file", field)
            }
            EtlError::MissingColumnsError { columns } => {
                format!("ERROR: input file has no column(s): {}", columns.join(", "))
            }
            EtlError::DatabaseError(e) => format!("ETL failed: database error: {}", e),
            other => format!("ETL failed: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
