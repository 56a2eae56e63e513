use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Stories Dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// An upload could not be decoded as a delimited text table.
    #[error("Could not read the {file} file: {message}")]
    FileFormat { file: String, message: String },

    /// One or more required columns are absent from the header row.
    #[error("The {file} file is missing required columns: {}", .columns.join(", "))]
    MissingColumns { file: String, columns: Vec<String> },

    /// A cell in a required column could not be interpreted.
    #[error("The {file} file has an invalid value {value:?} in column '{column}' at row {row}: {reason}")]
    InvalidValue {
        file: String,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    /// A filter parameter in the request could not be interpreted.
    #[error("Invalid value {value:?} for filter '{param}'")]
    InvalidQuery { param: String, value: String },

    /// The data (or the current filter) leaves nothing to show.
    #[error("No data available: {0}")]
    NoData(String),

    /// Rendering or serialising a report failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// User-facing error category used for inline messages and HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileFormat,
    Schema,
    InvalidInput,
    NoData,
    Export,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::FileFormat => "file_format_error",
            ErrorKind::Schema => "schema_error",
            ErrorKind::InvalidInput => "bad_request",
            ErrorKind::NoData => "no_data",
            ErrorKind::Export => "export_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl DashboardError {
    /// Map the error onto the user-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::FileFormat { .. } | DashboardError::FileRead { .. } => {
                ErrorKind::FileFormat
            }
            DashboardError::MissingColumns { .. } | DashboardError::InvalidValue { .. } => {
                ErrorKind::Schema
            }
            DashboardError::InvalidQuery { .. } => ErrorKind::InvalidInput,
            DashboardError::NoData(_) => ErrorKind::NoData,
            DashboardError::Export(_) => ErrorKind::Export,
            DashboardError::Config(_) | DashboardError::Io(_) | DashboardError::Other(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Shorthand for an [`DashboardError::Export`] built from any displayable error.
    pub fn export(err: impl std::fmt::Display) -> Self {
        DashboardError::Export(err.to_string())
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
