//! BAS Processor Library
//!
//! A Rust library for converting vendor building-automation export files
//! (CSV and plain-text platform dumps) into normalized, strongly-typed
//! records suitable for health analysis, alerting and reporting.
//!
//! This library provides tools for:
//! - Detecting which of several loosely-structured export formats a file
//!   belongs to, with a heuristic confidence score and reasons
//! - Tokenizing RFC-4180-ish CSV content with quoted fields and BOM handling
//! - Parsing compound device statuses, capacity-with-limit values, memory,
//!   duration and vendor timestamp strings into typed values
//! - One parser per supported export format, producing a common Dataset shape
//! - Cross-dataset analysis combining platform, resource and inventory
//!   exports into a single health report with threshold-based alerts

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod analyzer;
        pub mod format_detector;
        pub mod format_registry;
        pub mod orchestrator;
        pub mod parsers;
        pub mod tokenizer;
        pub mod value_parsers;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Dataset, FormatId, ParsedStatus, ParsedValue, Row, Summary};
pub use app::services::analyzer::analyze;
pub use app::services::orchestrator::{ParseOutcome, ParserRegistry, parse_file};
pub use config::ParseOptions;

/// Result type alias for BAS processing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for export processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Content failed validation before tokenizing (empty file, size cap)
    #[error("Content validation error in file '{file}': {message}")]
    ContentValidation { file: String, message: String },

    /// A strict format was missing required columns
    #[error("Schema error in file '{file}': {message}")]
    Schema { file: String, message: String },

    /// A format was detected but has no registered parser
    #[error("No parser implemented for detected format '{format}'")]
    UnimplementedFormat { format: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Report serialization error
    #[error("Report serialization error: {message}")]
    ReportSerialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a content validation error
    pub fn content_validation(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ContentValidation {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an unimplemented-format error
    pub fn unimplemented_format(format: impl Into<String>) -> Self {
        Self::UnimplementedFormat {
            format: format.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: "Date/time parsing failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::ReportSerialization {
            message: "Report serialization failed".to_string(),
            source: error,
        }
    }
}
