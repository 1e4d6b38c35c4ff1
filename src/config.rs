//! Configuration management and validation.
//!
//! Provides the tuning parameters accepted by the parsing pipeline:
//! ingestion caps, strict-validation and input-sanitization flags.

use crate::constants::{DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_ROWS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tuning parameters for a parse pass.
///
/// Callers supply file content as a string; these options bound how much of
/// it is ingested and how strictly column schemas are enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Maximum number of data rows to ingest; further rows are dropped
    /// without erroring
    pub max_rows: usize,

    /// Maximum file size in bytes; larger files are rejected outright
    pub max_file_bytes: usize,

    /// Treat missing required columns as errors even for lenient formats
    pub strict_validation: bool,

    /// Strip control characters from field values during tokenizing
    pub sanitize_input: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            strict_validation: false,
            sanitize_input: true,
        }
    }
}

impl ParseOptions {
    /// Validate option values for consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_rows == 0 {
            return Err(Error::configuration("max_rows must be greater than zero"));
        }
        if self.max_file_bytes == 0 {
            return Err(Error::configuration(
                "max_file_bytes must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Override the row cap
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Override the byte cap
    pub fn with_max_file_bytes(mut self, max_file_bytes: usize) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Force strict column validation for every format
    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert_eq!(options.max_rows, DEFAULT_MAX_ROWS);
        assert_eq!(options.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
        assert!(!options.strict_validation);
        assert!(options.sanitize_input);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_caps_rejected() {
        assert!(ParseOptions::default().with_max_rows(0).validate().is_err());
        assert!(
            ParseOptions::default()
                .with_max_file_bytes(0)
                .validate()
                .is_err()
        );
    }
}
