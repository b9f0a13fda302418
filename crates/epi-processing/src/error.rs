//! Custom error types for the dataset processing pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. No step in
//! the pipeline retries; every failure propagates to the caller unhandled.

use thiserror::Error;

/// The main error type for the processing pipeline.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Requested dataset has neither a source file nor a cache entry.
    #[error("Dataset '{0}' not found: no source file or cache entry")]
    DatasetNotFound(String),

    /// A required key column is absent from a table.
    #[error("Required column '{column}' missing in {context}")]
    MissingColumn { column: String, context: String },

    /// A date cell could not be parsed as an ISO `YYYY-MM-DD` date.
    #[error("Invalid date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error means the dataset simply does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::DatasetNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(ProcessingError::DatasetNotFound("x".to_string()).is_not_found());
        assert!(!ProcessingError::InvalidConfig("bad".to_string()).is_not_found());
    }

    #[test]
    fn test_not_found_detection_through_context() {
        let err = ProcessingError::DatasetNotFound("x".to_string()).with_context("loading");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_with_context() {
        let err = ProcessingError::MissingColumn {
            column: "date".to_string(),
            context: "dataset 'cases'".to_string(),
        }
        .with_context("During aggregation");
        assert!(err.to_string().contains("During aggregation"));
    }

    #[test]
    fn test_missing_column_message() {
        let err = ProcessingError::MissingColumn {
            column: "open_covid_region_code".to_string(),
            context: "dataset 'cases'".to_string(),
        };
        assert!(err.to_string().contains("open_covid_region_code"));
        assert!(err.to_string().contains("cases"));
    }
}
