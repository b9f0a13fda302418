//! Shared types and the required-column contract.
//!
//! Every dataset this pipeline touches carries a region code and a date
//! column; the rest of the column set is dataset-specific and unvalidated.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column identifying the geographic region of a row.
pub const REGION_CODE_COLUMN: &str = "open_covid_region_code";

/// Column holding the ISO `YYYY-MM-DD` observation date of a row.
pub const DATE_COLUMN: &str = "date";

/// Check that a frame carries the region and date key columns.
///
/// Runs eagerly at load and at each component entry point, so a malformed
/// dataset fails before any work is done on it.
pub fn ensure_required_columns(df: &DataFrame, context: &str) -> Result<()> {
    for required in [REGION_CODE_COLUMN, DATE_COLUMN] {
        if df.column(required).is_err() {
            return Err(ProcessingError::MissingColumn {
                column: required.to_string(),
                context: context.to_string(),
            });
        }
    }
    Ok(())
}

/// Kind of a named dataset, decided from the dataset name.
///
/// Symptom search-trend datasets ship pre-aggregated at weekly resolution,
/// so the pipeline must not aggregate them again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetKind {
    /// Weekly symptom search-trend data; region-filtered with the density
    /// policy and never aggregated.
    Symptoms,
    /// Daily observations; region-filtered with the zero-count policy and
    /// aggregated into weekly windows.
    DailySeries,
}

impl DatasetKind {
    /// Classify a dataset by its name.
    pub fn from_name(name: &str) -> Self {
        if name.contains("symptom") {
            DatasetKind::Symptoms
        } else {
            DatasetKind::DailySeries
        }
    }

    /// Whether the source data is already at weekly resolution.
    pub fn is_preaggregated(&self) -> bool {
        matches!(self, DatasetKind::Symptoms)
    }
}

/// Summary of one cache-miss run through the processing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub dataset: String,
    pub kind: DatasetKind,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    /// Names of columns dropped by the cleaning pass.
    pub columns_dropped: Vec<String>,
    pub regions_before: usize,
    pub regions_after: usize,
    pub duration_ms: u64,
}
