//! Region-level quality filtering.
//!
//! Whole regions are kept or dropped; row contents are never touched.
//! Groups are visited in ascending region-code order and kept groups are
//! concatenated in that order, each with its internal row order intact.

use crate::error::Result;
use crate::types::ensure_required_columns;
use crate::utils::{is_numeric_dtype, region_slice, row_null_counts, sorted_region_codes};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Share of a region's rows that decides keep/drop under both policies.
pub const REGION_KEEP_RATIO: f64 = 0.6;

/// Number of zero-valued numeric cells that marks a row as suspect under
/// the zero-count policy. Fixed at two in the observed source data; it is
/// not derived from the column count.
pub const ZERO_ENTRY_COLUMNS: usize = 2;

/// Per-region keep/drop policy. The two policies are mutually exclusive;
/// callers pick exactly one per dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionPolicy {
    /// Keep a region when more than [`REGION_KEEP_RATIO`] of its rows are
    /// well populated (per-row non-null fraction at or above the
    /// configured threshold).
    Density,
    /// Drop a region when at least [`REGION_KEEP_RATIO`] of its rows hold
    /// the value zero in exactly [`ZERO_ENTRY_COLUMNS`] numeric columns.
    ZeroCount,
}

/// Applies a [`RegionPolicy`] over every region group of a frame.
pub struct RegionFilter;

impl RegionFilter {
    /// Keep only regions that pass `policy`; returns a new frame.
    ///
    /// `threshold` is the per-row non-null fraction used by the density
    /// policy and is ignored by the zero-count policy.
    pub fn filter_regions(
        &self,
        df: &DataFrame,
        threshold: f64,
        policy: RegionPolicy,
    ) -> Result<DataFrame> {
        ensure_required_columns(df, "filter_regions input")?;

        let codes = sorted_region_codes(df)?;
        let mut kept = df.clear();
        let mut dropped: Vec<String> = Vec::new();

        for code in codes {
            let group = region_slice(df, &code)?;
            let keep = match policy {
                RegionPolicy::Density => Self::passes_density(&group, threshold),
                RegionPolicy::ZeroCount => Self::passes_zero_count(&group)?,
            };

            if keep {
                kept.vstack_mut(&group)?;
            } else {
                dropped.push(code);
            }
        }

        if !dropped.is_empty() {
            debug!(
                "Dropped {} regions under {:?} policy: {:?}",
                dropped.len(),
                policy,
                dropped
            );
        }

        Ok(kept)
    }

    /// Density policy: qualifying rows / total rows must exceed
    /// [`REGION_KEEP_RATIO`], where a row qualifies when its non-null
    /// fraction is at least `threshold`.
    fn passes_density(group: &DataFrame, threshold: f64) -> bool {
        let rows = group.height();
        if rows == 0 {
            return false;
        }
        let width = group.width();

        let qualifying = row_null_counts(group)
            .iter()
            .filter(|&&nulls| (width - nulls) as f64 / width as f64 >= threshold)
            .count();

        qualifying as f64 / rows as f64 > REGION_KEEP_RATIO
    }

    /// Zero-count policy: rows with exactly [`ZERO_ENTRY_COLUMNS`] numeric
    /// zeros must stay below [`REGION_KEEP_RATIO`] of the region's rows.
    fn passes_zero_count(group: &DataFrame) -> Result<bool> {
        let rows = group.height();
        if rows == 0 {
            return Ok(false);
        }

        let mut zero_counts = vec![0usize; rows];
        for col in group.get_columns() {
            let series = col.as_materialized_series();
            if !is_numeric_dtype(series.dtype()) {
                continue;
            }
            let values = series.cast(&DataType::Float64)?;
            for (i, value) in values.f64()?.into_iter().enumerate() {
                if value == Some(0.0) {
                    zero_counts[i] += 1;
                }
            }
        }

        let suspect = zero_counts
            .iter()
            .filter(|&&count| count == ZERO_ENTRY_COLUMNS)
            .count();

        Ok((suspect as f64 / rows as f64) < REGION_KEEP_RATIO)
    }
}
