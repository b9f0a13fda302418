//! Shared frame helpers for the dataset processing pipeline.
//!
//! Region grouping, per-row null accounting, and small dtype/value
//! utilities used across the cleaning, filtering, and aggregation modules.

use crate::error::Result;
use crate::types::REGION_CODE_COLUMN;
use polars::prelude::*;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Render an `AnyValue` as a plain string, without the quoting that the
/// `Display` impl adds around string values.
pub fn any_value_to_string(value: &AnyValue) -> String {
    value.to_string().trim_matches('"').to_string()
}

/// Count null entries per row across all columns of a frame.
pub fn row_null_counts(df: &DataFrame) -> Vec<usize> {
    let mut counts = vec![0usize; df.height()];
    for col in df.get_columns() {
        let mask = col.as_materialized_series().is_null();
        for (i, is_null) in mask.into_iter().enumerate() {
            if is_null.unwrap_or(false) {
                counts[i] += 1;
            }
        }
    }
    counts
}

/// Distinct region codes of a frame in ascending order.
///
/// Rows with a null region code belong to no group and are ignored, the
/// same way null keys fall out of a group-by.
pub fn sorted_region_codes(df: &DataFrame) -> Result<Vec<String>> {
    let unique = df
        .column(REGION_CODE_COLUMN)?
        .as_materialized_series()
        .unique()?;
    let mut codes: Vec<String> = unique
        .str()?
        .into_iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
    codes.sort();
    Ok(codes)
}

/// Rows of one region, in the frame's original row order.
pub fn region_slice(df: &DataFrame, code: &str) -> Result<DataFrame> {
    let group = df
        .clone()
        .lazy()
        .filter(col(REGION_CODE_COLUMN).eq(lit(code)))
        .collect()?;
    Ok(group)
}

/// Keep only rows whose region code starts with `prefix`.
///
/// Used by drivers to carve country-level subsets (e.g. `US-`) out of a
/// global table before or after processing.
pub fn filter_region_prefix(df: &DataFrame, prefix: &str) -> Result<DataFrame> {
    let codes = df.column(REGION_CODE_COLUMN)?.as_materialized_series().clone();
    let mask_values: Vec<bool> = codes
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.starts_with(prefix)).unwrap_or(false))
        .collect();
    let mask = BooleanChunked::from_slice("prefix_mask".into(), &mask_values);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                REGION_CODE_COLUMN.into(),
                vec!["US-NY", "US-CA", "US-NY", "GB-ENG"],
            ),
            Column::new("date".into(), vec!["2020-01-06"; 4]),
            Column::new(
                "hospitalized_new".into(),
                vec![Some(1.0), None, Some(3.0), Some(4.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_row_null_counts() {
        let df = sample_frame();
        assert_eq!(row_null_counts(&df), vec![0, 1, 0, 0]);
    }

    #[test]
    fn test_sorted_region_codes() {
        let df = sample_frame();
        let codes = sorted_region_codes(&df).unwrap();
        assert_eq!(codes, vec!["GB-ENG", "US-CA", "US-NY"]);
    }

    #[test]
    fn test_region_slice_preserves_row_order() {
        let df = sample_frame();
        let group = region_slice(&df, "US-NY").unwrap();
        assert_eq!(group.height(), 2);

        let values = group
            .column("hospitalized_new")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect::<Vec<_>>();
        assert_eq!(values, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_filter_region_prefix() {
        let df = sample_frame();
        let us_only = filter_region_prefix(&df, "US-").unwrap();
        assert_eq!(us_only.height(), 3);

        let gb_only = filter_region_prefix(&df, "GB-").unwrap();
        assert_eq!(gb_only.height(), 1);
    }
}
