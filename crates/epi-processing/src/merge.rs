//! Composite-key joining of two processed tables.

use crate::error::Result;
use crate::types::{DATE_COLUMN, REGION_CODE_COLUMN, ensure_required_columns};
use polars::prelude::*;
use tracing::debug;

/// Name of the synthesized join key column.
pub const MERGE_KEY_COLUMN: &str = "id";

/// Inner-joins two tables on a synthesized (region code + date) key.
pub struct DatasetMerger;

impl DatasetMerger {
    /// Merge two tables on the composite key.
    ///
    /// Both inputs get an `id` column, the string concatenation of region
    /// code and date, and are inner-joined on it. Non-key columns present
    /// on both sides are kept from both, with the right-hand copy carrying
    /// the join suffix.
    ///
    /// Caller invariant: the composite key must be unique within each
    /// input. A duplicated key is not an error; it produces one output row
    /// per matching pair.
    pub fn merge(left: &DataFrame, right: &DataFrame) -> Result<DataFrame> {
        ensure_required_columns(left, "merge left input")?;
        ensure_required_columns(right, "merge right input")?;

        let key = concat_str([col(REGION_CODE_COLUMN), col(DATE_COLUMN)], "", true)
            .alias(MERGE_KEY_COLUMN);

        let merged = left
            .clone()
            .lazy()
            .with_column(key.clone())
            .join(
                right.clone().lazy().with_column(key),
                [col(MERGE_KEY_COLUMN)],
                [col(MERGE_KEY_COLUMN)],
                JoinArgs::new(JoinType::Inner),
            )
            .collect()?;

        debug!(
            "Merged {}x{} with {}x{} into {}x{}",
            left.height(),
            left.width(),
            right.height(),
            right.width(),
            merged.height(),
            merged.width()
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(regions: Vec<&str>, dates: Vec<&str>, metric: (&str, Vec<f64>)) -> DataFrame {
        DataFrame::new(vec![
            Column::new(REGION_CODE_COLUMN.into(), regions),
            Column::new(DATE_COLUMN.into(), dates),
            Column::new(metric.0.into(), metric.1),
        ])
        .unwrap()
    }

    #[test]
    fn test_merge_on_matching_keys() {
        let left = table(
            vec!["US-CA", "US-NY"],
            vec!["2020-01-06", "2020-01-06"],
            ("hospitalized_new", vec![7.0, 9.0]),
        );
        let right = table(
            vec!["US-CA", "US-NY"],
            vec!["2020-01-06", "2020-01-06"],
            ("symptom_fever", vec![0.4, 0.6]),
        );

        let merged = DatasetMerger::merge(&left, &right).unwrap();
        assert_eq!(merged.height(), 2);
        assert!(merged.column(MERGE_KEY_COLUMN).is_ok());
        assert!(merged.column("hospitalized_new").is_ok());
        assert!(merged.column("symptom_fever").is_ok());
    }

    #[test]
    fn test_merge_disjoint_keys_yields_no_rows() {
        let left = table(
            vec!["US-CA"],
            vec!["2020-01-06"],
            ("hospitalized_new", vec![7.0]),
        );
        let right = table(
            vec!["US-CA"],
            vec!["2020-01-13"],
            ("symptom_fever", vec![0.4]),
        );

        let merged = DatasetMerger::merge(&left, &right).unwrap();
        assert_eq!(merged.height(), 0);
    }

    #[test]
    fn test_self_merge_is_one_to_one() {
        let df = table(
            vec!["US-CA", "US-CA", "US-NY"],
            vec!["2020-01-06", "2020-01-13", "2020-01-06"],
            ("hospitalized_new", vec![7.0, 8.0, 9.0]),
        );

        let merged = DatasetMerger::merge(&df, &df).unwrap();
        assert_eq!(merged.height(), df.height());

        // Metric columns from both sides match row for row.
        let left_vals: Vec<Option<f64>> = merged
            .column("hospitalized_new")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        let right_vals: Vec<Option<f64>> = merged
            .column("hospitalized_new_right")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(left_vals, right_vals);
    }

    #[test]
    fn test_duplicate_keys_expand_combinatorially() {
        // Documented hazard, not an error: duplicated keys multiply.
        let dup = table(
            vec!["US-CA", "US-CA"],
            vec!["2020-01-06", "2020-01-06"],
            ("hospitalized_new", vec![1.0, 2.0]),
        );

        let merged = DatasetMerger::merge(&dup, &dup).unwrap();
        assert_eq!(merged.height(), 4);
    }

    #[test]
    fn test_merge_requires_key_columns() {
        let left = table(
            vec!["US-CA"],
            vec!["2020-01-06"],
            ("hospitalized_new", vec![7.0]),
        );
        let missing = DataFrame::new(vec![Column::new(
            "symptom_fever".into(),
            vec![0.4],
        )])
        .unwrap();

        assert!(DatasetMerger::merge(&left, &missing).is_err());
    }
}
