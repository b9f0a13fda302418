//! Column-level cleaning of sparse datasets.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Drops columns that carry too little data to be useful downstream.
pub struct ColumnCleaner;

impl ColumnCleaner {
    /// Remove low-quality columns from a frame.
    ///
    /// Two passes:
    /// 1. Drop every column whose values are all null.
    /// 2. Of the remaining columns, drop those whose non-null fraction
    ///    across all rows is strictly below `threshold`.
    ///
    /// Rows are never removed, and every surviving column ends with a
    /// non-null ratio of at least `threshold`. A zero-row frame is returned
    /// unchanged.
    pub fn clean_columns(&self, df: &DataFrame, threshold: f64) -> Result<DataFrame> {
        let height = df.height();
        if height == 0 {
            return Ok(df.clone());
        }

        let all_null: Vec<PlSmallStr> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() == height)
            .map(|col| col.name().clone())
            .collect();

        let mut cleaned = if all_null.is_empty() {
            df.clone()
        } else {
            debug!(
                "Dropping {} all-null columns: {:?}",
                all_null.len(),
                all_null
            );
            df.drop_many(all_null)
        };

        let sparse: Vec<PlSmallStr> = cleaned
            .get_columns()
            .iter()
            .filter(|col| {
                let valid_ratio = (height - col.null_count()) as f64 / height as f64;
                valid_ratio < threshold
            })
            .map(|col| col.name().clone())
            .collect();

        if !sparse.is_empty() {
            debug!(
                "Dropping {} columns below {:.0}% valid entries: {:?}",
                sparse.len(),
                threshold * 100.0,
                sparse
            );
            cleaned = cleaned.drop_many(sparse);
        }

        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame_with_sparse_columns() -> DataFrame {
        DataFrame::new(vec![
            Column::new("open_covid_region_code".into(), vec!["US-CA"; 10]),
            // fully populated
            Column::new("hospitalized_new".into(), (0..10).collect::<Vec<i64>>()),
            // 40% populated, below the default threshold
            Column::new(
                "icu_current".into(),
                (0..10)
                    .map(|i| if i < 4 { Some(i as f64) } else { None })
                    .collect::<Vec<Option<f64>>>(),
            ),
            // 60% populated, above the default threshold
            Column::new(
                "ventilator_current".into(),
                (0..10)
                    .map(|i| if i < 6 { Some(i as f64) } else { None })
                    .collect::<Vec<Option<f64>>>(),
            ),
            // nothing at all
            Column::new("recovered_new".into(), vec![None::<f64>; 10]),
        ])
        .unwrap()
    }

    #[test]
    fn test_drops_all_null_and_sparse_columns() {
        let df = frame_with_sparse_columns();
        let cleaned = ColumnCleaner.clean_columns(&df, 0.5).unwrap();

        let names: Vec<String> = cleaned
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "open_covid_region_code",
                "hospitalized_new",
                "ventilator_current"
            ]
        );
        assert_eq!(cleaned.height(), df.height());
    }

    #[test]
    fn test_surviving_columns_meet_threshold() {
        let df = frame_with_sparse_columns();
        let threshold = 0.5;
        let cleaned = ColumnCleaner.clean_columns(&df, threshold).unwrap();

        for col in cleaned.get_columns() {
            let ratio =
                (cleaned.height() - col.null_count()) as f64 / cleaned.height() as f64;
            assert!(ratio >= threshold, "column {} below threshold", col.name());
        }
    }

    #[test]
    fn test_zero_threshold_still_drops_all_null() {
        let df = frame_with_sparse_columns();
        let cleaned = ColumnCleaner.clean_columns(&df, 0.0).unwrap();

        assert!(cleaned.column("icu_current").is_ok());
        assert!(cleaned.column("recovered_new").is_err());
    }

    #[test]
    fn test_empty_frame_unchanged() {
        let df = frame_with_sparse_columns();
        let empty = df.clear();
        let cleaned = ColumnCleaner.clean_columns(&empty, 0.5).unwrap();
        assert_eq!(cleaned.width(), empty.width());
        assert_eq!(cleaned.height(), 0);
    }
}
