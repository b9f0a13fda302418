//! Daily-to-weekly aggregation.
//!
//! Each region's daily rows are reduced to one row per full Monday-aligned
//! week. The window logic is an explicit index walk over 7-row spans, each
//! materialized as a [`WeekWindow`] before reduction, so the alignment and
//! partial-week rules stay auditable in isolation.

use crate::error::{ProcessingError, Result};
use crate::types::{DATE_COLUMN, ensure_required_columns};
use crate::utils::{any_value_to_string, region_slice, sorted_region_codes};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::debug;

/// Suffix marking a per-day delta metric; summed across a week.
pub const DELTA_METRIC_SUFFIX: &str = "_new";

/// Suffix marking a running-total metric; a week reports its last value.
pub const CUMULATIVE_METRIC_SUFFIX: &str = "_cumulative";

const DAYS_PER_WEEK: usize = 7;

/// How a column participates in the weekly reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    /// Summed over the seven rows of a window; nulls poison the sum.
    Delta,
    /// Overwritten by each row; a window reports the seventh row's value.
    Cumulative,
    /// Carried unchanged from the first row of the window.
    Static,
}

fn metric_kind(name: &str) -> MetricKind {
    if name.ends_with(DELTA_METRIC_SUFFIX) {
        MetricKind::Delta
    } else if name.ends_with(CUMULATIVE_METRIC_SUFFIX) {
        MetricKind::Cumulative
    } else {
        MetricKind::Static
    }
}

/// One Monday-aligned span of seven consecutive daily rows of a region.
struct WeekWindow {
    start: usize,
}

impl WeekWindow {
    /// Reduce one column of the window to the weekly value.
    ///
    /// Delta columns must already be cast to `Float64`.
    fn reduce_column(&self, series: &Series, kind: MetricKind) -> Result<AnyValue<'static>> {
        match kind {
            MetricKind::Delta => {
                let values = series.f64()?;
                let mut sum = Some(0.0);
                for i in self.start..self.start + DAYS_PER_WEEK {
                    sum = match (sum, values.get(i)) {
                        (Some(acc), Some(v)) => Some(acc + v),
                        _ => None,
                    };
                }
                Ok(match sum {
                    Some(total) => AnyValue::Float64(total),
                    None => AnyValue::Null,
                })
            }
            MetricKind::Cumulative => {
                Ok(series.get(self.start + DAYS_PER_WEEK - 1)?.into_static())
            }
            MetricKind::Static => Ok(series.get(self.start)?.into_static()),
        }
    }
}

/// Offset into a region's row sequence of the first Monday-aligned window.
///
/// Zero when the sequence already starts on a Monday; otherwise the short
/// leading partial week is skipped.
fn monday_offset(first_date: &str) -> Result<usize> {
    let parsed = NaiveDate::parse_from_str(first_date, "%Y-%m-%d").map_err(|source| {
        ProcessingError::InvalidDate {
            value: first_date.to_string(),
            source,
        }
    })?;
    let weekday = parsed.weekday().num_days_from_monday() as usize;
    Ok(if weekday == 0 { 0 } else { DAYS_PER_WEEK - weekday })
}

/// Converts per-region daily sequences into per-region weekly sequences.
pub struct WeeklyAggregator;

impl WeeklyAggregator {
    /// Aggregate a daily table into a weekly one.
    ///
    /// Precondition: within each region the rows are in ascending date
    /// order. Every full 7-row window yields exactly one output row keyed
    /// by its first (Monday) date; trailing rows that do not fill a window
    /// are dropped, so a region with `n` rows and alignment offset `o`
    /// emits `(n - o) / 7` rows.
    pub fn aggregate_weekly(&self, df: &DataFrame) -> Result<DataFrame> {
        ensure_required_columns(df, "aggregate_weekly input")?;

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let kinds: Vec<MetricKind> = names.iter().map(|n| metric_kind(n)).collect();
        let date_idx = names
            .iter()
            .position(|n| n == DATE_COLUMN)
            .ok_or_else(|| ProcessingError::MissingColumn {
                column: DATE_COLUMN.to_string(),
                context: "aggregate_weekly input".to_string(),
            })?;

        let mut out_values: Vec<Vec<AnyValue<'static>>> = vec![Vec::new(); names.len()];

        for code in sorted_region_codes(df)? {
            let group = region_slice(df, &code)?;
            let n = group.height();
            if n == 0 {
                continue;
            }

            let mut series: Vec<Series> = Vec::with_capacity(names.len());
            for (col, kind) in group.get_columns().iter().zip(&kinds) {
                let s = col.as_materialized_series().clone();
                series.push(match kind {
                    MetricKind::Delta => s.cast(&DataType::Float64)?,
                    _ => s,
                });
            }

            let first_date = any_value_to_string(&series[date_idx].get(0)?);
            let offset = monday_offset(&first_date)?;

            let mut emitted = 0usize;
            let mut start = offset;
            while start + DAYS_PER_WEEK <= n {
                let window = WeekWindow { start };
                for (k, s) in series.iter().enumerate() {
                    out_values[k].push(window.reduce_column(s, kinds[k])?);
                }
                emitted += 1;
                start += DAYS_PER_WEEK;
            }

            debug!(
                "Region {}: {} daily rows -> {} weekly rows (alignment offset {})",
                code, n, emitted, offset
            );
        }

        let mut columns = Vec::with_capacity(names.len());
        for ((name, kind), values) in names.iter().zip(&kinds).zip(&out_values) {
            let dtype = match kind {
                MetricKind::Delta => DataType::Float64,
                _ => df.column(name)?.dtype().clone(),
            };
            let series =
                Series::from_any_values_and_dtype(name.as_str().into(), values, &dtype, true)?;
            columns.push(Column::from(series));
        }

        Ok(DataFrame::new(columns)?)
    }
}
