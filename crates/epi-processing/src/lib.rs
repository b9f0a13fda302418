//! Weekly Dataset Processing Library
//!
//! Turns daily per-region public-health and search-trend tables into
//! cleaned, weekly-aggregated tables joinable on a composite (region, date)
//! key, built on Rust and Polars.
//!
//! # Overview
//!
//! The pipeline runs, per named dataset:
//!
//! - **Loading**: CSV sources parsed once and memoized on disk
//! - **Column cleaning**: all-null and sparse columns dropped
//! - **Region filtering**: whole regions kept or dropped by quality policy
//! - **Weekly aggregation**: daily rows reduced to Monday-aligned weeks
//!   (skipped for datasets that ship at weekly resolution)
//! - **Memoization**: each processed table persisted and reused
//!
//! Independently, two processed tables can be joined on a synthesized
//! region+date key with [`DatasetMerger`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use epi_processing::{DatasetMerger, Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .data_root("./data")
//!     .column_threshold(0.5)
//!     .build()?;
//! let pipeline = Pipeline::new(config)?;
//!
//! let hospitalizations = pipeline.get_processed("aggregated_cc_by_us")?;
//! let symptoms = pipeline.get_processed("2020_US_weekly_symptoms_dataset_v003")?;
//!
//! let merged = DatasetMerger::merge(&hospitalizations, &symptoms)?;
//! println!("merged: {} rows x {} columns", merged.height(), merged.width());
//! ```
//!
//! # Caching
//!
//! Both cache tiers treat existence as validity: once an entry is written
//! it is served forever, even if the CSV source changes. Use
//! [`Pipeline::invalidate`] (or delete the files out of band) to force
//! recomputation. Concurrent first-time runs over the same dataset name
//! race on the cache files and are unsupported.

pub mod cleaner;
pub mod config;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod regions;
pub mod store;
pub mod types;
pub mod utils;
pub mod weekly;

// Re-exports for convenient access
pub use cleaner::ColumnCleaner;
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use merge::{DatasetMerger, MERGE_KEY_COLUMN};
pub use pipeline::Pipeline;
pub use regions::{REGION_KEEP_RATIO, RegionFilter, RegionPolicy, ZERO_ENTRY_COLUMNS};
pub use store::{CacheStage, CacheStore, TableLoader};
pub use types::{
    DATE_COLUMN, DatasetKind, ProcessingSummary, REGION_CODE_COLUMN, ensure_required_columns,
};
pub use weekly::{CUMULATIVE_METRIC_SUFFIX, DELTA_METRIC_SUFFIX, WeeklyAggregator};
