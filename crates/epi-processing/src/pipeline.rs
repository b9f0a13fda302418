//! The processed-table pipeline: clean, filter, aggregate, memoize.
//!
//! Everything here is synchronous and single-threaded; an invocation runs
//! to completion or fails, and the caller decides what to do next.

use crate::cleaner::ColumnCleaner;
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::regions::{RegionFilter, RegionPolicy};
use crate::store::{CacheStage, CacheStore, TableLoader};
use crate::types::{DatasetKind, ProcessingSummary};
use crate::utils::sorted_region_codes;
use crate::weekly::WeeklyAggregator;
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Orchestrates the raw-to-processed transformation for named datasets and
/// memoizes the result on disk.
///
/// A processed entry, once written, is served forever; deleting it (see
/// [`Pipeline::invalidate`]) is the only way to pick up a changed source.
pub struct Pipeline {
    config: PipelineConfig,
    loader: TableLoader,
    cache: CacheStore,
    cleaner: ColumnCleaner,
    region_filter: RegionFilter,
    aggregator: WeeklyAggregator,
}

// The pipeline owns no interior mutability and may be moved to a worker
// thread by a driver.
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a pipeline over the configured data root.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;

        let loader = TableLoader::new(config.data_root.clone());
        let cache = CacheStore::new(config.data_root.clone());
        Ok(Self {
            config,
            loader,
            cache,
            cleaner: ColumnCleaner,
            region_filter: RegionFilter,
            aggregator: WeeklyAggregator,
        })
    }

    /// Return the processed table for `name`, computing and persisting it
    /// on first request.
    pub fn get_processed(&self, name: &str) -> Result<DataFrame> {
        if self.cache.contains(CacheStage::Processed, name) {
            debug!("Processed cache hit for dataset '{}'", name);
            return self.cache.read(CacheStage::Processed, name);
        }

        let raw = self.loader.load_raw(name)?;
        let (mut processed, summary) = self.process_raw(name, &raw)?;

        self.cache
            .write(CacheStage::Processed, name, &mut processed)?;
        info!(
            "Processed dataset '{}' ({:?}): {} -> {} rows, {} -> {} columns, {} -> {} regions in {} ms",
            summary.dataset,
            summary.kind,
            summary.rows_before,
            summary.rows_after,
            summary.columns_before,
            summary.columns_after,
            summary.regions_before,
            summary.regions_after,
            summary.duration_ms
        );
        Ok(processed)
    }

    /// Run the cleaning/filtering/aggregation stages on an in-memory raw
    /// table, without touching the cache.
    ///
    /// Every stage is a pure function over its input; the raw table is
    /// left untouched for other callers.
    pub fn process_raw(
        &self,
        name: &str,
        raw: &DataFrame,
    ) -> Result<(DataFrame, ProcessingSummary)> {
        let started = Instant::now();
        let kind = DatasetKind::from_name(name);
        let regions_before = sorted_region_codes(raw)?.len();

        info!("Step 1: Cleaning sparse columns of '{}'...", name);
        let cleaned = self
            .cleaner
            .clean_columns(raw, self.config.column_threshold)?;
        let columns_dropped: Vec<String> = raw
            .get_column_names()
            .iter()
            .filter(|n| cleaned.column(n.as_str()).is_err())
            .map(|n| n.to_string())
            .collect();

        let policy = self.config.region_policy_override.unwrap_or(match kind {
            DatasetKind::Symptoms => RegionPolicy::Density,
            DatasetKind::DailySeries => RegionPolicy::ZeroCount,
        });

        info!("Step 2: Filtering regions with the {:?} policy...", policy);
        let filtered =
            self.region_filter
                .filter_regions(&cleaned, self.config.region_threshold, policy)?;

        let processed = if kind.is_preaggregated() {
            debug!("Dataset '{}' is already weekly; skipping aggregation", name);
            filtered
        } else {
            info!("Step 3: Aggregating daily rows into weekly windows...");
            self.aggregator.aggregate_weekly(&filtered)?
        };

        let summary = ProcessingSummary {
            dataset: name.to_string(),
            kind,
            rows_before: raw.height(),
            rows_after: processed.height(),
            columns_before: raw.width(),
            columns_after: processed.width(),
            columns_dropped,
            regions_before,
            regions_after: sorted_region_codes(&processed)?.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        Ok((processed, summary))
    }

    /// Drop the processed cache entry for `name`, if any.
    ///
    /// The raw entry is left alone; it is byte-stable by design.
    pub fn invalidate(&self, name: &str) -> Result<bool> {
        self.cache.remove(CacheStage::Processed, name)
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
