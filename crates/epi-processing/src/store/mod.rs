//! Persisted table storage: the two-tier dataset cache and the raw loader.
//!
//! Layout under the configured data root:
//! - `raw/<name>.csv`: source tabular file
//! - `raw/<name>.parquet`: memoized deserialized form, written on first load
//! - `processed/<name>_processed.parquet`: memoized pipeline output
//!
//! Cache entries are validated by existence only; nothing compares them to
//! the current source. Concurrent first-time writes to the same entry are
//! unsupported and race with no defined winner.

mod cache;
mod loader;

pub use cache::{CacheStage, CacheStore};
pub use loader::TableLoader;
