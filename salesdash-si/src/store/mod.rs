//! Metrics store gateway
//!
//! The pipeline never issues queries itself; everything it persists or
//! reads back goes through [`MetricsStore`]. The SQLite implementation in
//! [`sqlite`] is the reference gateway; tests substitute their own.

pub mod sqlite;

pub use sqlite::SqliteMetricsStore;

use crate::metrics::DashboardMetrics;
use crate::types::{
    CanonicalAuthor, CanonicalBook, CanonicalCustomer, LinkedTransaction, RunSummary,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use salesdash_common::Result;

/// Everything one successful pipeline run persists, as a unit
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub fingerprint: String,
    pub customers: Vec<CanonicalCustomer>,
    pub authors: Vec<CanonicalAuthor>,
    pub books: Vec<CanonicalBook>,
    pub transactions: Vec<LinkedTransaction>,
    pub metrics: DashboardMetrics,
    pub summary: RunSummary,
    pub completed_at: DateTime<Utc>,
}

/// Persistence gateway consumed by the pipeline coordinator
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Fingerprint of the input set the stored snapshot was computed from,
    /// if a completed run exists
    async fn load_fingerprint(&self) -> Result<Option<String>>;

    /// Stored metrics for the idempotent-skip path
    async fn load_metrics(&self) -> Result<Option<DashboardMetrics>>;

    /// Replace the stored snapshot with a fresh run. Must be atomic: a
    /// failed save leaves the previous snapshot untouched.
    async fn save_run(&self, run: &RunOutput) -> Result<()>;
}
