//! Pipeline coordination
//!
//! One batch per trigger. The three sources load and normalize as a
//! fork-join; identity resolution and everything downstream run only after
//! all sources have joined, since cross-source matching needs the full
//! record set.
//!
//! Triggers are fingerprint-gated and single-flight: at most one run is in
//! flight at a time, a concurrent second trigger waits and reuses the
//! completed result, and an unchanged fingerprint serves the stored
//! metrics without re-invoking the loaders.

pub mod fingerprint;

use crate::linker;
use crate::loader;
use crate::metrics::{self, DashboardMetrics};
use crate::normalize::{self, NormalizedSource};
use crate::resolve;
use crate::store::{MetricsStore, RunOutput};
use crate::types::{RunSummary, Source};
use chrono::Utc;
use salesdash_common::config::Config;
use salesdash_common::{Error, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Result of one trigger
#[derive(Debug, Clone)]
pub struct RunReport {
    pub metrics: DashboardMetrics,
    /// Populated for fresh runs and in-memory reuse; `None` when the
    /// metrics came back from the store
    pub summary: Option<RunSummary>,
    pub fingerprint: String,
    /// True when an earlier run's result was reused
    pub reused: bool,
}

struct CachedRun {
    fingerprint: String,
    metrics: DashboardMetrics,
    summary: Option<RunSummary>,
}

/// Fingerprint-gated single-flight run coordinator
pub struct Coordinator {
    config: Config,
    store: Arc<dyn MetricsStore>,
    gate: Mutex<Option<CachedRun>>,
}

impl Coordinator {
    pub fn new(config: Config, store: Arc<dyn MetricsStore>) -> Self {
        Self {
            config,
            store,
            gate: Mutex::new(None),
        }
    }

    /// Ensure the current input set has been processed and return its
    /// metrics. Concurrent callers share one run; unchanged inputs reuse
    /// the stored snapshot.
    pub async fn ensure_processed(&self) -> Result<RunReport> {
        let data_root = self.config.data_root.clone();
        let current =
            tokio::task::spawn_blocking(move || fingerprint::compute_fingerprint(&data_root))
                .await
                .map_err(|e| Error::Internal(format!("fingerprint task failed: {}", e)))??;

        // Single-flight gate: a second trigger parks here until the
        // in-flight run finishes, then reuses its cached result
        let mut gate = self.gate.lock().await;

        if let Some(cached) = gate.as_ref() {
            if cached.fingerprint == current {
                return Ok(RunReport {
                    metrics: cached.metrics.clone(),
                    summary: cached.summary.clone(),
                    fingerprint: current,
                    reused: true,
                });
            }
        }

        if self.store.load_fingerprint().await?.as_deref() == Some(current.as_str()) {
            if let Some(stored) = self.store.load_metrics().await? {
                info!(fingerprint = %current, "Input unchanged; reusing stored metrics");
                *gate = Some(CachedRun {
                    fingerprint: current.clone(),
                    metrics: stored.clone(),
                    summary: None,
                });
                return Ok(RunReport {
                    metrics: stored,
                    summary: None,
                    fingerprint: current,
                    reused: true,
                });
            }
        }

        let output = run_pipeline(&self.config, current.clone()).await?;
        self.store.save_run(&output).await?;

        let report = RunReport {
            metrics: output.metrics.clone(),
            summary: Some(output.summary.clone()),
            fingerprint: current.clone(),
            reused: false,
        };
        *gate = Some(CachedRun {
            fingerprint: current,
            metrics: output.metrics,
            summary: Some(output.summary),
        });
        Ok(report)
    }
}

/// Execute one full pipeline run
async fn run_pipeline(config: &Config, fingerprint: String) -> Result<RunOutput> {
    info!(fingerprint = %fingerprint, "Starting ingest run");

    // Fork-join across the three sources
    let (data1, data2, data3) = tokio::try_join!(
        load_and_normalize(config, Source::Data1),
        load_and_normalize(config, Source::Data2),
        load_and_normalize(config, Source::Data3),
    )?;

    let mut summary = RunSummary::default();
    let mut books = Vec::new();
    let mut customers = Vec::new();
    let mut transactions = Vec::new();
    for normalized in [data1, data2, data3] {
        summary.raw_rows_skipped += normalized.raw_rows_skipped;
        summary.normalization_errors += normalized.errors.len() as u64;
        for error in &normalized.errors {
            warn!(
                source = %error.source,
                kind = %error.kind,
                reason = %error.reason,
                row = %error.row,
                "Row failed normalization"
            );
        }
        books.extend(normalized.books);
        customers.extend(normalized.customers);
        transactions.extend(normalized.transactions);
    }
    summary.raw_customer_records = customers.len() as u64;

    let customer_resolution = resolve::resolve_customers(&customers, &config.match_policy);
    let author_resolution = resolve::resolve_authors(&books);
    let book_resolution = resolve::resolve_books(&books, &author_resolution);

    summary.name_only_candidates = customer_resolution.name_only_candidates;
    summary.canonical_customers = customer_resolution.customers.len() as u64;
    summary.canonical_authors = author_resolution.authors.len() as u64;
    summary.canonical_books = book_resolution.books.len() as u64;

    let outcome = linker::link_transactions(&transactions, &customer_resolution, &book_resolution);
    summary.unresolved_linkages = outcome.unresolved.len() as u64;
    summary.linked_transactions = outcome.transactions.len() as u64;

    let dashboard = metrics::aggregate(
        &outcome.transactions,
        &customer_resolution.customers,
        &author_resolution.authors,
        &book_resolution.books,
    );

    info!(
        raw_customers = summary.raw_customer_records,
        canonical_customers = summary.canonical_customers,
        canonical_authors = summary.canonical_authors,
        linked = summary.linked_transactions,
        unresolved = summary.unresolved_linkages,
        skipped = summary.raw_rows_skipped + summary.normalization_errors,
        "Ingest run complete"
    );

    Ok(RunOutput {
        fingerprint,
        customers: customer_resolution.customers,
        authors: author_resolution.authors,
        books: book_resolution.books,
        transactions: outcome.transactions,
        metrics: dashboard,
        summary,
        completed_at: Utc::now(),
    })
}

/// Load and normalize one source on the blocking pool
async fn load_and_normalize(config: &Config, source: Source) -> Result<NormalizedSource> {
    let data_root = config.data_root.clone();
    let layout = config.layout(source);
    tokio::task::spawn_blocking(move || {
        let loaded = loader::load_source(&data_root, source)?;
        Ok(normalize::normalize_source(loaded, &layout))
    })
    .await
    .map_err(|e| Error::Internal(format!("source task failed: {}", e)))?
}
