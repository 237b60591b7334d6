//! SQLite reference implementation of the metrics store gateway
//!
//! Tables: `analytics_metrics` (metric key → JSON value, with the run
//! timestamp), `book_catalog`, `author_catalog`, `customer_profiles`
//! (including the linked-source-ids field), `transaction_records`, plus a
//! `settings` key/value table holding the input fingerprint.
//!
//! `save_run` executes in one transaction: a run either fully replaces the
//! previous snapshot or leaves it untouched.

use super::{MetricsStore, RunOutput};
use crate::metrics::DashboardMetrics;
use async_trait::async_trait;
use salesdash_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const FINGERPRINT_KEY: &str = "ingest_fingerprint";
const LAST_RUN_KEY: &str = "last_run_at";

const METRIC_KEYS: [&str; 6] = [
    "top_revenue_days",
    "unique_customer_count",
    "unique_author_count",
    "most_popular_author",
    "top_customer",
    "run_summary",
];

pub struct SqliteMetricsStore {
    pool: SqlitePool,
}

impl SqliteMetricsStore {
    /// Open (or create) the database file and run table migrations
    pub async fn connect(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Proper SQLite URI with mode=rwc (read, write, create)
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        debug!("Connecting to database: {}", db_url);

        let pool = SqlitePool::connect(&db_url).await?;
        init_tables(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests use `:memory:` pools)
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        init_tables(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analytics_metrics (
            metric_key TEXT PRIMARY KEY,
            metric_value TEXT NOT NULL,
            computed_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS book_catalog (
            book_id TEXT PRIMARY KEY,
            book_title TEXT NOT NULL,
            authors TEXT NOT NULL,
            category TEXT,
            publisher_name TEXT,
            publication_year INTEGER,
            source_ids TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS author_catalog (
            author_id TEXT PRIMARY KEY,
            author_name TEXT NOT NULL,
            source_ids TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS customer_profiles (
            customer_id TEXT PRIMARY KEY,
            customer_name TEXT NOT NULL,
            delivery_address TEXT,
            contact_phone TEXT,
            email_address TEXT,
            linked_source_ids TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transaction_records (
            transaction_id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            book_id TEXT NOT NULL,
            items_quantity INTEGER NOT NULL,
            price_per_item TEXT NOT NULL,
            total_amount TEXT NOT NULL,
            transaction_date TEXT NOT NULL,
            delivery_address TEXT,
            currency_code TEXT NOT NULL DEFAULT 'USD'
        )
        "#,
    )
    .execute(pool)
    .await?;

    debug!("Database tables initialized");
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Internal(format!("JSON encode failed: {}", e)))
}

fn from_json<T: DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_str(value)
        .map_err(|e| Error::Internal(format!("corrupt stored metric: {}", e)))
}

#[async_trait]
impl MetricsStore for SqliteMetricsStore {
    async fn load_fingerprint(&self) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
                .bind(FINGERPRINT_KEY)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn load_metrics(&self) -> Result<Option<DashboardMetrics>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT metric_key, metric_value FROM analytics_metrics")
                .fetch_all(&self.pool)
                .await?;
        let stored: HashMap<String, String> = rows.into_iter().collect();

        let (Some(days), Some(customer_count), Some(author_count), Some(author), Some(customer)) = (
            stored.get("top_revenue_days"),
            stored.get("unique_customer_count"),
            stored.get("unique_author_count"),
            stored.get("most_popular_author"),
            stored.get("top_customer"),
        ) else {
            return Ok(None);
        };

        Ok(Some(DashboardMetrics {
            top_revenue_days: from_json(days)?,
            unique_customer_count: from_json(customer_count)?,
            unique_author_count: from_json(author_count)?,
            most_popular_author: from_json(author)?,
            top_customer: from_json(customer)?,
        }))
    }

    async fn save_run(&self, run: &RunOutput) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM analytics_metrics").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM book_catalog").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM author_catalog").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM customer_profiles").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM transaction_records").execute(&mut *tx).await?;

        for customer in &run.customers {
            let linked: Vec<String> =
                customer.linked_ids.iter().map(|sid| sid.to_string()).collect();
            sqlx::query(
                r#"
                INSERT INTO customer_profiles
                    (customer_id, customer_name, delivery_address, contact_phone,
                     email_address, linked_source_ids)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(customer.id.to_string())
            .bind(&customer.name)
            .bind(&customer.address)
            .bind(&customer.phone)
            .bind(&customer.email)
            .bind(to_json(&linked)?)
            .execute(&mut *tx)
            .await?;
        }

        for author in &run.authors {
            let source_ids: Vec<String> =
                author.source_ids.iter().map(|sid| sid.to_string()).collect();
            sqlx::query(
                "INSERT INTO author_catalog (author_id, author_name, source_ids) VALUES (?, ?, ?)",
            )
            .bind(author.id.to_string())
            .bind(&author.name)
            .bind(to_json(&source_ids)?)
            .execute(&mut *tx)
            .await?;
        }

        for book in &run.books {
            let author_ids: Vec<String> =
                book.authors.iter().map(|id| id.to_string()).collect();
            let source_ids: Vec<String> =
                book.source_ids.iter().map(|sid| sid.to_string()).collect();
            sqlx::query(
                r#"
                INSERT INTO book_catalog
                    (book_id, book_title, authors, category, publisher_name,
                     publication_year, source_ids)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(book.id.to_string())
            .bind(&book.title)
            .bind(to_json(&author_ids)?)
            .bind(&book.genre)
            .bind(&book.publisher)
            .bind(book.year.map(i64::from))
            .bind(to_json(&source_ids)?)
            .execute(&mut *tx)
            .await?;
        }

        for txn in &run.transactions {
            sqlx::query(
                r#"
                INSERT INTO transaction_records
                    (transaction_id, customer_id, book_id, items_quantity,
                     price_per_item, total_amount, transaction_date,
                     delivery_address, currency_code)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'USD')
                "#,
            )
            .bind(txn.source_id.to_string())
            .bind(txn.customer_id.to_string())
            .bind(txn.book_id.to_string())
            .bind(i64::from(txn.quantity))
            .bind(txn.unit_price.to_string())
            .bind(txn.amount.to_string())
            .bind(txn.date.format("%Y-%m-%d").to_string())
            .bind(&txn.delivery_address)
            .execute(&mut *tx)
            .await?;
        }

        let computed_at = run.completed_at.to_rfc3339();
        let metric_values = [
            to_json(&run.metrics.top_revenue_days)?,
            to_json(&run.metrics.unique_customer_count)?,
            to_json(&run.metrics.unique_author_count)?,
            to_json(&run.metrics.most_popular_author)?,
            to_json(&run.metrics.top_customer)?,
            to_json(&run.summary)?,
        ];
        for (key, value) in METRIC_KEYS.iter().zip(metric_values) {
            sqlx::query(
                "INSERT INTO analytics_metrics (metric_key, metric_value, computed_at) VALUES (?, ?, ?)",
            )
            .bind(key)
            .bind(value)
            .bind(&computed_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
            .bind(FINGERPRINT_KEY)
            .bind(&run.fingerprint)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
            .bind(LAST_RUN_KEY)
            .bind(&computed_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            customers = run.customers.len(),
            authors = run.authors.len(),
            books = run.books.len(),
            transactions = run.transactions.len(),
            "Run snapshot saved"
        );
        Ok(())
    }
}
