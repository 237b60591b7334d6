//! Record normalization
//!
//! Maps one source's raw rows into the three typed record shapes using the
//! source's configured field layout. Rows whose required fields cannot be
//! parsed become [`NormalizationError`]s and are excluded from downstream
//! processing; the run continues.

pub mod books;
pub mod cleaners;
pub mod customers;
pub mod transactions;

use crate::loader::LoadedSource;
use crate::types::{
    BookRecord, CustomerRecord, NormalizationError, RawRow, Source, TransactionRecord,
};
use salesdash_common::config::SourceFieldMap;
use tracing::debug;

pub use books::normalize_books;
pub use customers::normalize_customers;
pub use transactions::normalize_transactions;

/// One source's typed records plus the rows that failed normalization
#[derive(Debug)]
pub struct NormalizedSource {
    pub source: Source,
    pub books: Vec<BookRecord>,
    pub customers: Vec<CustomerRecord>,
    pub transactions: Vec<TransactionRecord>,
    pub errors: Vec<NormalizationError>,
    /// Carried through from the loader
    pub raw_rows_skipped: u64,
}

/// Normalize everything one loader produced
pub fn normalize_source(loaded: LoadedSource, layout: &SourceFieldMap) -> NormalizedSource {
    let mut errors = Vec::new();

    let books = normalize_books(&loaded.books, layout, &mut errors);
    let customers = normalize_customers(&loaded.customers, layout, &mut errors);
    let transactions = normalize_transactions(&loaded.orders, layout, &mut errors);

    debug!(
        source = %loaded.source,
        books = books.len(),
        customers = customers.len(),
        transactions = transactions.len(),
        errors = errors.len(),
        "Normalized source records"
    );

    NormalizedSource {
        source: loaded.source,
        books,
        customers,
        transactions,
        errors,
        raw_rows_skipped: loaded.skipped_rows,
    }
}

/// Compact one-line rendering of a raw row for error records and logs
pub(crate) fn row_excerpt(row: &RawRow) -> String {
    let parts: Vec<String> = row
        .fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    parts.join(" ")
}
