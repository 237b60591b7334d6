//! Domain types for the ingest pipeline
//!
//! The pipeline is strictly one-directional: raw rows become typed source
//! records exactly once, canonical entities are immutable after resolution,
//! and linked transactions reference canonical entities by stable id only
//! (no back-pointers).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

pub use salesdash_common::source::{Source, SourceId};

/// An untyped row as read from a snapshot file, field order preserved.
/// Ephemeral: discarded once the normalizer has produced a typed record.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub source: Source,
    pub fields: Vec<(String, Value)>,
}

impl RawRow {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            fields: Vec::new(),
        }
    }

    /// Raw value for a file-level field name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Scalar field coerced to a trimmed string; `None` for missing,
    /// null, blank, or non-scalar values
    pub fn get_str(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Normalized book catalog entry prior to cross-source merging
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub source_id: SourceId,
    pub title: String,
    pub title_key: String,
    /// Author display names, source order preserved
    pub authors: Vec<String>,
    /// Comparison keys parallel to `authors`
    pub author_keys: Vec<String>,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
}

/// Normalized customer roster entry prior to cross-source merging
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub source_id: SourceId,
    pub name: String,
    pub name_key: String,
    pub email: Option<String>,
    pub email_key: Option<String>,
    pub address: Option<String>,
    pub address_key: Option<String>,
    pub phone: Option<String>,
    pub phone_key: Option<String>,
}

impl CustomerRecord {
    /// Count of populated profile fields; drives merged-profile selection
    pub fn completeness(&self) -> usize {
        1 + self.email.is_some() as usize
            + self.address.is_some() as usize
            + self.phone.is_some() as usize
    }
}

/// Normalized order entry prior to linkage
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub source_id: SourceId,
    /// Source-local customer reference (same source as the order)
    pub customer_ref: SourceId,
    /// Source-local book reference (same source as the order)
    pub book_ref: SourceId,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// unit_price × quantity, rounded to cents
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// Deduplicated customer after cross-source resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCustomer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Every source-local identifier merged into this customer; sorted,
    /// never empty, never shared with another canonical customer
    pub linked_ids: Vec<SourceId>,
}

/// Deduplicated author after cross-source resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalAuthor {
    pub id: Uuid,
    pub name: String,
    /// Book records this author was mentioned by; sorted
    pub source_ids: Vec<SourceId>,
}

/// Deduplicated book after cross-source resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBook {
    pub id: Uuid,
    pub title: String,
    /// Canonical author ids, sorted
    pub authors: Vec<Uuid>,
    pub genre: Option<String>,
    pub publisher: Option<String>,
    pub year: Option<i32>,
    pub source_ids: Vec<SourceId>,
}

/// A transaction fully resolved to canonical entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedTransaction {
    pub source_id: SourceId,
    pub customer_id: Uuid,
    pub book_id: Uuid,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub amount: Decimal,
    pub date: NaiveDate,
    /// Delivery address denormalized from the canonical customer profile
    pub delivery_address: Option<String>,
}

/// Which record shape a normalization failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Book,
    Customer,
    Transaction,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Book => f.write_str("book"),
            RecordKind::Customer => f.write_str("customer"),
            RecordKind::Transaction => f.write_str("transaction"),
        }
    }
}

/// A row whose required fields could not be parsed. Recorded and counted;
/// never aborts the run.
#[derive(Debug, Clone)]
pub struct NormalizationError {
    pub source: Source,
    pub kind: RecordKind,
    /// Compact rendering of the offending row, for the log
    pub row: String,
    pub reason: String,
}

/// A transaction whose customer or book reference resolved to nothing.
/// Excluded from aggregation and counted; never aborts the run.
#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedLinkage {
    pub source_id: SourceId,
    pub reason: String,
}

/// Per-run counts of skipped and reconciled records, returned alongside
/// the metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Structurally malformed rows dropped by the loaders
    pub raw_rows_skipped: u64,
    /// Rows dropped by the normalizer (missing/unparseable required fields)
    pub normalization_errors: u64,
    /// Transactions excluded for dangling references
    pub unresolved_linkages: u64,
    /// Same-name customer pairs left unmerged for lack of corroboration
    pub name_only_candidates: u64,
    pub raw_customer_records: u64,
    pub canonical_customers: u64,
    pub canonical_authors: u64,
    pub canonical_books: u64,
    pub linked_transactions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_row_coerces_scalars() {
        let mut row = RawRow::new(Source::Data1);
        row.fields.push(("id".into(), json!(42)));
        row.fields.push(("name".into(), json!("  Jane  ")));
        row.fields.push(("note".into(), json!(null)));
        row.fields.push(("blank".into(), json!("   ")));

        assert_eq!(row.get_str("id"), Some("42".to_string()));
        assert_eq!(row.get_str("name"), Some("Jane".to_string()));
        assert_eq!(row.get_str("note"), None);
        assert_eq!(row.get_str("blank"), None);
        assert_eq!(row.get_str("missing"), None);
    }

    #[test]
    fn completeness_counts_populated_fields() {
        let record = CustomerRecord {
            source_id: SourceId::new(Source::Data1, "1"),
            name: "Jane".into(),
            name_key: "jane".into(),
            email: Some("jane@example.com".into()),
            email_key: Some("jane@example.com".into()),
            address: None,
            address_key: None,
            phone: Some("555-0100".into()),
            phone_key: Some("555-0100".into()),
        };
        assert_eq!(record.completeness(), 3);
    }
}
