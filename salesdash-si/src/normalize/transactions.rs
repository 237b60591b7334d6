//! Order log normalization

use super::row_excerpt;
use crate::types::{NormalizationError, RawRow, RecordKind, SourceId, TransactionRecord};
use rust_decimal::Decimal;
use salesdash_common::config::SourceFieldMap;
use salesdash_common::{dates, money};

/// Normalize one source's order rows. Sources without an order-id column
/// key transactions by line ordinal.
pub fn normalize_transactions(
    rows: &[RawRow],
    layout: &SourceFieldMap,
    errors: &mut Vec<NormalizationError>,
) -> Vec<TransactionRecord> {
    let mut records = Vec::with_capacity(rows.len());
    for (ordinal, row) in rows.iter().enumerate() {
        match normalize_transaction(row, layout, ordinal) {
            Ok(record) => records.push(record),
            Err(reason) => errors.push(NormalizationError {
                source: row.source,
                kind: RecordKind::Transaction,
                row: row_excerpt(row),
                reason,
            }),
        }
    }
    records
}

fn normalize_transaction(
    row: &RawRow,
    layout: &SourceFieldMap,
    ordinal: usize,
) -> std::result::Result<TransactionRecord, String> {
    let field = |canonical: &str| layout.order_field(canonical).and_then(|f| row.get_str(f));

    let key = field("id").unwrap_or_else(|| format!("row-{}", ordinal + 1));
    let customer_key = field("customer").ok_or("missing customer reference")?;
    let book_key = field("book").ok_or("missing book reference")?;

    let quantity = match field("quantity") {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("unparseable quantity: {}", raw))?,
        None => 1,
    };

    let price_raw = field("unit_price").ok_or("missing unit price")?;
    let unit_price = money::parse_price(&price_raw)
        .ok_or_else(|| format!("unparseable price: {}", price_raw))?;

    let timestamp = field("timestamp").ok_or("missing timestamp")?;
    let date = dates::parse_transaction_date(&timestamp)
        .ok_or_else(|| format!("unparseable date: {}", timestamp))?;

    let amount = money::round_cents(unit_price * Decimal::from(quantity));

    Ok(TransactionRecord {
        source_id: SourceId::new(row.source, key),
        customer_ref: SourceId::new(row.source, customer_key),
        book_ref: SourceId::new(row.source, book_key),
        quantity,
        unit_price,
        amount,
        date,
    })
}
