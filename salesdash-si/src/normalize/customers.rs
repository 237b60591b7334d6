//! Customer roster normalization

use super::{cleaners, row_excerpt};
use crate::types::{CustomerRecord, NormalizationError, RawRow, RecordKind, SourceId};
use salesdash_common::config::SourceFieldMap;
use salesdash_common::text::{collapse_whitespace, comparison_key, optional_key};

/// Normalize one source's customer rows
pub fn normalize_customers(
    rows: &[RawRow],
    layout: &SourceFieldMap,
    errors: &mut Vec<NormalizationError>,
) -> Vec<CustomerRecord> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match normalize_customer(row, layout) {
            Ok(record) => records.push(record),
            Err(reason) => errors.push(NormalizationError {
                source: row.source,
                kind: RecordKind::Customer,
                row: row_excerpt(row),
                reason,
            }),
        }
    }
    records
}

fn normalize_customer(
    row: &RawRow,
    layout: &SourceFieldMap,
) -> std::result::Result<CustomerRecord, String> {
    let field = |canonical: &str| {
        layout
            .customer_field(canonical)
            .and_then(|f| row.get_str(f))
    };

    let key = field("id").ok_or("missing customer id")?;
    let name_raw = field("name").ok_or("missing name")?;
    let name = collapse_whitespace(&name_raw);
    let name_key = comparison_key(&name).ok_or("blank name")?;

    let email = field("email");
    let email_key = optional_key(email.as_deref());
    let address = field("address").map(|a| collapse_whitespace(&a));
    let address_key = optional_key(address.as_deref());
    let phone = field("phone").map(|p| cleaners::standardize_phone(&p));
    let phone_key = optional_key(phone.as_deref());

    Ok(CustomerRecord {
        source_id: SourceId::new(row.source, key),
        name,
        name_key,
        email,
        email_key,
        address,
        address_key,
        phone,
        phone_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use salesdash_common::config::default_layout;
    use serde_json::json;

    fn customer_row(source: Source, fields: &[(&str, &str)]) -> RawRow {
        let mut row = RawRow::new(source);
        for (key, value) in fields {
            row.fields.push((key.to_string(), json!(value)));
        }
        row
    }

    #[test]
    fn normalizes_with_source_specific_layout() {
        let layout = default_layout(Source::Data2);
        let rows = vec![customer_row(
            Source::Data2,
            &[
                ("customer_id", "cust-42"),
                ("full_name", "  Jane   Doe "),
                ("email_address", "Jane.Doe@Example.com"),
                ("delivery_address", "1 Main  St"),
                ("phone_number", "(02) 123.456"),
            ],
        )];

        let mut errors = Vec::new();
        let records = normalize_customers(&rows, &layout, &mut errors);
        assert!(errors.is_empty());

        let record = &records[0];
        assert_eq!(record.source_id, SourceId::new(Source::Data2, "cust-42"));
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.name_key, "jane doe");
        assert_eq!(record.email_key.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(record.email.as_deref(), Some("Jane.Doe@Example.com"));
        assert_eq!(record.address.as_deref(), Some("1 Main St"));
        assert_eq!(record.phone.as_deref(), Some("02-123-456"));
    }

    #[test]
    fn nameless_row_is_recorded_not_fatal() {
        let layout = default_layout(Source::Data1);
        let rows = vec![
            customer_row(Source::Data1, &[("id", "1"), ("name", "Jane")]),
            customer_row(Source::Data1, &[("id", "2"), ("name", "   ")]),
        ];

        let mut errors = Vec::new();
        let records = normalize_customers(&rows, &layout, &mut errors);
        assert_eq!(records.len(), 1);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, RecordKind::Customer);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let layout = default_layout(Source::Data3);
        let rows = vec![customer_row(
            Source::Data3,
            &[("uid", "u9"), ("customer", "Bob Ray")],
        )];

        let mut errors = Vec::new();
        let records = normalize_customers(&rows, &layout, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(records[0].email, None);
        assert_eq!(records[0].address, None);
        assert_eq!(records[0].phone, None);
        assert_eq!(records[0].completeness(), 1);
    }
}
