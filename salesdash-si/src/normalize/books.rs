//! Book catalog normalization

use super::{cleaners, row_excerpt};
use crate::types::{BookRecord, NormalizationError, RawRow, RecordKind, SourceId};
use salesdash_common::config::SourceFieldMap;
use salesdash_common::text::comparison_key;

/// Normalize one source's book rows. After the per-row pass, missing
/// years backfill with the source's median year and blank publishers with
/// the source's most frequent publisher.
pub fn normalize_books(
    rows: &[RawRow],
    layout: &SourceFieldMap,
    errors: &mut Vec<NormalizationError>,
) -> Vec<BookRecord> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match normalize_book(row, layout) {
            Ok(record) => records.push(record),
            Err(reason) => errors.push(NormalizationError {
                source: row.source,
                kind: RecordKind::Book,
                row: row_excerpt(row),
                reason,
            }),
        }
    }

    let years: Vec<i32> = records.iter().filter_map(|r| r.year).collect();
    if let Some(median) = cleaners::median_year(&years) {
        for record in &mut records {
            if record.year.is_none() {
                record.year = Some(median);
            }
        }
    }

    let publishers: Vec<String> = records.iter().filter_map(|r| r.publisher.clone()).collect();
    if let Some(mode) = cleaners::mode_publisher(&publishers) {
        for record in &mut records {
            if record.publisher.is_none() {
                record.publisher = Some(mode.clone());
            }
        }
    }

    records
}

fn normalize_book(
    row: &RawRow,
    layout: &SourceFieldMap,
) -> std::result::Result<BookRecord, String> {
    let field = |canonical: &str| layout.book_field(canonical).and_then(|f| row.get_str(f));

    let key = field("id").ok_or("missing book id")?;
    let title_raw = field("title").ok_or("missing title")?;
    let title = cleaners::clean_title(&title_raw);
    let title_key = comparison_key(&title).ok_or("blank title")?;

    let authors = field("author")
        .map(|raw| cleaners::split_authors(&raw))
        .unwrap_or_default();
    let author_keys: Vec<String> = authors.iter().map(|name| name.to_lowercase()).collect();

    let genre = field("genre");
    let publisher = field("publisher").filter(|p| !p.eq_ignore_ascii_case("null"));
    let year = field("year")
        .and_then(|raw| raw.parse::<f64>().ok())
        .map(|year| year as i32)
        .filter(|year| *year != 0);

    Ok(BookRecord {
        source_id: SourceId::new(row.source, key),
        title,
        title_key,
        authors,
        author_keys,
        genre,
        publisher,
        year,
    })
}
