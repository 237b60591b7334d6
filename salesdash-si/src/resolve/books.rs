//! Book catalog resolution
//!
//! Books merge on their strongest available composite: identical title key
//! and identical author key set. The grouping key is total, so the result
//! does not depend on record order.

use super::canonical_id;
use crate::resolve::AuthorResolution;
use crate::types::{BookRecord, CanonicalBook, SourceId};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use uuid::Uuid;

/// Canonical books plus the source_id lookup used by the linker
#[derive(Debug)]
pub struct BookResolution {
    pub books: Vec<CanonicalBook>,
    pub index: HashMap<SourceId, Uuid>,
}

/// Merge book records into canonical books and attach canonical author ids
pub fn resolve_books(records: &[BookRecord], authors: &AuthorResolution) -> BookResolution {
    let mut groups: BTreeMap<(String, Vec<String>), Vec<usize>> = BTreeMap::new();
    for (i, record) in records.iter().enumerate() {
        let mut author_keys = record.author_keys.clone();
        author_keys.sort();
        author_keys.dedup();
        groups
            .entry((record.title_key.clone(), author_keys))
            .or_default()
            .push(i);
    }

    let mut books = Vec::new();
    let mut index = HashMap::new();
    for (_, members) in groups {
        let mut source_ids: Vec<SourceId> = members
            .iter()
            .map(|&i| records[i].source_id.clone())
            .collect();
        source_ids.sort();
        let id = canonical_id("book", &source_ids[0].to_string());

        // Profile fields come from the highest-priority source, remaining
        // gaps from the rest in priority order
        let mut ordered: Vec<&BookRecord> = members.iter().map(|&i| &records[i]).collect();
        ordered.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        let best = ordered[0];

        let mut author_ids: Vec<Uuid> = best
            .author_keys
            .iter()
            .filter_map(|key| {
                authors
                    .index
                    .get(&(best.source_id.clone(), key.clone()))
                    .copied()
            })
            .collect();
        author_ids.sort();
        author_ids.dedup();

        let genre = ordered.iter().find_map(|r| r.genre.clone());
        let publisher = ordered.iter().find_map(|r| r.publisher.clone());
        let year = ordered.iter().find_map(|r| r.year);

        for source_id in &source_ids {
            index.insert(source_id.clone(), id);
        }
        books.push(CanonicalBook {
            id,
            title: best.title.clone(),
            authors: author_ids,
            genre,
            publisher,
            year,
            source_ids,
        });
    }
    books.sort_by(|a, b| a.source_ids[0].cmp(&b.source_ids[0]));

    debug!(raw = records.len(), canonical = books.len(), "Resolved book catalog");

    BookResolution { books, index }
}
