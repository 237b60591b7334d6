//! Author identity resolution
//!
//! Authors carry no email or address, so the rule set narrows to the name
//! plus a corroborating co-occurring title:
//!
//! - within one source, identical normalized name is one author (a source's
//!   catalog is internally consistent about its own spellings);
//! - across sources, identical normalized name merges only when the two
//!   mentions share a book title. Same name over disjoint titles stays
//!   distinct.
//!
//! The unit of partitioning is the author *mention* — one (book record,
//! author name) pair — so co-authored books contribute their source_id to
//! each of their authors.

use super::{canonical_id, union_find::UnionFind};
use crate::types::{BookRecord, CanonicalAuthor, Source, SourceId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Canonical authors plus the mention lookup used when resolving books
#[derive(Debug)]
pub struct AuthorResolution {
    pub authors: Vec<CanonicalAuthor>,
    /// (book source_id, author comparison key) → canonical author id
    pub index: HashMap<(SourceId, String), Uuid>,
}

/// Partition author mentions across the book records into canonical authors
pub fn resolve_authors(books: &[BookRecord]) -> AuthorResolution {
    // Flatten mentions: (book index, author position)
    let mut mentions: Vec<(usize, usize)> = Vec::new();
    for (book_index, book) in books.iter().enumerate() {
        for author_index in 0..book.author_keys.len() {
            mentions.push((book_index, author_index));
        }
    }

    let mut uf = UnionFind::new(mentions.len());
    let mut by_source_name: HashMap<(Source, &str), usize> = HashMap::new();
    let mut by_name_title: HashMap<(&str, &str), usize> = HashMap::new();

    for (mention, &(book_index, author_index)) in mentions.iter().enumerate() {
        let book = &books[book_index];
        let name_key = book.author_keys[author_index].as_str();

        match by_source_name.entry((book.source_id.source, name_key)) {
            Entry::Occupied(entry) => {
                uf.union(*entry.get(), mention);
            }
            Entry::Vacant(entry) => {
                entry.insert(mention);
            }
        }

        match by_name_title.entry((name_key, book.title_key.as_str())) {
            Entry::Occupied(entry) => {
                uf.union(*entry.get(), mention);
            }
            Entry::Vacant(entry) => {
                entry.insert(mention);
            }
        }
    }

    let mut authors = Vec::new();
    let mut index = HashMap::new();
    for group in uf.partitions() {
        let mut source_ids: Vec<SourceId> = group
            .iter()
            .map(|&m| books[mentions[m].0].source_id.clone())
            .collect();
        source_ids.sort();
        source_ids.dedup();

        // Display name from the highest-priority contributing record
        let mut chosen = mentions[group[0]];
        for &m in &group[1..] {
            if books[mentions[m].0].source_id < books[chosen.0].source_id {
                chosen = mentions[m];
            }
        }
        let name = books[chosen.0].authors[chosen.1].clone();
        let name_key = books[chosen.0].author_keys[chosen.1].clone();

        let id = canonical_id("author", &format!("{}|{}", name_key, source_ids[0]));
        for &m in &group {
            let (book_index, author_index) = mentions[m];
            let book = &books[book_index];
            index.insert(
                (
                    book.source_id.clone(),
                    book.author_keys[author_index].clone(),
                ),
                id,
            );
        }
        authors.push(CanonicalAuthor {
            id,
            name,
            source_ids,
        });
    }
    authors.sort_by(|a, b| {
        (a.name.to_lowercase(), &a.source_ids[0]).cmp(&(b.name.to_lowercase(), &b.source_ids[0]))
    });

    debug!(
        mentions = mentions.len(),
        canonical = authors.len(),
        "Resolved author identities"
    );

    AuthorResolution { authors, index }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(source: Source, key: &str, title: &str, authors: &[&str]) -> BookRecord {
        BookRecord {
            source_id: SourceId::new(source, key),
            title: title.to_string(),
            title_key: title.to_lowercase(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            author_keys: authors.iter().map(|a| a.to_lowercase()).collect(),
            genre: None,
            publisher: None,
            year: None,
        }
    }

    #[test]
    fn shared_title_merges_across_sources() {
        let books = vec![
            book(Source::Data1, "1", "Dune", &["Frank Herbert"]),
            book(Source::Data2, "b7", "Dune", &["Frank Herbert"]),
        ];
        let resolution = resolve_authors(&books);

        assert_eq!(resolution.authors.len(), 1);
        assert_eq!(
            resolution.authors[0].source_ids,
            vec![
                SourceId::new(Source::Data1, "1"),
                SourceId::new(Source::Data2, "b7"),
            ]
        );
    }

    #[test]
    fn same_name_disjoint_titles_stays_distinct() {
        let books = vec![
            book(Source::Data1, "1", "Gardening Basics", &["John Smith"]),
            book(Source::Data2, "2", "Quantum Fields", &["John Smith"]),
        ];
        let resolution = resolve_authors(&books);
        assert_eq!(resolution.authors.len(), 2);
    }

    #[test]
    fn same_source_same_name_is_one_author() {
        let books = vec![
            book(Source::Data1, "1", "Dune", &["Frank Herbert"]),
            book(Source::Data1, "2", "Dune Messiah", &["Frank Herbert"]),
        ];
        let resolution = resolve_authors(&books);

        assert_eq!(resolution.authors.len(), 1);
        assert_eq!(resolution.authors[0].source_ids.len(), 2);
    }

    #[test]
    fn transitive_merge_through_a_shared_title() {
        // DATA1 knows titles A+B, DATA2 knows B+C; B bridges them
        let books = vec![
            book(Source::Data1, "1", "Title A", &["Jane Doe"]),
            book(Source::Data1, "2", "Title B", &["Jane Doe"]),
            book(Source::Data2, "3", "Title B", &["Jane Doe"]),
            book(Source::Data2, "4", "Title C", &["Jane Doe"]),
        ];
        let resolution = resolve_authors(&books);

        assert_eq!(resolution.authors.len(), 1);
        assert_eq!(resolution.authors[0].source_ids.len(), 4);
    }

    #[test]
    fn co_authors_each_keep_the_book() {
        let books = vec![book(
            Source::Data1,
            "1",
            "Good Omens",
            &["Terry Pratchett", "Neil Gaiman"],
        )];
        let resolution = resolve_authors(&books);

        assert_eq!(resolution.authors.len(), 2);
        for author in &resolution.authors {
            assert_eq!(author.source_ids, vec![SourceId::new(Source::Data1, "1")]);
        }
        // Distinct canonical ids despite the shared anchor book
        assert_ne!(resolution.authors[0].id, resolution.authors[1].id);
    }

    #[test]
    fn mention_index_covers_every_mention() {
        let books = vec![
            book(Source::Data1, "1", "Dune", &["Frank Herbert"]),
            book(Source::Data2, "2", "Dune", &["Frank Herbert"]),
            book(Source::Data2, "3", "Neuromancer", &["William Gibson"]),
        ];
        let resolution = resolve_authors(&books);

        for record in &books {
            for key in &record.author_keys {
                assert!(
                    resolution
                        .index
                        .contains_key(&(record.source_id.clone(), key.clone())),
                    "missing mention {} {}",
                    record.source_id,
                    key
                );
            }
        }
    }

    #[test]
    fn resolution_is_order_independent() {
        let books = vec![
            book(Source::Data1, "1", "Title A", &["Jane Doe"]),
            book(Source::Data1, "2", "Title B", &["Jane Doe"]),
            book(Source::Data2, "3", "Title B", &["Jane Doe"]),
            book(Source::Data3, "4", "Title Z", &["Jane Doe"]),
        ];
        let baseline = resolve_authors(&books);

        let mut reversed = books.clone();
        reversed.reverse();
        let variant = resolve_authors(&reversed);

        let baseline_sets: Vec<Vec<SourceId>> =
            baseline.authors.iter().map(|a| a.source_ids.clone()).collect();
        let variant_sets: Vec<Vec<SourceId>> =
            variant.authors.iter().map(|a| a.source_ids.clone()).collect();
        assert_eq!(baseline_sets, variant_sets);
    }
}
