//! Customer identity resolution
//!
//! Match rules, in precedence order:
//!
//! 1. Identical normalized email — the only near-unique field across
//!    sources, so it merges unconditionally.
//! 2. Identical normalized name plus an identical corroborating field
//!    (address, then phone, per the configured policy).
//! 3. Identical name alone is only a candidate pair: counted, never
//!    merged. Common names must not collapse into one customer.
//!
//! Merges go through union-find, so any processing order produces the
//! same partition.

use super::{canonical_id, union_find::UnionFind};
use crate::types::{CanonicalCustomer, CustomerRecord, SourceId};
use salesdash_common::config::{CorroboratingField, MatchPolicy};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;
use uuid::Uuid;

/// Canonical customers plus the source_id lookup used by the linker
#[derive(Debug)]
pub struct CustomerResolution {
    pub customers: Vec<CanonicalCustomer>,
    pub index: HashMap<SourceId, Uuid>,
    /// Same-name pairs left unmerged for lack of corroboration
    pub name_only_candidates: u64,
}

/// Partition customer records into canonical customers
pub fn resolve_customers(records: &[CustomerRecord], policy: &MatchPolicy) -> CustomerResolution {
    let mut uf = UnionFind::new(records.len());

    // Rule 1: exact email match
    let mut by_email: HashMap<&str, usize> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        if let Some(email) = record.email_key.as_deref() {
            match by_email.entry(email) {
                Entry::Occupied(entry) => {
                    uf.union(*entry.get(), i);
                }
                Entry::Vacant(entry) => {
                    entry.insert(i);
                }
            }
        }
    }

    // Rule 2: name + corroborating field
    for field in &policy.corroborating_fields {
        let mut by_composite: HashMap<(&str, &str), usize> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            let corroborator = match field {
                CorroboratingField::Address => record.address_key.as_deref(),
                CorroboratingField::Phone => record.phone_key.as_deref(),
            };
            if let Some(value) = corroborator {
                match by_composite.entry((record.name_key.as_str(), value)) {
                    Entry::Occupied(entry) => {
                        uf.union(*entry.get(), i);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(i);
                    }
                }
            }
        }
    }

    // Rule 3: name-only pairs stay distinct; count them as candidates
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        by_name.entry(record.name_key.as_str()).or_default().push(i);
    }
    let mut name_only_candidates = 0u64;
    for indices in by_name.values() {
        let roots: BTreeSet<usize> = indices.iter().map(|&i| uf.find(i)).collect();
        let distinct = roots.len() as u64;
        name_only_candidates += distinct * (distinct - 1) / 2;
    }

    // Materialize canonical customers from the partition
    let mut customers = Vec::new();
    let mut index = HashMap::new();
    for group in uf.partitions() {
        let mut linked_ids: Vec<SourceId> = group
            .iter()
            .map(|&i| records[i].source_id.clone())
            .collect();
        linked_ids.sort();
        let anchor = linked_ids[0].clone();
        let id = canonical_id("customer", &anchor.to_string());

        // Profile selection: most complete record wins, ties to the
        // higher-priority source, then the smaller source key; remaining
        // gaps backfill from the rest in the same order
        let mut ordered: Vec<&CustomerRecord> = group.iter().map(|&i| &records[i]).collect();
        ordered.sort_by(|a, b| {
            b.completeness()
                .cmp(&a.completeness())
                .then_with(|| a.source_id.cmp(&b.source_id))
        });

        let best = ordered[0];
        let mut customer = CanonicalCustomer {
            id,
            name: best.name.clone(),
            email: best.email.clone(),
            address: best.address.clone(),
            phone: best.phone.clone(),
            linked_ids,
        };
        for record in ordered.iter().skip(1) {
            if customer.email.is_none() {
                customer.email = record.email.clone();
            }
            if customer.address.is_none() {
                customer.address = record.address.clone();
            }
            if customer.phone.is_none() {
                customer.phone = record.phone.clone();
            }
        }

        for source_id in &customer.linked_ids {
            index.insert(source_id.clone(), id);
        }
        customers.push(customer);
    }
    customers.sort_by(|a, b| a.linked_ids[0].cmp(&b.linked_ids[0]));

    debug!(
        raw = records.len(),
        canonical = customers.len(),
        name_only_candidates,
        "Resolved customer identities"
    );

    CustomerResolution {
        customers,
        index,
        name_only_candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use std::collections::BTreeSet;

    fn record(
        source: Source,
        key: &str,
        name: &str,
        email: Option<&str>,
        address: Option<&str>,
        phone: Option<&str>,
    ) -> CustomerRecord {
        CustomerRecord {
            source_id: SourceId::new(source, key),
            name: name.to_string(),
            name_key: name.to_lowercase(),
            email: email.map(str::to_string),
            email_key: email.map(str::to_lowercase),
            address: address.map(str::to_string),
            address_key: address.map(str::to_lowercase),
            phone: phone.map(str::to_string),
            phone_key: phone.map(str::to_string),
        }
    }

    fn partition(resolution: &CustomerResolution) -> BTreeSet<BTreeSet<SourceId>> {
        resolution
            .customers
            .iter()
            .map(|c| c.linked_ids.iter().cloned().collect())
            .collect()
    }

    #[test]
    fn matching_email_merges_across_sources() {
        let records = vec![
            record(Source::Data1, "c100", "Jane Doe", Some("jane@example.com"), None, None),
            record(Source::Data2, "cust-42", "J. Doe", Some("jane@example.com"), None, None),
        ];
        let resolution = resolve_customers(&records, &MatchPolicy::default());

        assert_eq!(resolution.customers.len(), 1);
        let linked: BTreeSet<SourceId> =
            resolution.customers[0].linked_ids.iter().cloned().collect();
        let expected: BTreeSet<SourceId> = [
            SourceId::new(Source::Data1, "c100"),
            SourceId::new(Source::Data2, "cust-42"),
        ]
        .into_iter()
        .collect();
        assert_eq!(linked, expected);
    }

    #[test]
    fn name_plus_address_merges() {
        let records = vec![
            record(Source::Data1, "1", "Jane Doe", None, Some("1 Main St"), None),
            record(Source::Data3, "u7", "Jane Doe", None, Some("1 main st"), None),
        ];
        let resolution = resolve_customers(&records, &MatchPolicy::default());
        assert_eq!(resolution.customers.len(), 1);
    }

    #[test]
    fn name_plus_phone_corroborates_without_address() {
        let records = vec![
            record(Source::Data1, "1", "Jane Doe", None, None, Some("555-0100")),
            record(Source::Data2, "2", "Jane Doe", None, None, Some("555-0100")),
        ];
        let resolution = resolve_customers(&records, &MatchPolicy::default());
        assert_eq!(resolution.customers.len(), 1);
    }

    #[test]
    fn name_alone_never_merges() {
        let records = vec![
            record(Source::Data1, "1", "John Smith", None, Some("1 Main St"), None),
            record(Source::Data2, "2", "John Smith", None, Some("9 Oak Ave"), None),
        ];
        let resolution = resolve_customers(&records, &MatchPolicy::default());

        assert_eq!(resolution.customers.len(), 2);
        assert_eq!(resolution.name_only_candidates, 1);
    }

    #[test]
    fn restricted_policy_ignores_address() {
        let policy = MatchPolicy {
            corroborating_fields: vec![CorroboratingField::Phone],
        };
        let records = vec![
            record(Source::Data1, "1", "Jane Doe", None, Some("1 Main St"), None),
            record(Source::Data2, "2", "Jane Doe", None, Some("1 Main St"), None),
        ];
        let resolution = resolve_customers(&records, &policy);
        assert_eq!(resolution.customers.len(), 2);
    }

    #[test]
    fn unmatched_record_is_a_singleton_not_an_error() {
        let records = vec![record(Source::Data1, "1", "Solo Person", None, None, None)];
        let resolution = resolve_customers(&records, &MatchPolicy::default());
        assert_eq!(resolution.customers.len(), 1);
        assert_eq!(
            resolution.customers[0].linked_ids,
            vec![SourceId::new(Source::Data1, "1")]
        );
    }

    #[test]
    fn partition_covers_every_source_id_exactly_once() {
        let records = vec![
            record(Source::Data1, "1", "Jane Doe", Some("jane@example.com"), None, None),
            record(Source::Data2, "2", "Jane Doe", Some("jane@example.com"), None, None),
            record(Source::Data2, "3", "Bob Ray", None, None, None),
            record(Source::Data3, "4", "Ann Lee", None, Some("2 Elm St"), None),
        ];
        let resolution = resolve_customers(&records, &MatchPolicy::default());

        let mut seen = Vec::new();
        for customer in &resolution.customers {
            assert!(!customer.linked_ids.is_empty());
            seen.extend(customer.linked_ids.iter().cloned());
        }
        seen.sort();
        let mut expected: Vec<SourceId> =
            records.iter().map(|r| r.source_id.clone()).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn resolution_is_order_independent() {
        let records = vec![
            record(Source::Data1, "1", "Jane Doe", Some("jane@example.com"), None, None),
            record(Source::Data2, "2", "Jane Doe", Some("jane@example.com"), Some("1 Main St"), None),
            record(Source::Data3, "3", "Jane Doe", None, Some("1 main st"), None),
            record(Source::Data1, "4", "Bob Ray", None, None, Some("555-0100")),
            record(Source::Data2, "5", "Bob Ray", None, None, Some("555-0100")),
            record(Source::Data3, "6", "Cat Fox", None, None, None),
        ];
        let baseline = resolve_customers(&records, &MatchPolicy::default());

        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(3);
        let mut swapped = records.clone();
        swapped.swap(0, 5);
        swapped.swap(1, 4);

        for variant in [reversed, rotated, swapped] {
            let resolution = resolve_customers(&variant, &MatchPolicy::default());
            assert_eq!(partition(&resolution), partition(&baseline));
            // Canonical ids are anchored to the smallest source_id, so they
            // agree as well
            let ids: BTreeSet<Uuid> = resolution.customers.iter().map(|c| c.id).collect();
            let baseline_ids: BTreeSet<Uuid> = baseline.customers.iter().map(|c| c.id).collect();
            assert_eq!(ids, baseline_ids);
        }
    }

    #[test]
    fn profile_comes_from_most_complete_record() {
        let records = vec![
            record(Source::Data1, "1", "J Doe", Some("jane@example.com"), None, None),
            record(
                Source::Data2,
                "2",
                "Jane Doe",
                Some("jane@example.com"),
                Some("1 Main St"),
                Some("555-0100"),
            ),
        ];
        let resolution = resolve_customers(&records, &MatchPolicy::default());

        let customer = &resolution.customers[0];
        assert_eq!(customer.name, "Jane Doe");
        assert_eq!(customer.address.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn profile_ties_break_by_source_priority() {
        let records = vec![
            record(Source::Data2, "2", "Jane D", Some("jane@example.com"), None, None),
            record(Source::Data1, "1", "Jane Doe", Some("jane@example.com"), None, None),
        ];
        let resolution = resolve_customers(&records, &MatchPolicy::default());
        // Equal completeness; DATA1 outranks DATA2
        assert_eq!(resolution.customers[0].name, "Jane Doe");
    }

    #[test]
    fn profile_gaps_backfill_from_other_records() {
        let records = vec![
            record(
                Source::Data1,
                "1",
                "Jane Doe",
                Some("jane@example.com"),
                Some("1 Main St"),
                None,
            ),
            record(Source::Data2, "2", "Jane Doe", Some("jane@example.com"), None, Some("555-0100")),
        ];
        let resolution = resolve_customers(&records, &MatchPolicy::default());

        let customer = &resolution.customers[0];
        assert_eq!(customer.address.as_deref(), Some("1 Main St"));
        assert_eq!(customer.phone.as_deref(), Some("555-0100"));
    }
}
