//! Transaction linkage
//!
//! Resolves each transaction's customer and book references to canonical
//! entities via source_id membership. A reference that was dropped during
//! normalization or never existed becomes an [`UnresolvedLinkage`] and the
//! transaction is excluded from aggregation; the run continues.

use crate::resolve::{BookResolution, CustomerResolution};
use crate::types::{
    CanonicalCustomer, LinkedTransaction, TransactionRecord, UnresolvedLinkage,
};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// Linked transactions plus the references that failed to resolve
#[derive(Debug)]
pub struct LinkOutcome {
    pub transactions: Vec<LinkedTransaction>,
    pub unresolved: Vec<UnresolvedLinkage>,
}

/// Link all transaction records to canonical customers and books
pub fn link_transactions(
    records: &[TransactionRecord],
    customers: &CustomerResolution,
    books: &BookResolution,
) -> LinkOutcome {
    let by_customer_id: HashMap<Uuid, &CanonicalCustomer> =
        customers.customers.iter().map(|c| (c.id, c)).collect();

    let mut transactions = Vec::with_capacity(records.len());
    let mut unresolved = Vec::new();

    for record in records {
        let Some(&customer_id) = customers.index.get(&record.customer_ref) else {
            warn!(
                transaction = %record.source_id,
                reference = %record.customer_ref,
                "Unresolved customer reference"
            );
            unresolved.push(UnresolvedLinkage {
                source_id: record.source_id.clone(),
                reason: format!("customer reference {} not found", record.customer_ref),
            });
            continue;
        };
        let Some(&book_id) = books.index.get(&record.book_ref) else {
            warn!(
                transaction = %record.source_id,
                reference = %record.book_ref,
                "Unresolved book reference"
            );
            unresolved.push(UnresolvedLinkage {
                source_id: record.source_id.clone(),
                reason: format!("book reference {} not found", record.book_ref),
            });
            continue;
        };

        let delivery_address = by_customer_id
            .get(&customer_id)
            .and_then(|customer| customer.address.clone());

        transactions.push(LinkedTransaction {
            source_id: record.source_id.clone(),
            customer_id,
            book_id,
            quantity: record.quantity,
            unit_price: record.unit_price,
            amount: record.amount,
            date: record.date,
            delivery_address,
        });
    }

    debug!(
        linked = transactions.len(),
        unresolved = unresolved.len(),
        "Linked transactions"
    );

    LinkOutcome {
        transactions,
        unresolved,
    }
}
