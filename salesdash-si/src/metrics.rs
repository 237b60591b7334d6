//! Dashboard metric aggregation
//!
//! All metrics come out of a single pass over the linked transactions plus
//! constant-time lookups into the canonical entity tables; no metric
//! re-scans the transaction set.
//!
//! Every ranking has a total tie-break order (revenue/count, then earliest
//! date, then identifier) so repeated runs emit identical output.

use crate::types::{CanonicalAuthor, CanonicalBook, CanonicalCustomer, LinkedTransaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// One entry of the top-revenue-days ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueDay {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

/// Sales attribution for the most popular author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSales {
    pub author_id: Uuid,
    pub author_name: String,
    pub books_sold: u64,
}

/// Spend attribution for the top customer, auditable back to the raw
/// sources through the linked ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCustomer {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub total_spent: Decimal,
    pub linked_ids: Vec<String>,
}

/// The dashboard metric set for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub top_revenue_days: Vec<RevenueDay>,
    pub unique_customer_count: u64,
    pub unique_author_count: u64,
    pub most_popular_author: Option<AuthorSales>,
    pub top_customer: Option<TopCustomer>,
}

/// Compute the dashboard metrics from the fully linked entity graph
pub fn aggregate(
    transactions: &[LinkedTransaction],
    customers: &[CanonicalCustomer],
    authors: &[CanonicalAuthor],
    books: &[CanonicalBook],
) -> DashboardMetrics {
    let book_authors: HashMap<Uuid, &[Uuid]> = books
        .iter()
        .map(|book| (book.id, book.authors.as_slice()))
        .collect();

    let mut revenue_by_day: HashMap<NaiveDate, Decimal> = HashMap::new();
    let mut customer_spend: HashMap<Uuid, (Decimal, NaiveDate)> = HashMap::new();
    let mut author_sales: HashMap<Uuid, (u64, NaiveDate)> = HashMap::new();

    for txn in transactions {
        *revenue_by_day.entry(txn.date).or_insert(Decimal::ZERO) += txn.amount;

        let spend = customer_spend
            .entry(txn.customer_id)
            .or_insert((Decimal::ZERO, txn.date));
        spend.0 += txn.amount;
        if txn.date < spend.1 {
            spend.1 = txn.date;
        }

        if let Some(author_ids) = book_authors.get(&txn.book_id) {
            for &author_id in *author_ids {
                let sales = author_sales.entry(author_id).or_insert((0, txn.date));
                sales.0 += 1;
                if txn.date < sales.1 {
                    sales.1 = txn.date;
                }
            }
        }
    }

    let mut top_revenue_days: Vec<RevenueDay> = revenue_by_day
        .into_iter()
        .map(|(date, revenue)| RevenueDay { date, revenue })
        .collect();
    top_revenue_days.sort_by(|a, b| b.revenue.cmp(&a.revenue).then(a.date.cmp(&b.date)));
    top_revenue_days.truncate(5);

    let author_names: HashMap<Uuid, &str> = authors
        .iter()
        .map(|author| (author.id, author.name.as_str()))
        .collect();
    let most_popular_author = author_sales
        .into_iter()
        .map(|(id, (count, first_date))| (id, count, first_date))
        .min_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)))
        .map(|(id, count, _)| AuthorSales {
            author_id: id,
            author_name: author_names.get(&id).copied().unwrap_or("").to_string(),
            books_sold: count,
        });

    let customer_profiles: HashMap<Uuid, &CanonicalCustomer> =
        customers.iter().map(|customer| (customer.id, customer)).collect();
    let top_customer = customer_spend
        .into_iter()
        .map(|(id, (total, first_date))| (id, total, first_date))
        .min_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)).then(a.0.cmp(&b.0)))
        .and_then(|(id, total, _)| {
            customer_profiles.get(&id).map(|profile| TopCustomer {
                customer_id: id,
                customer_name: profile.name.clone(),
                total_spent: total,
                linked_ids: profile.linked_ids.iter().map(|sid| sid.to_string()).collect(),
            })
        });

    DashboardMetrics {
        top_revenue_days,
        unique_customer_count: customers.len() as u64,
        unique_author_count: authors.len() as u64,
        most_popular_author,
        top_customer,
    }
}
