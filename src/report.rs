//! Report aggregation over recorded transactions.
//!
//! Pure functions over a transaction slice: totals split by payment method,
//! the distinct date labels present, and a date-label filter for the history
//! view. Date labels are textual — the timestamp portion before the first
//! comma — and filtering matches by substring on the formatted string, not
//! by parsing dates.

use serde::Serialize;

use crate::ledger::{PaymentMethod, Transaction};

/// Summary figures for one period. Derived on demand, never persisted.
///
/// `total_cash + total_card` can fall short of `total_received`: payments
/// recorded with an unset method raise the grand total but land in neither
/// bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub period_label: String,
    pub total_received: f64,
    pub total_cash: f64,
    pub total_card: f64,
    pub tips_value: f64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate `transactions` into a [`Report`] labelled `period_label`.
///
/// Every bucket sums amount plus tips; `tips_value` is the tips sum alone.
/// Deterministic and order-independent.
pub fn summarize(period_label: &str, transactions: &[Transaction]) -> Report {
    let mut report = Report {
        period_label: period_label.to_string(),
        total_received: 0.0,
        total_cash: 0.0,
        total_card: 0.0,
        tips_value: 0.0,
    };

    for tx in transactions {
        report.total_received += tx.total();
        report.tips_value += tx.tips;
        match tx.method {
            PaymentMethod::Cash => report.total_cash += tx.total(),
            PaymentMethod::Card => report.total_card += tx.total(),
            PaymentMethod::Unset => {}
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Date labels
// ---------------------------------------------------------------------------

/// The date portion of a formatted timestamp: everything before the first
/// comma, or the whole string when no comma is present.
pub fn date_label(date: &str) -> &str {
    date.split(',').next().unwrap_or(date)
}

/// Transactions whose timestamp contains `date_label` as a substring.
pub fn filter_by_date_label<'a>(
    transactions: &'a [Transaction],
    date_label: &str,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|tx| tx.date.contains(date_label))
        .collect()
}

/// The distinct date labels present, in first-seen order, for populating a
/// history picker.
pub fn distinct_date_labels(transactions: &[Transaction]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for tx in transactions {
        let label = date_label(&tx.date);
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    labels
}

// ===========================================================================
// Tests
// ===========================================================================
