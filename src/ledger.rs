//! Transaction types and the in-memory session ledger.
//!
//! A session ledger holds the transactions recorded since the session was
//! opened, in insertion order, together with a running total of amount plus
//! tips. The running total always equals the sum over the held transactions;
//! every mutation path maintains that equality.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

// ---------------------------------------------------------------------------
// Payment method
// ---------------------------------------------------------------------------

/// How a sale was paid. `Unset` is a recordable state: a payment entered
/// before a method was chosen. It counts toward the grand total but toward
/// neither the cash nor the card bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl PaymentMethod {
    /// The persisted wire string: `"Cash"`, `"Card"`, or `""`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Unset => "",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// One recorded sale. Immutable once created; removed only when the session
/// closes or the persisted slot is cleared.
///
/// `date` is a display-formatted local timestamp such as
/// `"6/1/2024, 10:30:00 AM"`; the portion before the first comma is the
/// transaction's date label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub method: PaymentMethod,
    pub tips: f64,
}

impl Transaction {
    /// Amount plus tips: the value this transaction contributes to totals.
    pub fn total(&self) -> f64 {
        self.amount + self.tips
    }
}

// ---------------------------------------------------------------------------
// Session ledger
// ---------------------------------------------------------------------------

/// The in-memory record of the current session.
///
/// Fields are private so the running-total equality cannot be broken from
/// outside; all mutation goes through [`record`](Self::record),
/// [`open`](Self::open), and [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct SessionLedger {
    transactions: Vec<Transaction>,
    running_total: f64,
    is_open: bool,
}

impl SessionLedger {
    /// A new ledger: no transactions, zero total, session closed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from a persisted snapshot. The session starts
    /// closed and the running total is recomputed from the restored list.
    pub fn restore(transactions: Vec<Transaction>) -> Self {
        let running_total = transactions.iter().map(Transaction::total).sum();
        Self {
            transactions,
            running_total,
            is_open: false,
        }
    }

    /// Record a payment stamped with `date`.
    ///
    /// Accepts when amount or tips is positive and both are finite;
    /// anything else is rejected with `InvalidAmount`. Rejects with
    /// `SessionClosed` while no session is open. On success the transaction
    /// is appended and its value added to the running total.
    pub fn record(
        &mut self,
        amount: f64,
        tips: f64,
        method: PaymentMethod,
        date: String,
    ) -> Result<Transaction, SessionError> {
        if !self.is_open {
            return Err(SessionError::SessionClosed);
        }
        // A non-finite value would poison the running total and serialize
        // as JSON null, making the whole persisted snapshot unreadable.
        if !(amount > 0.0 || tips > 0.0) || !amount.is_finite() || !tips.is_finite() {
            return Err(SessionError::InvalidAmount);
        }

        let tx = Transaction {
            date,
            amount,
            method,
            tips,
        };
        self.running_total += tx.total();
        self.transactions.push(tx.clone());
        Ok(tx)
    }

    /// Open the session. Restored transactions from a previous session are
    /// kept; opening is idempotent.
    pub fn open(&mut self) {
        self.is_open = true;
    }

    /// Close the session and wipe it: transactions emptied, total zeroed.
    pub fn clear(&mut self) {
        self.transactions.clear();
        self.running_total = 0.0;
        self.is_open = false;
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn running_total(&self) -> f64 {
        self.running_total
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn open_ledger() -> SessionLedger {
        let mut ledger = SessionLedger::new();
        ledger.open();
        ledger
    }

    fn stamp(n: u32) -> String {
        format!("6/1/2024, 10:3{n}:00 AM")
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    #[test]
    fn test_running_total_tracks_amount_plus_tips() {
        let mut ledger = open_ledger();
        ledger
            .record(10.0, 2.0, PaymentMethod::Cash, stamp(0))
            .expect("record cash");
        ledger
            .record(5.0, 0.0, PaymentMethod::Card, stamp(1))
            .expect("record card");

        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.running_total(), 17.0);

        let recomputed: f64 = ledger.transactions().iter().map(Transaction::total).sum();
        assert_eq!(ledger.running_total(), recomputed);
    }

    #[test]
    fn test_record_rejects_when_both_non_positive() {
        let mut ledger = open_ledger();

        let err = ledger
            .record(0.0, 0.0, PaymentMethod::Cash, stamp(0))
            .expect_err("zero/zero must be rejected");
        assert_eq!(err, SessionError::InvalidAmount);

        let err = ledger
            .record(-1.0, -1.0, PaymentMethod::Cash, stamp(1))
            .expect_err("negative/negative must be rejected");
        assert_eq!(err, SessionError::InvalidAmount);

        assert!(ledger.is_empty());
        assert_eq!(ledger.running_total(), 0.0);
    }

    #[test]
    fn test_record_rejects_non_finite_values() {
        let mut ledger = open_ledger();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = ledger
                .record(bad, 0.0, PaymentMethod::Cash, stamp(0))
                .expect_err("non-finite amount must be rejected");
            assert_eq!(err, SessionError::InvalidAmount);

            // Even alongside a positive amount, non-finite tips are refused.
            let err = ledger
                .record(10.0, bad, PaymentMethod::Cash, stamp(1))
                .expect_err("non-finite tips must be rejected");
            assert_eq!(err, SessionError::InvalidAmount);
        }

        assert!(ledger.is_empty());
        assert_eq!(ledger.running_total(), 0.0);
    }

    #[test]
    fn test_record_accepts_tips_only() {
        let mut ledger = open_ledger();
        let tx = ledger
            .record(0.0, 3.5, PaymentMethod::Unset, stamp(0))
            .expect("tips-only record accepted");

        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.tips, 3.5);
        assert_eq!(ledger.running_total(), 3.5);
    }

    #[test]
    fn test_record_requires_open_session() {
        let mut ledger = SessionLedger::new();
        let err = ledger
            .record(10.0, 0.0, PaymentMethod::Cash, stamp(0))
            .expect_err("closed session must reject records");
        assert_eq!(err, SessionError::SessionClosed);
        assert!(ledger.is_empty());
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    #[test]
    fn test_clear_resets_everything() {
        let mut ledger = open_ledger();
        ledger
            .record(12.0, 1.0, PaymentMethod::Card, stamp(0))
            .expect("record");

        ledger.clear();

        assert!(ledger.is_empty());
        assert_eq!(ledger.running_total(), 0.0);
        assert!(!ledger.is_open());
    }

    #[test]
    fn test_restore_recomputes_running_total() {
        let snapshot = vec![
            Transaction {
                date: stamp(0),
                amount: 10.0,
                method: PaymentMethod::Cash,
                tips: 2.0,
            },
            Transaction {
                date: stamp(1),
                amount: 5.0,
                method: PaymentMethod::Card,
                tips: 0.0,
            },
        ];

        let ledger = SessionLedger::restore(snapshot);

        assert_eq!(ledger.running_total(), 17.0);
        assert!(!ledger.is_open(), "restored sessions start closed");
        assert_eq!(ledger.transactions().len(), 2);
    }

    // ------------------------------------------------------------------
    // Wire shape
    // ------------------------------------------------------------------

    #[test]
    fn test_transaction_json_shape() {
        let tx = Transaction {
            date: "6/1/2024, 10:30:00 AM".to_string(),
            amount: 10.0,
            method: PaymentMethod::Cash,
            tips: 2.0,
        };

        let value = serde_json::to_value(&tx).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "date": "6/1/2024, 10:30:00 AM",
                "amount": 10.0,
                "type": "Cash",
                "tips": 2.0
            })
        );
    }

    #[test]
    fn test_payment_method_wire_strings() {
        let json = r#"[
            {"date": "6/1/2024, 10:30:00 AM", "amount": 1.0, "type": "Cash", "tips": 0.0},
            {"date": "6/1/2024, 10:31:00 AM", "amount": 2.0, "type": "Card", "tips": 0.0},
            {"date": "6/1/2024, 10:32:00 AM", "amount": 3.0, "type": "", "tips": 0.0}
        ]"#;

        let txs: Vec<Transaction> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(txs[0].method, PaymentMethod::Cash);
        assert_eq!(txs[1].method, PaymentMethod::Card);
        assert_eq!(txs[2].method, PaymentMethod::Unset);
    }

    #[test]
    fn test_unknown_method_string_is_an_error() {
        let json = r#"{"date": "d", "amount": 1.0, "type": "Voucher", "tips": 0.0}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }
}
