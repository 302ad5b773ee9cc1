//! The sales session controller.
//!
//! Wires the ledger, the persistence gateway, the clock, and report
//! delivery into the single surface a UI shell drives: open a session,
//! stage the pending entry, record payments, view reports and history,
//! send the daily report, close the session. Enforces the
//! Closed -> Open -> Closed lifecycle and rewrites the full persisted
//! transaction list after every mutation.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::config::{AppConfig, DEFAULT_CURRENCY_PREFIX};
use crate::db;
use crate::error::{InitError, SendError, SessionError};
use crate::ledger::{PaymentMethod, SessionLedger, Transaction};
use crate::mailer::{self, DeliveryAck, EmailJsMailer, ReportDelivery, ReportMail};
use crate::report::{self, Report};
use crate::storage::{LedgerGateway, SqliteSlotStore};

/// Timestamp stamped on recorded transactions: `6/1/2024, 10:30:00 AM`.
pub const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Date and time halves of the daily-report label.
const DATE_FORMAT: &str = "%-m/%-d/%Y";
const TIME_FORMAT: &str = "%-I:%M:%S %p";

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the current local time, injected so timestamp-dependent tests
/// are deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

// ---------------------------------------------------------------------------
// Pending entry
// ---------------------------------------------------------------------------

/// The uncommitted input fields the UI binds to before a record: amount,
/// tips, and the chosen payment method (mutually exclusive buttons).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingEntry {
    pub amount: f64,
    pub tips: f64,
    pub method: PaymentMethod,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One sales session and its collaborators.
///
/// Construction restores any persisted transactions from the slot; the
/// restored session starts closed and its running total is recomputed from
/// the restored list.
pub struct SalesSession<D> {
    ledger: SessionLedger,
    gateway: LedgerGateway,
    delivery: Arc<D>,
    clock: Arc<dyn Clock>,
    currency_prefix: String,
    pending: PendingEntry,
}

impl SalesSession<EmailJsMailer> {
    /// Assemble the production session from `config`: SQLite slot store,
    /// EmailJS delivery, wall clock.
    pub fn from_config(config: &AppConfig) -> Result<Self, InitError> {
        let db = db::init(&config.data_dir)?;
        let gateway = LedgerGateway::new(SqliteSlotStore::new(Arc::new(db)));
        let mailer = EmailJsMailer::new(config.mailer.clone())?;
        Ok(Self::new(gateway, mailer).with_currency_prefix(config.currency_prefix.clone()))
    }
}

impl<D: ReportDelivery + 'static> SalesSession<D> {
    /// Build a session over its collaborators with the wall clock.
    pub fn new(gateway: LedgerGateway, delivery: D) -> Self {
        Self::with_clock(gateway, delivery, SystemClock)
    }

    /// Build a session with an injected clock.
    pub fn with_clock(gateway: LedgerGateway, delivery: D, clock: impl Clock + 'static) -> Self {
        let restored = gateway.load();
        if !restored.is_empty() {
            info!(
                count = restored.len(),
                "Restored transactions from a previous session"
            );
        }
        Self {
            ledger: SessionLedger::restore(restored),
            gateway,
            delivery: Arc::new(delivery),
            clock: Arc::new(clock),
            currency_prefix: DEFAULT_CURRENCY_PREFIX.to_string(),
            pending: PendingEntry::default(),
        }
    }

    /// Override the currency prefix used in outbound reports.
    pub fn with_currency_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.currency_prefix = prefix.into();
        self
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Open the session. Transactions restored from an improperly-closed
    /// session are kept; the slot was never cleared for them.
    pub fn start_session(&mut self) {
        if !self.ledger.is_open() {
            self.ledger.open();
            info!(
                restored = self.ledger.transactions().len(),
                "Sales session opened"
            );
        }
    }

    /// Close the session: wipe the ledger, reset the pending entry, and
    /// remove the persisted slot. Confirmation prompts live in the UI.
    pub fn close_session(&mut self) {
        let count = self.ledger.transactions().len();
        let total = self.ledger.running_total();
        self.ledger.clear();
        self.pending = PendingEntry::default();
        if let Err(e) = self.gateway.clear() {
            warn!("Ledger slot clear failed: {e}");
        }
        info!(
            transactions = count,
            total = total,
            "Sales session closed"
        );
    }

    // ------------------------------------------------------------------
    // Pending entry
    // ------------------------------------------------------------------

    pub fn set_amount(&mut self, amount: f64) {
        self.pending.amount = amount;
    }

    pub fn set_tips(&mut self, tips: f64) {
        self.pending.tips = tips;
    }

    /// Choose the payment method for the pending entry.
    pub fn set_method(&mut self, method: PaymentMethod) {
        self.pending.method = method;
    }

    pub fn pending(&self) -> PendingEntry {
        self.pending
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Record the pending entry as a transaction.
    ///
    /// On success the pending fields reset and the full transaction list is
    /// rewritten to storage before returning; a storage failure there is
    /// logged and does not undo the record. On rejection the pending fields
    /// stay untouched so the user can correct them.
    pub fn record_payment(&mut self) -> Result<Transaction, SessionError> {
        let stamp = self.clock.now().format(TIMESTAMP_FORMAT).to_string();
        let entry = self.pending;
        let tx = self
            .ledger
            .record(entry.amount, entry.tips, entry.method, stamp)?;
        self.pending = PendingEntry::default();

        info!(
            amount = tx.amount,
            tips = tx.tips,
            method = %tx.method,
            running_total = self.ledger.running_total(),
            "Payment recorded"
        );

        if let Err(e) = self.gateway.save(self.ledger.transactions()) {
            warn!("Ledger save failed, transaction kept in memory only: {e}");
        }

        Ok(tx)
    }

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    /// The whole-session report, labelled with the clock's current
    /// date and time (`"6/1/2024 & 10:30:00 AM"`).
    pub fn daily_report(&self) -> Report {
        report::summarize(&self.report_label(), self.ledger.transactions())
    }

    /// Distinct date labels present in the session history.
    pub fn history_dates(&self) -> Vec<String> {
        report::distinct_date_labels(self.ledger.transactions())
    }

    /// Transactions recorded under `date_label` (substring match).
    pub fn transactions_for_date(&self, date_label: &str) -> Vec<Transaction> {
        report::filter_by_date_label(self.ledger.transactions(), date_label)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Report over one picked history date.
    pub fn report_for_date(&self, date_label: &str) -> Report {
        let transactions = self.transactions_for_date(date_label);
        report::summarize(date_label, &transactions)
    }

    fn report_label(&self) -> String {
        let now = self.clock.now();
        format!("{} & {}", now.format(DATE_FORMAT), now.format(TIME_FORMAT))
    }

    // ------------------------------------------------------------------
    // Daily report delivery
    // ------------------------------------------------------------------

    /// Build the daily report mail and await its delivery.
    ///
    /// The explicit `Result` surface; [`spawn_daily_report`](Self::spawn_daily_report)
    /// wraps it for fire-and-forget use.
    pub async fn send_daily_report(&self) -> Result<DeliveryAck, SendError> {
        let mail = self.build_daily_mail()?;
        let ack = self.delivery.deliver(&mail).await?;
        Ok(ack)
    }

    /// Send the daily report without blocking the caller.
    ///
    /// Must be called from within a tokio runtime; the delivery runs on a
    /// spawned task and `tokio::spawn` panics without one. The mail is
    /// snapshotted synchronously, so payments recorded after this call
    /// never leak into the in-flight report. The delivery outcome is only
    /// logged; closing the session while the send is in flight does not
    /// affect it. The returned handle may be dropped to detach.
    pub fn spawn_daily_report(&self) -> Result<tokio::task::JoinHandle<()>, SessionError> {
        let mail = self.build_daily_mail()?;
        let delivery = self.delivery.clone();
        let handle = tokio::spawn(async move {
            match delivery.deliver(&mail).await {
                Ok(ack) => info!(status = ack.status, "Daily report sent"),
                Err(e) => warn!("Daily report delivery failed: {e}"),
            }
        });
        Ok(handle)
    }

    fn build_daily_mail(&self) -> Result<ReportMail, SessionError> {
        if !self.ledger.is_open() {
            return Err(SessionError::SessionClosed);
        }
        let report = self.daily_report();
        Ok(mailer::build_report_mail(&report, &self.currency_prefix))
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.ledger.is_open()
    }

    pub fn running_total(&self) -> f64 {
        self.ledger.running_total()
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
