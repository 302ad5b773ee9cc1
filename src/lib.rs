//! Golden Crown Sales - daily sales ledger and reporting core.
//!
//! This crate implements the business core behind a single-screen sales
//! recorder: an in-memory session ledger with SQLite persistence, daily
//! report aggregation, and report delivery through a transactional-email
//! endpoint. Embedders construct a [`SalesSession`] (usually via
//! [`SalesSession::from_config`]) and drive it from their UI layer.
//!
//! ```no_run
//! use golden_crown_sales::{AppConfig, PaymentMethod, SalesSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::new("/var/lib/golden-crown");
//! golden_crown_sales::diagnostics::init_logging(&config.data_dir);
//!
//! let mut session = SalesSession::from_config(&config)?;
//! session.start_session();
//! session.set_amount(10.0);
//! session.set_tips(2.0);
//! session.set_method(PaymentMethod::Cash);
//! session.record_payment()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod ledger;
pub mod mailer;
pub mod report;
pub mod session;
pub mod storage;

pub use config::{AppConfig, MailerConfig};
pub use error::{DeliveryError, InitError, SendError, SessionError, StorageError};
pub use ledger::{PaymentMethod, Transaction};
pub use mailer::{build_report_mail, DeliveryAck, EmailJsMailer, ReportDelivery, ReportMail};
pub use report::{date_label, distinct_date_labels, filter_by_date_label, summarize, Report};
pub use session::{Clock, PendingEntry, SalesSession, SystemClock};
pub use storage::{LedgerGateway, MemorySlotStore, SlotStore, SqliteSlotStore, LEDGER_SLOT_KEY};
