//! Error types for the sales core.
//!
//! Session-level input/state errors are surfaced to the user; storage
//! errors are swallowed on load and logged on save; delivery errors come
//! back from the awaited send surface and are only logged by the detached
//! one.

use thiserror::Error;

/// Errors surfaced to the caller from session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The record-payment input had no positive value, or carried a
    /// non-finite one. The pending inputs are left untouched and no
    /// transaction is created.
    #[error("Amount and tips must not both be zero or negative")]
    InvalidAmount,

    /// A record or send was attempted while no session is open.
    #[error("No open sales session")]
    SessionClosed,
}

/// Errors inside the persistence gateway.
///
/// Loads map these to "no prior session"; the session controller logs
/// save/clear failures and carries on.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("database lock poisoned")]
    LockPoisoned,

    /// Injected by the in-memory test store to exercise failure paths.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Why a daily report did not go out: the session refused to build it, or
/// the delivery itself failed.
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Why the production session could not be assembled from configuration.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Storage init failed: {0}")]
    Storage(#[from] StorageError),
    #[error("Mailer init failed: {0}")]
    Mailer(#[from] DeliveryError),
}

/// Errors from the report delivery endpoint.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// One or more of the three delivery credentials is empty.
    #[error("Mailer credentials are not configured")]
    NotConfigured,

    /// The request never produced an HTTP response (connect, timeout, TLS).
    #[error("{0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("{detail} (HTTP {status})")]
    Rejected { status: u16, detail: String },
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_messages() {
        assert_eq!(
            SessionError::InvalidAmount.to_string(),
            "Amount and tips must not both be zero or negative"
        );
        assert_eq!(SessionError::SessionClosed.to_string(), "No open sales session");
    }

    #[test]
    fn test_rejected_includes_status() {
        let err = DeliveryError::Rejected {
            status: 503,
            detail: "Delivery service error".to_string(),
        };
        assert_eq!(err.to_string(), "Delivery service error (HTTP 503)");
    }

    #[test]
    fn test_init_error_names_the_failing_stage() {
        let err = InitError::from(StorageError::from(std::io::Error::other("disk gone")));
        assert!(err.to_string().starts_with("Storage init failed:"));

        let err = InitError::from(DeliveryError::NotConfigured);
        assert_eq!(
            err.to_string(),
            "Mailer init failed: Mailer credentials are not configured"
        );
    }

    #[test]
    fn test_storage_error_wraps_serde() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json")
            .expect_err("parse should fail");
        let err = StorageError::from(bad);
        assert!(err.to_string().starts_with("serialization error:"));
    }
}
