//! Report delivery to the transactional-email endpoint.
//!
//! Flattens a report into the fixed five-field payload the mail template
//! expects and POSTs it to an EmailJS-style REST endpoint using the three
//! configured credentials. Delivery sits behind the [`ReportDelivery`]
//! trait so the session can be tested against a fake without a network.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::info;

use crate::config::MailerConfig;
use crate::error::DeliveryError;
use crate::report::Report;

/// Default timeout for delivery requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the send endpoint under the configured API base.
const SEND_PATH: &str = "/api/v1.0/email/send";

// ---------------------------------------------------------------------------
// Mail payload
// ---------------------------------------------------------------------------

/// The fixed field set a report is flattened into for the mail template.
/// Every currency value is prefix-rendered (`"€17.00"`); `date` carries the
/// period label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMail {
    pub date: String,
    pub total_received: String,
    pub tips: String,
    pub total_cash: String,
    pub total_card: String,
}

/// Render `report` into template fields, prefixing each currency value.
pub fn build_report_mail(report: &Report, currency_prefix: &str) -> ReportMail {
    ReportMail {
        date: report.period_label.clone(),
        total_received: format_currency(currency_prefix, report.total_received),
        tips: format_currency(currency_prefix, report.tips_value),
        total_cash: format_currency(currency_prefix, report.total_cash),
        total_card: format_currency(currency_prefix, report.total_card),
    }
}

/// A currency value as the mail template shows it: prefix, two decimals.
pub fn format_currency(prefix: &str, value: f64) -> String {
    format!("{prefix}{value:.2}")
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Acknowledgement from a successful delivery.
#[derive(Debug, Clone)]
pub struct DeliveryAck {
    pub status: u16,
    pub body: String,
}

/// Submits one report mail to the delivery endpoint.
pub trait ReportDelivery: Send + Sync {
    fn deliver(
        &self,
        mail: &ReportMail,
    ) -> impl Future<Output = Result<DeliveryAck, DeliveryError>> + Send;
}

impl<R: ReportDelivery + ?Sized> ReportDelivery for Arc<R> {
    fn deliver(
        &self,
        mail: &ReportMail,
    ) -> impl Future<Output = Result<DeliveryAck, DeliveryError>> + Send {
        (**self).deliver(mail)
    }
}

/// Wire body of the send request.
#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a ReportMail,
}

/// Production delivery client.
pub struct EmailJsMailer {
    client: Client,
    config: MailerConfig,
}

impl EmailJsMailer {
    /// Build a mailer over `config`. Credentials are checked per send, not
    /// here, so an unconfigured shell can still construct the session.
    pub fn new(config: MailerConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| DeliveryError::Network(format!("HTTP client build failed: {e}")))?;
        Ok(Self { client, config })
    }
}

impl ReportDelivery for EmailJsMailer {
    fn deliver(
        &self,
        mail: &ReportMail,
    ) -> impl Future<Output = Result<DeliveryAck, DeliveryError>> + Send {
        async move {
            if !self.config.is_configured() {
                return Err(DeliveryError::NotConfigured);
            }

            let url = format!("{}{SEND_PATH}", self.config.api_base.trim_end_matches('/'));
            let body = SendRequest {
                service_id: &self.config.service_id,
                template_id: &self.config.template_id,
                user_id: &self.config.public_key,
                template_params: mail,
            };

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| DeliveryError::Network(friendly_error(&url, &e)))?;

            let status = resp.status();
            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                let mut detail = status_error(status);
                let excerpt = text.trim();
                if !excerpt.is_empty() {
                    detail = format!("{detail}: {excerpt}");
                }
                return Err(DeliveryError::Rejected {
                    status: status.as_u16(),
                    detail,
                });
            }

            let text = resp.text().await.unwrap_or_default();
            info!(status = status.as_u16(), "Report delivered");
            Ok(DeliveryAck {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach the delivery service at {url}");
    }
    if err.is_timeout() {
        return format!("Delivery request to {url} timed out");
    }
    if err.is_builder() {
        return format!("Invalid delivery service URL: {url}");
    }
    format!("Network error communicating with {url}: {err}")
}

/// Human-readable reason for a non-success status. The status code itself
/// is carried by [`DeliveryError::Rejected`] and rendered once by its
/// `Display` impl, so the messages here stay code-free.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        400 => "Delivery service rejected the report payload".to_string(),
        401 | 403 => "Delivery credentials rejected".to_string(),
        404 => "Delivery endpoint not found".to_string(),
        s if s >= 500 => "Delivery service error".to_string(),
        _ => "Unexpected response from delivery service".to_string(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
