//! Runtime configuration supplied by the embedding shell.
//!
//! The core has no CLI and reads no config file of its own: the shell hands
//! it an [`AppConfig`] value, typically deserialized from the JSON the shell
//! already manages. Field names are camelCase on the wire with snake_case
//! aliases accepted.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Base URL of the transactional-email delivery service.
pub const DEFAULT_API_BASE: &str = "https://api.emailjs.com";

/// Currency prefix used when rendering report values.
pub const DEFAULT_CURRENCY_PREFIX: &str = "\u{20ac}";

// ---------------------------------------------------------------------------
// Mailer credentials
// ---------------------------------------------------------------------------

/// The three opaque credentials identifying the delivery endpoint, plus the
/// endpoint base (overridable so tests can point at a local server).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailerConfig {
    #[serde(default, alias = "service_id")]
    pub service_id: String,
    #[serde(default, alias = "template_id")]
    pub template_id: String,
    #[serde(default, alias = "public_key")]
    pub public_key: String,
    #[serde(default = "default_api_base", alias = "api_base")]
    pub api_base: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            service_id: String::new(),
            template_id: String::new(),
            public_key: String::new(),
            api_base: default_api_base(),
        }
    }
}

impl MailerConfig {
    /// True when all three delivery credentials are present.
    pub fn is_configured(&self) -> bool {
        !self.service_id.trim().is_empty()
            && !self.template_id.trim().is_empty()
            && !self.public_key.trim().is_empty()
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

// ---------------------------------------------------------------------------
// App config
// ---------------------------------------------------------------------------

/// Top-level configuration for the sales core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Directory holding the database and log files.
    #[serde(alias = "data_dir")]
    pub data_dir: PathBuf,
    /// Prefix applied to currency values in outbound reports.
    #[serde(default = "default_currency_prefix", alias = "currency_prefix")]
    pub currency_prefix: String,
    #[serde(default)]
    pub mailer: MailerConfig,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            currency_prefix: default_currency_prefix(),
            mailer: MailerConfig::default(),
        }
    }
}

fn default_currency_prefix() -> String {
    DEFAULT_CURRENCY_PREFIX.to_string()
}

// ===========================================================================
// Tests
// ===========================================================================
