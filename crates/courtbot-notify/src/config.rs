//! Environment-driven configuration.
//!
//! [`NotifyConfig`] gathers the court details interpolated into messages,
//! the Twilio credentials used to send them, and the Rollbar settings used
//! by the alert layer. Values come from the process environment, optionally
//! seeded from a `.env` file.

use crate::error::NotifyError;

/// Default number of days an unmatched case lookup stays queued.
pub const DEFAULT_QUEUE_TTL_DAYS: u32 = 10;

/// Default Rollbar environment name.
pub const DEFAULT_ALERT_ENVIRONMENT: &str = "development";

/// Court details that appear in message bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtInfo {
    /// Court name used in salutations and sign-offs (`COURT_NAME`).
    pub name: String,
    /// Public site for case lookups (`COURT_PUBLIC_URL`).
    pub public_url: String,
    /// How many days we keep looking for an unmatched case (`QUEUE_TTL_DAYS`).
    pub queue_ttl_days: u32,
}

/// Twilio account credentials.
#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Default sender number (`TWILIO_PHONE_NUMBER`).
    pub phone_number: Option<String>,
    /// API host override (`TWILIO_API_URL`).
    pub api_url: Option<String>,
}

/// Rollbar settings for error-level alert forwarding.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Project access token. Forwarding is disabled when `None`.
    pub access_token: Option<String>,
    pub environment: String,
    /// Item API override (`ROLLBAR_ENDPOINT`).
    pub endpoint: Option<String>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            environment: DEFAULT_ALERT_ENVIRONMENT.to_string(),
            endpoint: None,
        }
    }
}

/// Full configuration for the notifier.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub court: CourtInfo,
    pub twilio: TwilioConfig,
    pub alert: AlertConfig,
}

impl NotifyConfig {
    /// Load from the process environment after applying any `.env` file.
    pub fn from_env() -> Result<Self, NotifyError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NotifyError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(NotifyError::MissingEnv(key));

        let queue_ttl_days = match get("QUEUE_TTL_DAYS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| NotifyError::InvalidEnv {
                    var: "QUEUE_TTL_DAYS",
                    value: raw,
                })?,
            None => DEFAULT_QUEUE_TTL_DAYS,
        };

        Ok(Self {
            court: CourtInfo {
                name: required("COURT_NAME")?,
                public_url: required("COURT_PUBLIC_URL")?,
                queue_ttl_days,
            },
            twilio: TwilioConfig {
                account_sid: get("TWILIO_ACCOUNT_SID").unwrap_or_default(),
                auth_token: get("TWILIO_AUTH_TOKEN").unwrap_or_default(),
                phone_number: get("TWILIO_PHONE_NUMBER"),
                api_url: get("TWILIO_API_URL"),
            },
            alert: AlertConfig {
                access_token: get("ROLLBAR_ACCESS_TOKEN"),
                environment: get("ROLLBAR_ENVIRONMENT")
                    .unwrap_or_else(|| DEFAULT_ALERT_ENVIRONMENT.to_string()),
                endpoint: get("ROLLBAR_ENDPOINT"),
            },
        })
    }
}
