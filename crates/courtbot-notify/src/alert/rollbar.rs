//! [`AlertSink`] backed by the Rollbar item API.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use super::{ALERT_TARGET, AlertEvent, AlertFuture, AlertSink};
use crate::config::AlertConfig;
use crate::error::NotifyError;

pub const ROLLBAR_ITEM_URL: &str = "https://api.rollbar.com/api/1/item/";

/// Posts alert events to Rollbar as `error` items.
///
/// Only events routed through [`AlertLayer`](super::AlertLayer) are sent;
/// panics and other uncaught failures are not captured.
pub struct RollbarReporter {
    client: reqwest::Client,
    access_token: String,
    environment: String,
    endpoint: String,
}

impl RollbarReporter {
    pub fn new(
        access_token: impl Into<String>,
        environment: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("courtbot-notify/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            access_token: access_token.into(),
            environment: environment.into(),
            endpoint: ROLLBAR_ITEM_URL.to_string(),
        })
    }

    /// `None` when no access token is configured.
    pub fn from_config(config: &AlertConfig) -> Result<Option<Self>, NotifyError> {
        let Some(token) = &config.access_token else {
            return Ok(None);
        };
        let reporter = Self::new(token, &config.environment)?;
        Ok(Some(match &config.endpoint {
            Some(endpoint) => reporter.with_endpoint(endpoint),
            None => reporter,
        }))
    }

    /// Post items to a different URL (a local stand-in in tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The item payload for one event.
    pub fn payload(&self, event: &AlertEvent) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = event
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), json!(v)))
            .collect();
        json!({
            "data": {
                "environment": self.environment,
                "level": "error",
                "timestamp": event.timestamp.timestamp(),
                "language": "rust",
                "body": {
                    "message": {
                        "body": event.summary(),
                        "fields": fields,
                    }
                },
                "custom": {
                    "target": event.target,
                },
                "notifier": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }
            }
        })
    }

    async fn post(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-Rollbar-Access-Token", &self.access_token)
            .json(&self.payload(event))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v["message"].as_str().map(str::to_string))
                .unwrap_or(text);
            return Err(NotifyError::Api {
                service: "rollbar",
                status: status.as_u16(),
                message,
            });
        }

        debug!(target: ALERT_TARGET, "Reported to Rollbar: HTTP {}", status);
        Ok(())
    }
}

impl AlertSink for RollbarReporter {
    fn report<'a>(&'a self, event: &'a AlertEvent) -> AlertFuture<'a> {
        Box::pin(self.post(event))
    }
}
