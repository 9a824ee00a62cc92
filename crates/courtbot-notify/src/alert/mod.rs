//! Forwarding of error-level log entries to an alerting service.
//!
//! ```text
//! tracing::error!(..) ──▶ AlertLayer ──channel──▶ AlertWorker ──▶ AlertSink (Rollbar)
//! ```
//!
//! The [`AlertLayer`] sits in the tracing subscriber next to the console
//! layer. It copies each ERROR event into an [`AlertEvent`] and hands it to
//! the [`AlertWorker`] without waiting, so a slow or unreachable alerting
//! service never blocks the code that logged. Delivery failures are written
//! back to the console and otherwise dropped.

mod layer;
pub mod rollbar;

pub use layer::{AlertGuard, AlertLayer, AlertStats, AlertWorker, alert_layer};
pub use rollbar::RollbarReporter;

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::NotifyError;

/// Tracing target used by the alert machinery itself. Events from this
/// target are never forwarded.
pub const ALERT_TARGET: &str = "courtbot_notify::alert";

/// Boxed future returned by [`AlertSink::report`].
pub type AlertFuture<'a> = Pin<Box<dyn Future<Output = Result<(), NotifyError>> + Send + 'a>>;

/// One error-level log entry bound for the alerting service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
    /// Structured fields recorded on the event, other than `message`.
    pub fields: Vec<(String, String)>,
}

impl AlertEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level: "ERROR".into(),
            target: String::new(),
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Message followed by `{k=v, ...}` when there are extra fields.
    pub fn summary(&self) -> String {
        if self.fields.is_empty() {
            return self.message.clone();
        }
        let extras: Vec<String> = self.fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
        if self.message.is_empty() {
            extras.join(" ")
        } else {
            format!("{} {{{}}}", self.message, extras.join(", "))
        }
    }
}

/// A destination for alert events.
///
/// Implementations perform one delivery attempt per call and report the
/// outcome; they do not retry.
pub trait AlertSink: Send + Sync {
    fn report<'a>(&'a self, event: &'a AlertEvent) -> AlertFuture<'a>;
}
