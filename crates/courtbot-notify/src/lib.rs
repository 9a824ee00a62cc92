//! SMS message catalog and alert-forwarding logging for courtbot.
//!
//! `courtbot-notify` is the output layer of a court-reminder SMS bot. It
//! does not look up cases or manage subscriptions; the caller hands it
//! records and it turns them into text, sends that text, and makes sure
//! errors reach an operator.
//!
//! # Getting started
//!
//! ```ignore
//! use std::time::Duration;
//! use courtbot_notify::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), NotifyError> {
//!     let config = NotifyConfig::from_env()?;
//!
//!     // Console logging, plus Rollbar for error-level entries.
//!     let alerts = logging::init(&config.alert)?;
//!
//!     let catalog = MessageCatalog::new(config.court.clone());
//!     let body = catalog.status(&[Subscription::active("A1"), Subscription::active("B2")]);
//!
//!     let client = TwilioClient::from_config(&config.twilio)?;
//!     if let Err(e) = client.send("+15005550006", "+15005550001", &body).await {
//!         tracing::error!("status message not sent: {e}");
//!     }
//!
//!     // Deliver queued alerts before the process exits.
//!     if let Some(guard) = alerts {
//!         guard.flush(Duration::from_secs(5)).await;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`messages`] | [`MessageCatalog`](messages::MessageCatalog) templates, records, text helpers |
//! | [`sms`] | [`TwilioClient`](sms::TwilioClient) for outbound messages |
//! | [`alert`] | [`AlertLayer`](alert::AlertLayer), [`AlertWorker`](alert::AlertWorker), [`AlertGuard`](alert::AlertGuard), Rollbar sink |
//! | [`logging`] | Console format and global subscriber setup |
//! | [`config`] | [`NotifyConfig`](config::NotifyConfig) from environment variables |

pub mod alert;
pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod prelude;
pub mod sms;

pub use config::NotifyConfig;
pub use error::NotifyError;
