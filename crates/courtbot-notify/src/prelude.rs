//! Convenience re-exports for common `courtbot-notify` types.
//!
//! ```ignore
//! use courtbot_notify::prelude::*;
//! ```

pub use crate::alert::{
    AlertEvent, AlertGuard, AlertLayer, AlertSink, AlertStats, AlertWorker, RollbarReporter,
    alert_layer,
};
pub use crate::config::{AlertConfig, CourtInfo, NotifyConfig, TwilioConfig};
pub use crate::error::NotifyError;
pub use crate::logging;
pub use crate::messages::{
    CaseMatch, Hearing, MessageCatalog, MessageInput, MessageKind, Subscription, cleanup_name,
    normalize_spaces,
};
pub use crate::sms::{SentMessage, TwilioClient};
