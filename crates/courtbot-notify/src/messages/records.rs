//! Records handed in by the lookup layer.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A court case located for a citizen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseMatch {
    pub defendant: String,
    /// Hearing date and time, in the court's offset.
    pub date: DateTime<FixedOffset>,
    pub room: String,
    /// The hearing is today.
    #[serde(default)]
    pub today: bool,
    /// The case already has hearings in the past.
    #[serde(default)]
    pub has_past: bool,
}

/// A hearing we are about to send a reminder for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hearing {
    pub date: DateTime<FixedOffset>,
    pub room: String,
}

/// A citizen's request to follow a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub case_id: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Subscription {
    pub fn active(case_id: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            active: true,
        }
    }
}

fn default_active() -> bool {
    true
}
