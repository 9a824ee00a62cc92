//! The fixed set of SMS templates.
//!
//! Each template is written over several indented lines and then passed
//! through [`normalize_spaces`], so the rendered body is a single-spaced
//! sentence run. None of the renderers can fail.

use std::fmt;
use std::str::FromStr;

use super::format::{cleanup_name, clock_time, long_date, normalize_spaces};
use super::records::{CaseMatch, Hearing, Subscription};
use crate::config::CourtInfo;
use crate::error::NotifyError;

/// Renders courtbot messages for one court.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    court: CourtInfo,
}

impl MessageCatalog {
    pub fn new(court: CourtInfo) -> Self {
        Self { court }
    }

    pub fn court(&self) -> &CourtInfo {
        &self.court
    }

    /// Point them at the public site.
    pub fn for_more_info(&self) -> String {
        normalize_spaces(&format!(
            "OK. You can always go to {}
    for more information about your case and contact information.",
            self.court.public_url
        ))
    }

    /// Report the case we found and ask whether they want a reminder.
    pub fn found_it_ask_for_reminder(&self, m: &CaseMatch) -> String {
        let future_hearing = if m.has_past || m.today {
            " a future hearing"
        } else {
            ""
        };
        normalize_spaces(&format!(
            "{}
        Would you like a courtesy reminder the day before{future_hearing}? (reply YES or NO)",
            case_info(m)
        ))
    }

    /// Report the case we found and confirm reminders are on.
    pub fn found_it_will_remind(&self, include_salutation: bool, m: &CaseMatch) -> String {
        let salutation = if include_salutation {
            format!("Hello from the {}. ", self.court.name)
        } else {
            String::new()
        };
        let future_hearing = if m.has_past || m.today {
            " future hearings"
        } else {
            ""
        };
        normalize_spaces(&format!(
            "{salutation}{}
        We will send you courtesy reminders the day before{future_hearing}.",
            case_info(m)
        ))
    }

    /// Greeting.
    pub fn i_am_court_bot(&self) -> String {
        "Hello, I am Courtbot. I have a heart of justice and a knowledge of court cases."
            .to_string()
    }

    pub fn invalid_case_number(&self) -> String {
        normalize_spaces(
            "Couldn't find your case. Case identifier should be 6 to 25
        numbers and/or letters in length.",
        )
    }

    /// Nothing matched; offer to keep checking for the queue TTL.
    pub fn not_found_ask_to_keep_looking(&self) -> String {
        normalize_spaces(&format!(
            "Could not find a case with that number. It can take
        several days for a case to appear in our system. Would you like us to keep
        checking for the next {} days and text you if
        we find it? (reply YES or NO)",
            self.court.queue_ttl_days
        ))
    }

    /// The day-before reminder body.
    pub fn reminder(&self, hearing: &Hearing) -> String {
        normalize_spaces(&format!(
            "Reminder: It appears you have a court hearing tomorrow at
        {} at {}.
        You should confirm your hearing date and time by going to
        {}.
        - {}",
            clock_time(&hearing.date),
            hearing.room,
            self.court.public_url,
            self.court.name
        ))
    }

    /// Sent when a queued lookup expires without a match.
    pub fn unable_to_find_citation_for_too_long(&self, request: &Subscription) -> String {
        normalize_spaces(&format!(
            "We haven't been able to find your court case {}.
        You can go to {} for more information.
        - {}",
            request.case_id, self.court.public_url, self.court.name
        ))
    }

    pub fn we_will_keep_looking(&self) -> String {
        normalize_spaces(&format!(
            "OK. We will keep checking for up to {} days.
        You can always go to {} for more information about
        your case and contact information.",
            self.court.queue_ttl_days, self.court.public_url
        ))
    }

    pub fn we_will_remind_you(&self) -> String {
        normalize_spaces(&format!(
            "Sounds good. We will attempt to text you a courtesy reminder
        the day before your hearing date. Note that court schedules frequently change.
        You should always confirm your hearing date and time by going
        to {}.",
            self.court.public_url
        ))
    }

    /// They are already following this case; tell them how to stop.
    ///
    /// The body is the same for every case.
    pub fn already_subscribed(&self, _case_id: &str) -> String {
        normalize_spaces(&format!(
            "You are currently scheduled to receive reminders for this case.
    We will attempt to text you a courtesy reminder the day before your hearing date. To stop receiving reminders for this case text 'DELETE'.
    You can go to {} for more information.",
            self.court.public_url
        ))
    }

    /// List the case ids they follow. Inactive subscriptions are skipped.
    pub fn status(&self, cases: &[Subscription]) -> String {
        let case_ids = cases
            .iter()
            .filter(|c| c.active)
            .map(|c| c.case_id.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        normalize_spaces(&format!(
            "You are currently subscribed to receive notifications for the following cases:
    {case_ids}"
        ))
    }

    pub fn we_will_stop_sending(&self, case_id: &str) -> String {
        normalize_spaces(&format!(
            "OK. We will stop sending reminders for case: {case_id}.
     If you want to resume reminders you can text this ID to us again.
    You can go to {} for more information.",
            self.court.public_url
        ))
    }

    pub fn you_are_not_following_anything(&self) -> String {
        normalize_spaces(&format!(
            "You are not currently subscribed for any reminders. If you want to be reminded
    about an upcoming hearing, send us the case/citation number. You can go to {} for more information.
    - {}",
            self.court.public_url, self.court.name
        ))
    }

    /// Render a message by kind, pulling the records it needs from `input`.
    pub fn render(&self, kind: MessageKind, input: &MessageInput) -> Result<String, NotifyError> {
        let case_match = || {
            input.case_match.as_ref().ok_or(NotifyError::MissingInput {
                kind: kind.as_str(),
                field: "a case match",
            })
        };
        let case_id = || {
            input.case_id.as_deref().ok_or(NotifyError::MissingInput {
                kind: kind.as_str(),
                field: "a case id",
            })
        };

        Ok(match kind {
            MessageKind::ForMoreInfo => self.for_more_info(),
            MessageKind::FoundItAskForReminder => self.found_it_ask_for_reminder(case_match()?),
            MessageKind::FoundItWillRemind => {
                self.found_it_will_remind(input.include_salutation, case_match()?)
            }
            MessageKind::IAmCourtBot => self.i_am_court_bot(),
            MessageKind::InvalidCaseNumber => self.invalid_case_number(),
            MessageKind::NotFoundAskToKeepLooking => self.not_found_ask_to_keep_looking(),
            MessageKind::Reminder => {
                let hearing = match (&input.hearing, &input.case_match) {
                    (Some(h), _) => h.clone(),
                    (None, Some(m)) => Hearing {
                        date: m.date,
                        room: m.room.clone(),
                    },
                    (None, None) => {
                        return Err(NotifyError::MissingInput {
                            kind: kind.as_str(),
                            field: "a hearing",
                        });
                    }
                };
                self.reminder(&hearing)
            }
            MessageKind::UnableToFindCitationForTooLong => {
                self.unable_to_find_citation_for_too_long(&Subscription::active(case_id()?))
            }
            MessageKind::WeWillKeepLooking => self.we_will_keep_looking(),
            MessageKind::WeWillRemindYou => self.we_will_remind_you(),
            MessageKind::AlreadySubscribed => {
                self.already_subscribed(input.case_id.as_deref().unwrap_or_default())
            }
            MessageKind::Status => self.status(&input.subscriptions),
            MessageKind::WeWillStopSending => self.we_will_stop_sending(case_id()?),
            MessageKind::YouAreNotFollowingAnything => self.you_are_not_following_anything(),
        })
    }
}

fn case_info(m: &CaseMatch) -> String {
    let when = if m.today {
        "today".to_string()
    } else {
        format!("on {}", long_date(&m.date))
    };
    format!(
        "We found a case for {} scheduled
        {when}
        at {}, at {}.",
        cleanup_name(&m.defendant),
        clock_time(&m.date),
        m.room
    )
}

// ── Message kinds ──────────────────────────────────────────────────

/// Every template in the catalog, keyed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    ForMoreInfo,
    FoundItAskForReminder,
    FoundItWillRemind,
    IAmCourtBot,
    InvalidCaseNumber,
    NotFoundAskToKeepLooking,
    Reminder,
    UnableToFindCitationForTooLong,
    WeWillKeepLooking,
    WeWillRemindYou,
    AlreadySubscribed,
    Status,
    WeWillStopSending,
    YouAreNotFollowingAnything,
}

impl MessageKind {
    pub const ALL: [MessageKind; 14] = [
        Self::ForMoreInfo,
        Self::FoundItAskForReminder,
        Self::FoundItWillRemind,
        Self::IAmCourtBot,
        Self::InvalidCaseNumber,
        Self::NotFoundAskToKeepLooking,
        Self::Reminder,
        Self::UnableToFindCitationForTooLong,
        Self::WeWillKeepLooking,
        Self::WeWillRemindYou,
        Self::AlreadySubscribed,
        Self::Status,
        Self::WeWillStopSending,
        Self::YouAreNotFollowingAnything,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForMoreInfo => "for-more-info",
            Self::FoundItAskForReminder => "found-it-ask-for-reminder",
            Self::FoundItWillRemind => "found-it-will-remind",
            Self::IAmCourtBot => "i-am-court-bot",
            Self::InvalidCaseNumber => "invalid-case-number",
            Self::NotFoundAskToKeepLooking => "not-found-ask-to-keep-looking",
            Self::Reminder => "reminder",
            Self::UnableToFindCitationForTooLong => "unable-to-find-citation-for-too-long",
            Self::WeWillKeepLooking => "we-will-keep-looking",
            Self::WeWillRemindYou => "we-will-remind-you",
            Self::AlreadySubscribed => "already-subscribed",
            Self::Status => "status",
            Self::WeWillStopSending => "we-will-stop-sending",
            Self::YouAreNotFollowingAnything => "you-are-not-following-anything",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| format!("unknown message kind: {s}"))
    }
}

/// Records a [`MessageKind`] may interpolate. Unused fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct MessageInput {
    pub case_match: Option<CaseMatch>,
    pub hearing: Option<Hearing>,
    pub case_id: Option<String>,
    pub subscriptions: Vec<Subscription>,
    pub include_salutation: bool,
}
