//! Preview or send courtbot SMS messages.
//!
//! Reads court details and credentials from the environment (see
//! [`NotifyConfig`]). A `.env` file in the working directory is honoured.
//!
//! # Examples
//!
//! ```sh
//! # Print a reminder body
//! courtbot-notify preview reminder --date 2026-10-20T09:00:00-08:00 --room "Courtroom 4"
//!
//! # Tell a citizen which cases they follow
//! courtbot-notify preview status --subscribed A1 --subscribed B2
//!
//! # Send a rendered message
//! courtbot-notify send --to +15005550006 found-it-will-remind --salutation \
//!   --defendant "JOHN SMITH" --date 2026-10-20T09:00:00-08:00 --room "Courtroom 4"
//!
//! # Send free text from the default TWILIO_PHONE_NUMBER
//! courtbot-notify send --to +15005550006 --body "Court is closed today."
//! ```

use std::process;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand};
use courtbot_notify::logging;
use courtbot_notify::messages::{
    CaseMatch, Hearing, MessageCatalog, MessageInput, MessageKind, Subscription,
};
use courtbot_notify::sms::TwilioClient;
use courtbot_notify::{NotifyConfig, NotifyError};
use tracing::{error, info};

/// How long to wait for queued alerts on the way out.
const ALERT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Preview or send courtbot SMS messages.
#[derive(Parser)]
#[command(name = "courtbot-notify")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a rendered message
    Preview {
        /// Message kind, e.g. `reminder` or `status`
        kind: MessageKind,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Send a message over SMS
    Send {
        /// Destination number
        #[arg(long)]
        to: String,

        /// Sender number (default: TWILIO_PHONE_NUMBER)
        #[arg(long)]
        from: Option<String>,

        /// Literal body to send instead of a rendered message
        #[arg(long, conflicts_with = "kind", required_unless_present = "kind")]
        body: Option<String>,

        /// Message kind to render and send
        kind: Option<MessageKind>,

        #[command(flatten)]
        input: InputArgs,
    },
    /// List the message kinds
    Kinds,
}

/// Values interpolated into rendered messages.
#[derive(Args)]
struct InputArgs {
    /// Defendant name as stored by the court
    #[arg(long)]
    defendant: Option<String>,

    /// Hearing date and time (RFC 3339, with the court's offset)
    #[arg(long, value_parser = parse_date)]
    date: Option<DateTime<FixedOffset>>,

    /// Courtroom
    #[arg(long)]
    room: Option<String>,

    /// Case or citation id
    #[arg(long)]
    case_id: Option<String>,

    /// The hearing is today
    #[arg(long)]
    today: bool,

    /// The case has past hearings
    #[arg(long)]
    has_past: bool,

    /// Greet with the court name
    #[arg(long)]
    salutation: bool,

    /// Followed case id (repeatable)
    #[arg(long = "subscribed")]
    subscribed: Vec<String>,
}

impl InputArgs {
    fn into_input(self) -> MessageInput {
        let hearing = match (self.date, &self.room) {
            (Some(date), Some(room)) => Some(Hearing {
                date,
                room: room.clone(),
            }),
            _ => None,
        };
        let case_match = match (self.defendant, hearing.clone()) {
            (Some(defendant), Some(h)) => Some(CaseMatch {
                defendant,
                date: h.date,
                room: h.room,
                today: self.today,
                has_past: self.has_past,
            }),
            _ => None,
        };
        MessageInput {
            case_match,
            hearing,
            case_id: self.case_id,
            subscriptions: self
                .subscribed
                .into_iter()
                .map(Subscription::active)
                .collect(),
            include_salutation: self.salutation,
        }
    }
}

fn parse_date(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s).map_err(|e| format!("expected RFC 3339 date/time: {e}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Command::Kinds = cli.command {
        for kind in MessageKind::ALL {
            println!("{kind}");
        }
        return;
    }

    let config = match NotifyConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let alerts = match logging::init(&config.alert) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to set up logging: {e}");
            process::exit(1);
        }
    };

    let result = run(cli.command, &config).await;
    if let Err(e) = &result {
        error!("{e}");
    }

    if let Some(guard) = alerts
        && guard.flush(ALERT_FLUSH_TIMEOUT).await.is_none()
    {
        eprintln!("Warning: gave up waiting for alert delivery");
    }

    if result.is_err() {
        process::exit(1);
    }
}

async fn run(command: Command, config: &NotifyConfig) -> Result<(), NotifyError> {
    let catalog = MessageCatalog::new(config.court.clone());
    match command {
        Command::Preview { kind, input } => {
            println!("{}", catalog.render(kind, &input.into_input())?);
        }
        Command::Send {
            to,
            from,
            body,
            kind,
            input,
        } => {
            let body = match (body, kind) {
                (Some(body), _) => body,
                (None, Some(kind)) => catalog.render(kind, &input.into_input())?,
                (None, None) => {
                    return Err(NotifyError::MissingInput {
                        kind: "send",
                        field: "--body or a message kind",
                    });
                }
            };
            let from = from
                .or_else(|| config.twilio.phone_number.clone())
                .ok_or(NotifyError::MissingEnv("TWILIO_PHONE_NUMBER"))?;

            let sent = TwilioClient::from_config(&config.twilio)?
                .send(&to, &from, &body)
                .await?;
            info!(
                "Sent {} to {} ({})",
                sent.sid,
                to,
                sent.status.as_deref().unwrap_or("unknown")
            );
        }
        Command::Kinds => {}
    }
    Ok(())
}
