//! Console logging plus alert forwarding.
//!
//! [`init`] installs a global subscriber with two outputs: every entry is
//! written to stdout as `level: timestamp message`, and ERROR entries are
//! additionally handed to the [`AlertLayer`](crate::alert::AlertLayer)
//! when Rollbar is configured. The global subscriber is never dropped, so
//! call [`AlertGuard::flush`] before exit to deliver what is still queued.

use std::fmt;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::{Event, Level, Subscriber, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt as fmt_layer;
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use crate::alert::{AlertGuard, AlertWorker, RollbarReporter, alert_layer};
use crate::config::AlertConfig;
use crate::error::NotifyError;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "courtbot_notify=debug,info";

/// Formats each event as one `level: timestamp message` line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleFormat;

impl ConsoleFormat {
    fn level_label(level: &Level, ansi: bool) -> String {
        let name = level.as_str().to_lowercase();
        if !ansi {
            return name;
        }
        let color = match *level {
            Level::ERROR => "31",
            Level::WARN => "33",
            Level::INFO => "32",
            Level::DEBUG => "34",
            Level::TRACE => "35",
        };
        format!("\x1b[{color}m{name}\x1b[39m")
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = Self::level_label(event.metadata().level(), writer.has_ansi_escapes());
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        write!(writer, "{level}: {timestamp} ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// A fmt layer writing [`ConsoleFormat`] lines to `make_writer`.
pub fn console_layer<S, W>(make_writer: W) -> fmt_layer::Layer<S, DefaultFields, ConsoleFormat, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(make_writer)
}

/// Build the subscriber without installing it.
///
/// The returned worker finishes once the subscriber is dropped, or when
/// the guard from [`AlertWorker::spawn`] is flushed.
pub fn subscriber(
    config: &AlertConfig,
) -> Result<(impl Subscriber + Send + Sync + use<>, Option<AlertWorker>), NotifyError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (alerts, worker) = match RollbarReporter::from_config(config)? {
        Some(reporter) => {
            let (layer, worker) = alert_layer(Arc::new(reporter));
            (Some(layer), Some(worker))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer(std::io::stdout))
        .with(alerts);
    Ok((subscriber, worker))
}

/// Install the global subscriber and start alert delivery.
///
/// Must be called from within a Tokio runtime when Rollbar forwarding is
/// enabled. Returns the guard for the delivery task, if there is one.
pub fn init(config: &AlertConfig) -> Result<Option<AlertGuard>, NotifyError> {
    let (subscriber, worker) = subscriber(config)?;
    if worker.is_some() && tokio::runtime::Handle::try_current().is_err() {
        return Err(NotifyError::NoRuntime);
    }
    subscriber.init();

    let guard = worker.map(AlertWorker::spawn);
    if guard.is_some() {
        info!(environment = %config.environment, "Forwarding error logs to Rollbar");
    } else {
        info!("ROLLBAR_ACCESS_TOKEN not set; error logs stay on the console");
    }
    Ok(guard)
}
