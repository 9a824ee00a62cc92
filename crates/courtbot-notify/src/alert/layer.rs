use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{Level, Subscriber, warn};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::{ALERT_TARGET, AlertEvent, AlertSink};

/// Build an [`AlertLayer`] and the [`AlertWorker`] that delivers what it
/// captures to `sink`.
///
/// Install the layer in the subscriber and start the worker with
/// [`AlertWorker::spawn`], or await [`AlertWorker::run`] once every clone of
/// the layer is gone.
pub fn alert_layer(sink: Arc<dyn AlertSink>) -> (AlertLayer, AlertWorker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        AlertLayer { tx },
        AlertWorker {
            rx,
            sink,
            shutdown: None,
        },
    )
}

/// A [`tracing_subscriber::Layer`] that forwards ERROR events to an
/// [`AlertWorker`].
#[derive(Clone)]
pub struct AlertLayer {
    tx: mpsc::UnboundedSender<AlertEvent>,
}

impl<S: Subscriber + for<'a> LookupSpan<'a>> Layer<S> for AlertLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() != Level::ERROR || meta.target().starts_with(ALERT_TARGET) {
            return;
        }

        let mut visitor = AlertVisitor::default();
        event.record(&mut visitor);

        // A closed channel means the worker is gone; the console layer
        // still has the entry.
        let _ = self.tx.send(AlertEvent {
            timestamp: Utc::now(),
            level: meta.level().to_string(),
            target: meta.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Delivery counts returned when an [`AlertWorker`] finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertStats {
    pub reported: usize,
    pub failed: usize,
}

/// Drains captured events into an [`AlertSink`], one report per event.
pub struct AlertWorker {
    rx: mpsc::UnboundedReceiver<AlertEvent>,
    sink: Arc<dyn AlertSink>,
    shutdown: Option<oneshot::Receiver<()>>,
}

enum Next {
    Event(Option<AlertEvent>),
    Shutdown,
}

impl AlertWorker {
    /// Deliver events until every [`AlertLayer`] handle has been dropped,
    /// or until the [`AlertGuard`] from [`spawn`](Self::spawn) asks it to stop.
    ///
    /// Sink failures are logged at WARN and counted; they never end the loop.
    pub async fn run(mut self) -> AlertStats {
        let mut stats = AlertStats::default();
        loop {
            let next = match self.shutdown.as_mut() {
                Some(signal) => tokio::select! {
                    event = self.rx.recv() => Next::Event(event),
                    _ = signal => Next::Shutdown,
                },
                None => Next::Event(self.rx.recv().await),
            };
            match next {
                // Stop accepting new events; what is queued still drains.
                Next::Shutdown => {
                    self.shutdown = None;
                    self.rx.close();
                }
                Next::Event(Some(event)) => self.deliver(&event, &mut stats).await,
                Next::Event(None) => break,
            }
        }
        stats
    }

    async fn deliver(&self, event: &AlertEvent, stats: &mut AlertStats) {
        match self.sink.report(event).await {
            Ok(()) => stats.reported += 1,
            Err(e) => {
                stats.failed += 1;
                warn!(target: ALERT_TARGET, "error reporting to alert service: {e}");
            }
        }
    }

    /// Run on the current Tokio runtime.
    ///
    /// Must be called from within a runtime. Dropping the returned guard
    /// also stops the worker once the queue is drained.
    pub fn spawn(mut self) -> AlertGuard {
        let (tx, rx) = oneshot::channel();
        self.shutdown = Some(rx);
        AlertGuard {
            shutdown: tx,
            task: tokio::spawn(self.run()),
        }
    }
}

/// Handle to a spawned [`AlertWorker`].
pub struct AlertGuard {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<AlertStats>,
}

impl AlertGuard {
    /// Stop forwarding, deliver what is already queued, and return the totals.
    ///
    /// `None` when delivery did not finish within `timeout`.
    pub async fn flush(self, timeout: Duration) -> Option<AlertStats> {
        let _ = self.shutdown.send(());
        tokio::time::timeout(timeout, self.task).await.ok()?.ok()
    }
}

/// Pulls the message and extra fields out of a tracing event.
#[derive(Default)]
struct AlertVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for AlertVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertFuture;
    use crate::error::NotifyError;
    use std::sync::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<AlertEvent>>,
    }

    impl AlertSink for Recorder {
        fn report<'a>(&'a self, event: &'a AlertEvent) -> AlertFuture<'a> {
            self.events.lock().unwrap().push(event.clone());
            Box::pin(async { Ok(()) })
        }
    }

    struct Failing;

    impl AlertSink for Failing {
        fn report<'a>(&'a self, _event: &'a AlertEvent) -> AlertFuture<'a> {
            Box::pin(async {
                Err(NotifyError::Api {
                    service: "rollbar",
                    status: 503,
                    message: "unavailable".into(),
                })
            })
        }
    }

    #[tokio::test]
    async fn forwards_only_error_events() {
        let recorder = Arc::new(Recorder::default());
        let (layer, worker) = alert_layer(recorder.clone());
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("looking up case");
            tracing::info!("case found");
            tracing::warn!("slow lookup");
            tracing::error!(case_id = "A1", "lookup failed");
        });

        let stats = worker.run().await;
        assert_eq!(stats, AlertStats { reported: 1, failed: 0 });

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, "ERROR");
        assert_eq!(events[0].message, "lookup failed");
        assert_eq!(events[0].fields, vec![("case_id".to_string(), "A1".to_string())]);
    }

    #[tokio::test]
    async fn ignores_errors_from_its_own_target() {
        let recorder = Arc::new(Recorder::default());
        let (layer, worker) = alert_layer(recorder.clone());
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "courtbot_notify::alert::rollbar", "loop");
        });

        assert_eq!(worker.run().await, AlertStats::default());
        assert!(recorder.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn sink_failures_are_counted_not_propagated() {
        let (layer, worker) = alert_layer(Arc::new(Failing));
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("first");
            tracing::error!("second");
        });

        assert_eq!(worker.run().await, AlertStats { reported: 0, failed: 2 });
    }

    #[tokio::test]
    async fn flush_finishes_while_the_layer_is_still_installed() {
        let recorder = Arc::new(Recorder::default());
        let (layer, worker) = alert_layer(recorder.clone());
        let guard = worker.spawn();

        let dispatch = tracing::Dispatch::new(tracing_subscriber::registry().with(layer));
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::error!("queued before flush");
        });

        let stats = guard.flush(Duration::from_secs(5)).await;
        assert_eq!(stats, Some(AlertStats { reported: 1, failed: 0 }));
        assert_eq!(recorder.events.lock().unwrap().len(), 1);

        // Events after the flush are dropped rather than queued forever.
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::error!("after flush");
        });
        assert_eq!(recorder.events.lock().unwrap().len(), 1);
    }
}
