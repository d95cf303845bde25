use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::canvas::client::CanvasClient;
use crate::canvas::item::ResourceKind;
use crate::notifications::service::Notifier;
use crate::scheduler::detector::ChangeDetector;
use crate::scheduler::report::{CycleReport, KindReport};
use crate::store::seen::SeenStore;

#[derive(Clone)]
pub struct PollScheduler {
    client: CanvasClient,
    notifier: Notifier,
    detector: ChangeDetector,
    interval: Duration,
    channel_ready: Arc<AtomicBool>,
}

impl PollScheduler {
    pub fn new(
        client: CanvasClient,
        store: Arc<dyn SeenStore>,
        notifier: Notifier,
        interval: Duration,
    ) -> Self {
        let detector = ChangeDetector::new(store, notifier.clone());
        Self {
            client,
            notifier,
            detector,
            interval,
            channel_ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn channel_ready(&self) -> bool {
        self.channel_ready.load(Ordering::SeqCst)
    }

    /// Resolves the output channel once; later calls are free after a success.
    pub async fn ensure_channel(&self) -> bool {
        if self.channel_ready() {
            return true;
        }
        match self.notifier.resolve().await {
            Ok(()) => {
                tracing::info!(
                    event = "channel_resolved",
                    channel_id = %self.notifier.channel().channel_id(),
                    "output channel resolved"
                );
                self.channel_ready.store(true, Ordering::SeqCst);
                true
            }
            Err(err) => {
                tracing::error!(
                    event = "channel_unresolved",
                    channel_id = %self.notifier.channel().channel_id(),
                    error = %err,
                    "output channel unavailable"
                );
                false
            }
        }
    }

    /// Ticks forever until `shutdown` fires. A cycle that overruns the
    /// interval delays the next tick rather than overlapping it.
    pub async fn run_loop(&self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }
            tokio::select! {
                _ = shutdown.cancelled() => break,
                report = self.run_cycle() => log_cycle(&report),
            }
        }
        tracing::info!(event = "scheduler_stopped", "scheduler stopped");
    }

    pub async fn run_cycle(&self) -> CycleReport {
        if !self.ensure_channel().await {
            tracing::warn!(event = "cycle_skipped", "skipping cycle until the channel resolves");
            return CycleReport::skipped();
        }
        tracing::info!(event = "cycle_started", "checking Canvas for updates");
        let mut report = CycleReport::default();
        for kind in ResourceKind::ALL {
            report.kinds.push(self.run_kind(kind).await);
        }
        report
    }

    async fn run_kind(&self, kind: ResourceKind) -> KindReport {
        let items = match self.client.fetch(kind).await {
            Ok(items) => items,
            Err(err) => {
                tracing::error!(
                    event = "fetch_failed",
                    kind = %kind,
                    error = %err,
                    "abandoning this kind for the current cycle"
                );
                return KindReport::failed(kind, err.to_string());
            }
        };
        tracing::info!(event = "fetched", kind = %kind, count = items.len(), "fetched items");
        for item in &items {
            tracing::debug!(kind = %kind, item_id = item.id, title = %item.title, "fetched item");
        }
        self.detector.process(kind, &items).await
    }
}

fn log_cycle(report: &CycleReport) {
    if report.skipped {
        return;
    }
    for kind in &report.kinds {
        tracing::info!(
            event = "cycle_kind_summary",
            kind = %kind.kind,
            fetched = kind.fetched,
            already_seen = kind.already_seen,
            notified = kind.notified,
            store_failures = kind.store_failures,
            delivery_failures = kind.delivery_failures,
            fetch_failed = kind.fetch_error.is_some(),
            "cycle finished for kind"
        );
    }
}
