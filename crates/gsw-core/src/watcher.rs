//! Poll loop
//!
//! One cycle: observe, load the baseline, evaluate migration, diff, notify,
//! persist. Cycles never overlap and cancellation is only honoured between
//! them, so a snapshot is never left half-processed.

use crate::config::WatchConfig;
use crate::error::WatchError;
use gsw_model::{diff, migration, ChangeEvent, CycleMode, Guarded};
use gsw_notify::Notifier;
use gsw_observer::ResourceObserver;
use gsw_store::SnapshotStore;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Lifecycle of a [`Watcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the observer to become ready
    Starting,
    /// Cycling
    Running,
    /// Stopped by cancellation or a fatal error
    Terminated,
}

/// Whether a cycle reported or withheld its events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// Events were reported
    Normal,
    /// Events were suppressed while the snapshot was migrated
    Migration,
}

/// Outcome of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Cycle kind
    pub kind: CycleKind,
    /// Events reported, in emission order
    pub events: Vec<ChangeEvent>,
    /// Notifications accepted, the migration marker included
    pub delivered: usize,
    /// Notifications that failed
    pub failed_deliveries: usize,
    /// Events withheld by the migration guard
    pub suppressed: usize,
    /// Whether the next snapshot reached disk
    pub persisted: bool,
}

/// Drives observation, diffing, notification and persistence
#[derive(Debug)]
pub struct Watcher<O, N> {
    observer: O,
    notifier: N,
    store: SnapshotStore,
    interval: Duration,
    state: LoopState,
    cycles: u64,
}

impl<O, N> Watcher<O, N>
where
    O: ResourceObserver,
    N: Notifier,
{
    /// Create watcher from a validated configuration
    ///
    /// # Errors
    /// Returns `WatchError::Config` if the configuration is invalid
    pub fn new(config: &WatchConfig, observer: O, notifier: N) -> Result<Self, WatchError> {
        config.validate()?;

        Ok(Self {
            observer,
            notifier,
            store: SnapshotStore::new(config.snapshot_path.clone()),
            interval: config.interval,
            state: LoopState::Starting,
            cycles: 0,
        })
    }

    /// Current lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Cycles started so far
    #[inline]
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Snapshot store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run cycles until cancelled
    ///
    /// Waits for the observer first, then cycles with `interval` between the
    /// end of one cycle and the start of the next.
    ///
    /// # Errors
    /// Returns `WatchError::Observe` if readiness or any observation fails;
    /// the loop is terminated at that point
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), WatchError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                self.state = LoopState::Terminated;
                tracing::info!("cancelled before observer became ready");
                return Ok(());
            }
            ready = self.observer.wait_ready() => {
                if let Err(e) = ready {
                    self.state = LoopState::Terminated;
                    return Err(e.into());
                }
            }
        }

        self.state = LoopState::Running;
        tracing::info!(
            path = %self.store.path().display(),
            interval_secs = self.interval.as_secs(),
            "watcher running"
        );

        while !cancel.is_cancelled() {
            if let Err(e) = self.run_cycle().await {
                self.state = LoopState::Terminated;
                tracing::error!(error = %e, "watcher terminated");
                return Err(e);
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        self.state = LoopState::Terminated;
        tracing::info!(cycles = self.cycles, "watcher stopped");
        Ok(())
    }

    /// Run exactly one cycle
    ///
    /// # Errors
    /// Returns `WatchError::Observe` if observation fails. Nothing is loaded,
    /// reported or saved in that case.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, WatchError> {
        self.cycles += 1;
        let span = tracing::info_span!("cycle", n = self.cycles);
        self.cycle().instrument(span).await
    }

    async fn cycle(&self) -> Result<CycleReport, WatchError> {
        let observation = self.observer.observe().await?;
        let previous = self.store.load();

        let mode = migration::evaluate(&previous);
        if let CycleMode::Migration { legacy_clusters } = mode {
            tracing::info!(legacy_clusters, "migration started");
        }

        let Guarded {
            events,
            suppressed,
            marker,
            next,
        } = migration::guard(mode, diff(&previous, &observation));

        let mut report = CycleReport {
            kind: if mode.is_migration() {
                CycleKind::Migration
            } else {
                CycleKind::Normal
            },
            events: Vec::with_capacity(events.len()),
            delivered: 0,
            failed_deliveries: 0,
            suppressed,
            persisted: false,
        };

        for event in events {
            let delivered = self.notifier.notify_event(&event).await;
            report.record(delivered.is_ok());
            match delivered {
                Ok(()) => tracing::info!(kind = event.kind(), cluster = event.cluster(), "change reported"),
                Err(e) => tracing::error!(
                    error = %e,
                    kind = event.kind(),
                    cluster = event.cluster(),
                    "failed to deliver notification"
                ),
            }
            report.events.push(event);
        }

        if let Some(marker) = marker {
            tracing::info!(
                clusters = marker.clusters,
                suppressed = marker.suppressed,
                "migration finished"
            );
            let delivered = self.notifier.notify(&marker.to_string()).await;
            if let Err(e) = &delivered {
                tracing::error!(error = %e, "failed to deliver migration notice");
            }
            report.record(delivered.is_ok());
        }

        match self.store.save(&next) {
            Ok(()) => report.persisted = true,
            Err(e) => tracing::error!(error = %e, "failed to persist snapshot"),
        }

        tracing::info!(
            clusters = next.len(),
            events = report.events.len(),
            delivered = report.delivered,
            failed = report.failed_deliveries,
            suppressed = report.suppressed,
            "cycle complete"
        );
        Ok(report)
    }
}

impl CycleReport {
    fn record(&mut self, delivered: bool) {
        if delivered {
            self.delivered += 1;
        } else {
            self.failed_deliveries += 1;
        }
    }
}
