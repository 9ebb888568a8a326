use super::{MetricSet, Recorder};
use core::pin::pin;
use core::time::Duration;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::spawn_blocking;

const LOG_TARGET: &str = "    poller";

/// Counts of what a [`Poller`] did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub cycles: u64,

    /// Cycles whose collection panicked or whose batch could not be recorded.
    pub failed_cycles: u64,

    /// Cycles that were recorded but had at least one failed query scope.
    pub degraded_cycles: u64,
}

enum CycleOutcome {
    Recorded,
    Degraded,
    Failed,
}

/// Collects one [`MetricSet`] on a fixed interval and records each cycle.
#[derive(Debug)]
pub struct Poller {
    metric_set: Arc<MetricSet>,
    recorder: Arc<dyn Recorder>,
    interval: Duration,
    max_cycles: Option<u64>,
}

impl Poller {
    #[must_use]
    pub fn new(metric_set: Arc<MetricSet>, recorder: Arc<dyn Recorder>, interval: Duration) -> Self {
        Self {
            metric_set,
            recorder,
            interval,
            max_cycles: None,
        }
    }

    /// Stop on its own after `max_cycles` cycles. `None` polls until shut down.
    #[must_use]
    pub const fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Poll until `shutdown` turns true (or the cycle limit is reached).
    ///
    /// The shutdown signal is honoured while sleeping and checked again
    /// before every collection; a cycle that has started always finishes.
    /// Dropping the sender does not stop the poller.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> PollSummary {
        let target = self.metric_set.target().to_owned();
        log::info!(
            target: LOG_TARGET,
            "Polling '{target}' every {:?} ({} statistics, {} query scopes)",
            self.interval,
            self.metric_set.len(),
            self.metric_set.query_dns().count()
        );

        let mut summary = PollSummary::default();
        loop {
            if *shutdown.borrow_and_update() || self.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            summary.cycles += 1;
            match self.cycle().await {
                CycleOutcome::Recorded => {}
                CycleOutcome::Degraded => summary.degraded_cycles += 1,
                CycleOutcome::Failed => summary.failed_cycles += 1,
            }

            if self.max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }

            if sleep_or_shutdown(self.interval, &mut shutdown).await {
                break;
            }
        }

        log::info!(
            target: LOG_TARGET,
            "Stopped polling '{target}' after {} cycles ({} failed, {} degraded)",
            summary.cycles,
            summary.failed_cycles,
            summary.degraded_cycles
        );
        summary
    }

    async fn cycle(&self) -> CycleOutcome {
        let metric_set = Arc::clone(&self.metric_set);
        let report = match spawn_blocking(move || metric_set.collect()).await {
            Ok(report) => report,
            Err(e) => {
                log::error!(target: LOG_TARGET, "Collection for '{}' did not complete: {e}", self.metric_set.target());
                return CycleOutcome::Failed;
            }
        };

        if let Err(e) = self.recorder.record(&report.tags, &report.measurements) {
            log::error!(target: LOG_TARGET, "Could not record measurements for '{}': {e:#}", self.metric_set.target());
            return CycleOutcome::Failed;
        }

        if report.is_degraded() {
            CycleOutcome::Degraded
        } else {
            CycleOutcome::Recorded
        }
    }
}

/// Sleep for `interval`; returns `true` if shutdown was requested meanwhile.
async fn sleep_or_shutdown(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let mut sleep = pin!(tokio::time::sleep(interval));
    loop {
        tokio::select! {
            () = &mut sleep => return false,
            changed = shutdown.changed() => {
                if changed.is_err() {
                    sleep.await;
                    return false;
                }
                if *shutdown.borrow_and_update() {
                    return true;
                }
            }
        }
    }
}
