//! StatsCollectorActor - Polls the stats endpoint and emits alerts
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → fetch → decode → evaluate → dispatch alerts
//!     ↑
//!     └─── Commands (PollNow, UpdateInterval, Shutdown)
//! ```
//!
//! Commands are checked before the timer at every cycle boundary, so a
//! pending shutdown always wins over a due tick. A cycle that is running
//! is never interrupted: a shutdown sent during a fetch is handled once the
//! cycle has emitted its alerts. Alert delivery is capped at one interval.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, interval_at, timeout};
use tracing::{debug, error, instrument, trace, warn};

use crate::{
    StatsRecord,
    alerts::{AlertDispatcher, AlertMessage},
    config::Config,
    fetch::StatsSource,
    monitors::{
        failures::FailureCounter,
        thresholds::{Thresholds, evaluate},
    },
};

use super::messages::{CollectorCommand, PollOutcome};

/// Actor that polls a single stats source
pub struct StatsCollectorActor {
    source: Box<dyn StatsSource>,

    dispatcher: AlertDispatcher,

    thresholds: Thresholds,

    /// Only state carried from one cycle to the next
    failures: FailureCounter,

    command_rx: mpsc::Receiver<CollectorCommand>,

    display_name: String,

    interval_duration: Duration,
}

impl StatsCollectorActor {
    pub fn new(
        config: &Config,
        source: Box<dyn StatsSource>,
        dispatcher: AlertDispatcher,
        command_rx: mpsc::Receiver<CollectorCommand>,
    ) -> Self {
        Self {
            display_name: source.describe(),
            source,
            dispatcher,
            thresholds: config.thresholds,
            failures: FailureCounter::new(config.max_failures),
            command_rx,
            interval_duration: config.source.interval(),
        }
    }

    /// Run the actor's main loop
    ///
    /// The first poll happens immediately. The loop ends on a Shutdown
    /// command or when every handle has been dropped.
    #[instrument(skip(self), fields(source = %self.display_name))]
    pub async fn run(mut self) {
        debug!(
            "starting collector with interval {:?}",
            self.interval_duration
        );

        let mut ticker = delay_missed_ticks(interval(self.interval_duration));

        loop {
            tokio::select! {
                biased;

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(CollectorCommand::PollNow { respond_to }) => {
                            debug!("received PollNow command");
                            let outcome = self.poll_once().await;
                            let _ = respond_to.send(outcome);
                        }

                        Some(CollectorCommand::UpdateInterval { interval_ms }) => {
                            debug!("updating interval to {interval_ms}ms");
                            self.interval_duration = Duration::from_millis(interval_ms.max(1));
                            ticker = ticker_from_now(self.interval_duration);
                        }

                        Some(CollectorCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }

                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }

        debug!("collector stopped");
    }

    /// Run a single fetch → decode → evaluate → emit cycle
    ///
    /// Fetch failures feed the failure counter. A payload that cannot be
    /// decoded is only logged: it neither alerts nor counts as a failure.
    #[instrument(skip(self), fields(source = %self.display_name))]
    pub async fn poll_once(&mut self) -> PollOutcome {
        let raw = match self.source.fetch().await {
            Ok(raw) => raw,
            Err(e) => {
                error!("failed to fetch stats: {e}");
                let escalated = self.failures.record_failure();
                if escalated {
                    self.emit(&[FailureCounter::unavailable_alert()]).await;
                }
                return PollOutcome::FetchFailed { escalated };
            }
        };

        self.failures.record_success();

        let record = match StatsRecord::decode(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("discarding malformed stats record: {e}");
                return PollOutcome::Malformed(e);
            }
        };

        let alerts = evaluate(&record, &self.thresholds);
        self.emit(&alerts).await;

        trace!("cycle complete, {} alert(s) emitted", alerts.len());
        PollOutcome::Evaluated {
            alerts: alerts.len(),
        }
    }

    /// Deliver alerts in order, giving up after one poll interval.
    ///
    /// Alerts not delivered by then are dropped so a stalled sink cannot
    /// hold up the next tick or a pending shutdown.
    async fn emit(&self, alerts: &[AlertMessage]) {
        let delivery = self.dispatcher.dispatch_all(alerts);
        if timeout(self.interval_duration, delivery).await.is_err() {
            warn!(
                "alert delivery exceeded {:?}, remaining alerts dropped",
                self.interval_duration
            );
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures.consecutive()
    }
}

fn delay_missed_ticks(mut ticker: Interval) -> Interval {
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn ticker_from_now(period: Duration) -> Interval {
    delay_missed_ticks(interval_at(Instant::now() + period, period))
}

/// Handle for controlling a StatsCollectorActor
#[derive(Clone)]
pub struct CollectorHandle {
    sender: mpsc::Sender<CollectorCommand>,

    pub display_name: String,
}

impl CollectorHandle {
    /// Spawn a collector as a tokio task
    ///
    /// Returns the handle together with the task, which finishes once the
    /// collector has stopped.
    pub fn spawn(
        config: &Config,
        source: Box<dyn StatsSource>,
        dispatcher: AlertDispatcher,
    ) -> (Self, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = StatsCollectorActor::new(config, source, dispatcher, cmd_rx);
        let display_name = actor.display_name.clone();

        let task = tokio::spawn(actor.run());

        (
            Self {
                sender: cmd_tx,
                display_name,
            },
            task,
        )
    }

    /// Run a cycle immediately, bypassing the interval timer
    pub async fn poll_now(&self) -> Result<PollOutcome> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(CollectorCommand::PollNow { respond_to: tx })
            .await
            .context("failed to send PollNow command")?;

        rx.await.context("failed to receive poll outcome")
    }

    pub async fn update_interval(&self, interval_ms: u64) -> Result<()> {
        self.sender
            .send(CollectorCommand::UpdateInterval { interval_ms })
            .await
            .context("failed to send UpdateInterval command")?;
        Ok(())
    }

    /// Gracefully shut down the collector
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(CollectorCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
