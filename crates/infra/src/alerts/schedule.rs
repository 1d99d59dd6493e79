use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::alerts::AlertDispatcher;
use crate::config::ScheduleConfig;

/// Local wall-clock source.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Runs the alert dispatch once a day at a fixed local time.
///
/// The loop wakes every `poll_interval` and fires when the wall clock has
/// reached the next scheduled run. Runs are unconditional: no threshold is
/// checked before sending.
#[derive(Clone)]
pub struct AlertScheduler {
    config: ScheduleConfig,
    clock: Clock,
}

/// Handle for the running scheduler (shutdown + run counter).
#[derive(Debug)]
pub struct AlertSchedulerHandle {
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
    runs: Arc<AtomicU64>,
}

impl AlertSchedulerHandle {
    /// Completed dispatch runs so far.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.join.await {
            warn!(error = %e, "alert scheduler task ended abnormally");
        }
    }
}

impl AlertScheduler {
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            config,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Spawn the loop on the current tokio runtime.
    pub fn spawn(&self, name: &'static str, dispatcher: Arc<AlertDispatcher>) -> AlertSchedulerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let runs = Arc::new(AtomicU64::new(0));

        let join = tokio::spawn(scheduler_loop(
            name,
            self.clone(),
            dispatcher,
            shutdown_rx,
            runs.clone(),
        ));

        AlertSchedulerHandle {
            shutdown: shutdown_tx,
            join,
            runs,
        }
    }
}

async fn scheduler_loop(
    name: &'static str,
    scheduler: AlertScheduler,
    dispatcher: Arc<AlertDispatcher>,
    mut shutdown_rx: oneshot::Receiver<()>,
    runs: Arc<AtomicU64>,
) {
    let at = scheduler.config.at;
    let mut next_run = next_occurrence((scheduler.clock)(), at);
    info!(scheduler = name, %next_run, poll = ?scheduler.config.poll_interval, "alert scheduler started");

    let mut ticker = tokio::time::interval(scheduler.config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Shutdown has priority; a dropped handle also stops the loop.
        tokio::select! {
            biased;
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {}
        }

        let now = (scheduler.clock)();
        if now < next_run {
            continue;
        }

        let summary = dispatcher.dispatch().await;
        runs.fetch_add(1, Ordering::SeqCst);

        next_run = next_occurrence(now, at);
        info!(
            scheduler = name,
            run_id = %summary.run_id,
            sent = summary.sent,
            %next_run,
            "scheduled alert run finished"
        );
    }

    info!(scheduler = name, "alert scheduler stopped");
}

/// First instant strictly after `now` whose time of day is `at`.
pub fn next_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        return today;
    }
    now.date()
        .checked_add_days(Days::new(1))
        .map(|d| d.and_time(at))
        .unwrap_or(NaiveDateTime::MAX)
}
