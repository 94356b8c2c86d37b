//! Fixed-interval scheduler for the automation cycle.
//!
//! `start()` runs the cycle immediately, then every `interval`, and keeps a
//! one-second countdown to the next firing. Each firing spawns the cycle as
//! an independent task; the ticker never awaits it, so a slow cycle cannot
//! delay the schedule and a failing cycle cannot stop it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use autopost_infra::scheduling::{CycleJob, CycleScheduler, CycleSchedulerConfig, SchedulerResult};
//!
//! # async fn example(job: Arc<dyn CycleJob>) -> SchedulerResult<()> {
//! let mut scheduler = CycleScheduler::with_config(
//!     job,
//!     CycleSchedulerConfig { interval: Duration::from_secs(40 * 60), ..Default::default() },
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use autopost_common::time::format::format_remaining;
use autopost_core::AutomationCycle;
use autopost_domain::constants::{COUNTDOWN_TICK_SECS, DEFAULT_INTERVAL_MINUTES};
use autopost_domain::{CycleMode, CycleReport};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Unit of work driven by the scheduler.
#[async_trait]
pub trait CycleJob: Send + Sync {
    /// Run one cycle. Failures are reported in the returned report.
    async fn run_cycle(&self, mode: CycleMode) -> CycleReport;

    /// Whether a cycle is currently in flight.
    fn is_busy(&self) -> bool;
}

#[async_trait]
impl CycleJob for AutomationCycle {
    async fn run_cycle(&self, mode: CycleMode) -> CycleReport {
        self.run(mode).await
    }

    fn is_busy(&self) -> bool {
        self.is_in_flight()
    }
}

/// Configuration for the cycle scheduler.
#[derive(Debug, Clone)]
pub struct CycleSchedulerConfig {
    /// Time between firings.
    pub interval: Duration,
    /// Period of the countdown refresh.
    pub countdown_tick: Duration,
    /// Timeout for awaiting timer tasks on stop.
    pub join_timeout: Duration,
}

impl Default for CycleSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_MINUTES * 60),
            countdown_tick: Duration::from_secs(COUNTDOWN_TICK_SECS),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Observable snapshot of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleStatus {
    pub running: bool,
    pub interval: Duration,
    pub next_run_at: Option<DateTime<Utc>>,
    pub remaining: Option<Duration>,
    /// Human-readable remaining time, e.g. `"39m 59s"`.
    pub remaining_display: Option<String>,
    /// Cycles started by the schedule since construction.
    pub cycles_started: u64,
}

impl ScheduleStatus {
    fn stopped(interval: Duration, cycles_started: u64) -> Self {
        Self {
            running: false,
            interval,
            next_run_at: None,
            remaining: None,
            remaining_display: None,
            cycles_started,
        }
    }
}

/// Owned timer handles; present only while running.
struct ScheduleHandle {
    ticker: JoinHandle<()>,
    countdown: JoinHandle<()>,
}

impl ScheduleHandle {
    fn is_active(&self) -> bool {
        !self.ticker.is_finished()
    }
}

/// Shared between the scheduler and its timer tasks.
struct ScheduleState {
    status: RwLock<ScheduleStatus>,
    cycles_started: AtomicU64,
}

impl ScheduleState {
    fn arm(&self, interval: Duration) {
        let next_run_at = deadline_after(interval);
        let mut status = self.status.write();
        status.running = true;
        status.interval = interval;
        status.next_run_at = next_run_at;
        status.remaining = Some(interval);
        status.remaining_display = Some(format_remaining(interval));
    }

    fn refresh_countdown(&self) {
        let mut status = self.status.write();
        if let Some(next) = status.next_run_at {
            let remaining = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            status.remaining = Some(remaining);
            status.remaining_display = Some(format_remaining(remaining));
        }
    }

    fn clear(&self) {
        let mut status = self.status.write();
        let interval = status.interval;
        *status = ScheduleStatus::stopped(interval, self.cycles_started.load(Ordering::SeqCst));
    }
}

/// Repeating-timer scheduler with explicit lifecycle management.
pub struct CycleScheduler {
    job: Arc<dyn CycleJob>,
    config: CycleSchedulerConfig,
    cancellation: CancellationToken,
    handle: Option<ScheduleHandle>,
    state: Arc<ScheduleState>,
}

impl CycleScheduler {
    /// Create a scheduler with the default 40 minute interval.
    pub fn new(job: Arc<dyn CycleJob>) -> Self {
        Self::with_config(job, CycleSchedulerConfig::default())
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(job: Arc<dyn CycleJob>, config: CycleSchedulerConfig) -> Self {
        let state = ScheduleState {
            status: RwLock::new(ScheduleStatus::stopped(config.interval, 0)),
            cycles_started: AtomicU64::new(0),
        };
        Self {
            job,
            config,
            cancellation: CancellationToken::new(),
            handle: None,
            state: Arc::new(state),
        }
    }

    /// Start the schedule: run once now, then every interval.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] if the schedule is active;
    /// no second timer is armed.
    #[instrument(skip(self), fields(interval_secs = self.config.interval.as_secs()))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        // Fresh token so the scheduler can be restarted after stop
        self.cancellation = CancellationToken::new();
        let interval = self.config.interval;

        spawn_cycle(self.job.clone(), self.state.clone());
        self.state.arm(interval);

        let ticker = tokio::spawn(Self::ticker_loop(
            self.job.clone(),
            self.state.clone(),
            interval,
            self.cancellation.clone(),
        ));
        let countdown = tokio::spawn(Self::countdown_loop(
            self.state.clone(),
            self.config.countdown_tick,
            self.cancellation.clone(),
        ));

        self.handle = Some(ScheduleHandle { ticker, countdown });
        info!("Cycle scheduler started");
        Ok(())
    }

    /// Cancel both timers and clear the next-run state.
    ///
    /// Idempotent: stopping a stopped scheduler is `Ok(())`. A cycle that is
    /// already in flight is left to finish on its own.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(handle) = self.handle.take() else {
            debug!("Cycle scheduler already stopped");
            return Ok(());
        };

        self.cancellation.cancel();

        let join_timeout = self.config.join_timeout;
        let mut joined = Ok(());
        for task in [handle.ticker, handle.countdown] {
            let result = tokio::time::timeout(join_timeout, task)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })
                .and_then(|res| res.map_err(SchedulerError::from));
            if joined.is_ok() {
                joined = result;
            }
        }

        // Cleared after the join so a late tick cannot re-arm it.
        self.state.clear();
        joined?;

        info!("Cycle scheduler stopped");
        Ok(())
    }

    /// Run a single manual cycle without arming any timer.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::ManualRunWhileScheduled`] while the schedule is
    ///   active
    /// - [`SchedulerError::CycleInProgress`] while another cycle is in flight
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> SchedulerResult<CycleReport> {
        if self.is_running() {
            return Err(SchedulerError::ManualRunWhileScheduled);
        }
        if self.job.is_busy() {
            return Err(SchedulerError::CycleInProgress);
        }

        info!("Running manual cycle");
        Ok(self.job.run_cycle(CycleMode::Manual).await)
    }

    /// Returns true while the timers are armed.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(ScheduleHandle::is_active)
    }

    /// Current schedule snapshot.
    pub fn status(&self) -> ScheduleStatus {
        let mut status = self.state.status.read().clone();
        status.cycles_started = self.state.cycles_started.load(Ordering::SeqCst);
        status
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    async fn ticker_loop(
        job: Arc<dyn CycleJob>,
        state: Arc<ScheduleState>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Cycle ticker cancelled");
                    state.clear();
                    break;
                }
                _ = ticker.tick() => {
                    spawn_cycle(job.clone(), state.clone());
                    state.arm(interval);
                }
            }
        }
    }

    async fn countdown_loop(state: Arc<ScheduleState>, tick: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(tick.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => state.refresh_countdown(),
            }
        }
    }
}

impl Drop for CycleScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("CycleScheduler dropped while running; cancelling timers");
            self.cancellation.cancel();
        }
    }
}

/// Fire-and-forget: the ticker does not await the cycle.
fn spawn_cycle(job: Arc<dyn CycleJob>, state: Arc<ScheduleState>) {
    let ordinal = state.cycles_started.fetch_add(1, Ordering::SeqCst) + 1;
    tokio::spawn(async move {
        debug!(ordinal, "Scheduled cycle firing");
        let report = job.run_cycle(CycleMode::Scheduled).await;
        if let Some(err) = &report.error {
            warn!(ordinal, cycle_id = %report.cycle_id, error = %err, "Scheduled cycle failed");
        }
    });
}

fn deadline_after(interval: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(interval).ok().and_then(|d| Utc::now().checked_add_signed(d))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    use autopost_domain::{AutopostError, CycleState};

    use super::*;

    #[derive(Default)]
    struct CountingJob {
        runs: AtomicUsize,
        busy: AtomicBool,
        fail: bool,
    }

    impl CountingJob {
        fn failing() -> Self {
            Self { fail: true, ..Default::default() }
        }

        fn run_count(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CycleJob for CountingJob {
        async fn run_cycle(&self, mode: CycleMode) -> CycleReport {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let mut report = CycleReport::begin(mode);
            if self.fail {
                report.final_state = CycleState::Error;
                report.error = Some(AutopostError::RetriesExhausted {
                    attempts: 3,
                    last_error: "HTTP 503".into(),
                });
            } else {
                report.final_state = mode.success_state();
            }
            report
        }

        fn is_busy(&self) -> bool {
            self.busy.load(Ordering::SeqCst)
        }
    }

    fn config(interval: Duration) -> CycleSchedulerConfig {
        CycleSchedulerConfig {
            interval,
            countdown_tick: Duration::from_millis(20),
            join_timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn start_runs_immediately_and_sets_countdown() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job.clone(), config(Duration::from_secs(3600)));

        scheduler.start().await.expect("start succeeds");
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(job.run_count(), 1);
        let status = scheduler.status();
        assert!(status.running);
        assert!(status.next_run_at.is_some_and(|next| next > Utc::now()));
        assert!(status.remaining.is_some_and(|r| r <= Duration::from_secs(3600)));
        assert_eq!(status.remaining_display.as_deref(), Some("59m 59s"));
        assert_eq!(status.cycles_started, 1);

        scheduler.stop().await.expect("stop succeeds");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fires_every_interval() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job.clone(), config(Duration::from_millis(100)));

        scheduler.start().await.expect("start succeeds");
        tokio::time::sleep(Duration::from_millis(350)).await;
        scheduler.stop().await.expect("stop succeeds");

        // Immediate run plus firings at ~100, ~200 and ~300ms
        assert!(job.run_count() >= 3, "ran {} times", job.run_count());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn double_start_is_rejected_and_arms_one_timer() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job.clone(), config(Duration::from_secs(3600)));

        scheduler.start().await.expect("first start");
        let err = scheduler.start().await.expect_err("second start fails");
        assert!(matches!(err, SchedulerError::AlreadyRunning));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(job.run_count(), 1);
        assert!(scheduler.is_running());

        scheduler.stop().await.expect("stop succeeds");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_is_idempotent() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job, config(Duration::from_secs(60)));

        scheduler.stop().await.expect("stop before start");
        scheduler.start().await.expect("start succeeds");
        scheduler.stop().await.expect("first stop");
        scheduler.stop().await.expect("second stop");

        let status = scheduler.status();
        assert!(!status.running);
        assert!(status.next_run_at.is_none());
        assert!(status.remaining_display.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_leaves_state_cleared_under_fast_ticks() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job, config(Duration::from_millis(1)));

        for _ in 0..20 {
            scheduler.start().await.expect("start succeeds");
            tokio::time::sleep(Duration::from_millis(5)).await;
            scheduler.stop().await.expect("stop succeeds");

            let status = scheduler.status();
            assert!(!status.running);
            assert!(status.next_run_at.is_none());
            assert!(status.remaining.is_none());
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_cancels_future_firings() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job.clone(), config(Duration::from_millis(50)));

        scheduler.start().await.expect("start succeeds");
        tokio::time::sleep(Duration::from_millis(120)).await;
        scheduler.stop().await.expect("stop succeeds");

        // Let cycles spawned before the stop finish
        tokio::time::sleep(Duration::from_millis(50)).await;
        let after_stop = job.run_count();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(job.run_count(), after_stop);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn restart_after_stop_succeeds() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job.clone(), config(Duration::from_secs(3600)));

        scheduler.start().await.expect("start succeeds");
        scheduler.stop().await.expect("stop succeeds");
        assert!(!scheduler.is_running());

        scheduler.start().await.expect("start again");
        assert!(scheduler.is_running());
        scheduler.stop().await.expect("stop again");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(job.run_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn manual_run_only_while_stopped() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job.clone(), config(Duration::from_secs(3600)));

        let report = scheduler.run_once().await.expect("manual run while stopped");
        assert_eq!(report.mode, CycleMode::Manual);
        assert_eq!(report.final_state, CycleState::Success);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.status().cycles_started, 0);

        scheduler.start().await.expect("start succeeds");
        let err = scheduler.run_once().await.expect_err("manual run while scheduled");
        assert!(matches!(err, SchedulerError::ManualRunWhileScheduled));
        scheduler.stop().await.expect("stop succeeds");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn manual_run_rejected_while_cycle_in_flight() {
        let job = Arc::new(CountingJob::default());
        job.busy.store(true, Ordering::SeqCst);
        let scheduler = CycleScheduler::with_config(job.clone(), config(Duration::from_secs(3600)));

        let err = scheduler.run_once().await.expect_err("busy");
        assert!(matches!(err, SchedulerError::CycleInProgress));
        assert_eq!(job.run_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failing_cycles_do_not_stop_schedule() {
        let job = Arc::new(CountingJob::failing());
        let mut scheduler = CycleScheduler::with_config(job.clone(), config(Duration::from_millis(50)));

        scheduler.start().await.expect("start succeeds");
        tokio::time::sleep(Duration::from_millis(180)).await;

        assert!(scheduler.is_running());
        assert!(job.run_count() >= 2);
        scheduler.stop().await.expect("stop succeeds");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn countdown_decreases() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job, config(Duration::from_secs(3600)));

        scheduler.start().await.expect("start succeeds");
        tokio::time::sleep(Duration::from_millis(60)).await;
        let first = scheduler.status().remaining.expect("remaining");
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = scheduler.status().remaining.expect("remaining");

        assert!(second < first);
        scheduler.stop().await.expect("stop succeeds");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn drop_while_running_cancels_timers() {
        let job = Arc::new(CountingJob::default());
        let mut scheduler = CycleScheduler::with_config(job.clone(), config(Duration::from_millis(50)));

        scheduler.start().await.expect("start succeeds");
        drop(scheduler);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let after_drop = job.run_count();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(job.run_count(), after_drop);
    }
}
