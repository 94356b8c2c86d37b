//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use autopost_core::{AutomationCycle, AutomationSettings, SharedSettings};
use autopost_domain::{AppConfig, CycleReport, Result};
use autopost_infra::{
    CycleScheduler, CycleSchedulerConfig, HttpClient, OpenAiGenerator, ScheduleStatus,
    SchedulerResult, ShareIntentFallback, XPublisher,
};
use tracing::info;

use crate::utils::logging::LoggingObserver;

const USER_AGENT: &str = concat!("autopost/", env!("CARGO_PKG_VERSION"));

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: AppConfig,
    /// Topics and credentials read by every cycle; edits apply to the next one.
    pub settings: Arc<SharedSettings>,
    pub cycle: Arc<AutomationCycle>,
    pub fallback: Arc<ShareIntentFallback>,
    scheduler: CycleScheduler,
}

impl AppContext {
    /// Wire adapters and services from a validated configuration.
    ///
    /// # Errors
    /// Returns `AutopostError::Internal` if the HTTP client cannot be built.
    pub fn new_with_config(config: AppConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.publish.request_timeout_secs))
            .retry_policy(config.retry)
            .user_agent(USER_AGENT)
            .build()?;

        let settings = Arc::new(SharedSettings::new(AutomationSettings {
            topics: config.clean_topics(),
            credentials: config.credentials.clone(),
        }));

        let generator = OpenAiGenerator::from_config(&config.generation, http.clone());
        let publisher = XPublisher::new(http).with_endpoint(config.publish.endpoint.clone());
        let fallback = Arc::new(ShareIntentFallback::new(
            config.publish.share_intent_url.clone(),
            config.publish.open_browser,
        ));

        let cycle = Arc::new(
            AutomationCycle::new(settings.clone(), Arc::new(generator), Arc::new(publisher))
                .with_fallback(fallback.clone())
                .with_observer(Arc::new(LoggingObserver))
                .with_prompt_template(config.generation.prompt_template.clone()),
        );

        let scheduler = CycleScheduler::with_config(
            cycle.clone(),
            CycleSchedulerConfig {
                interval: Duration::from_secs(config.schedule.interval_minutes.saturating_mul(60)),
                ..Default::default()
            },
        );

        info!(
            topics = config.topics.len(),
            interval_minutes = config.schedule.interval_minutes,
            endpoint = %config.publish.endpoint,
            "Application context initialized"
        );

        Ok(Self { config, settings, cycle, fallback, scheduler })
    }

    /// Start the repeating schedule (first cycle runs immediately).
    ///
    /// # Errors
    /// Returns `SchedulerError::AlreadyRunning` on a second start.
    pub async fn start(&mut self) -> SchedulerResult<()> {
        self.scheduler.start().await
    }

    /// Run one manual cycle.
    ///
    /// # Errors
    /// Rejected while scheduled or while another cycle is in flight.
    pub async fn run_once(&self) -> SchedulerResult<CycleReport> {
        self.scheduler.run_once().await
    }

    pub fn schedule_status(&self) -> ScheduleStatus {
        self.scheduler.status()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Stop the schedule and wait for its timers to exit.
    ///
    /// A cycle already in flight is allowed to finish on its own.
    ///
    /// # Errors
    /// Returns `SchedulerError::Timeout` if a timer task does not exit.
    pub async fn shutdown(&mut self) -> SchedulerResult<()> {
        info!("shutdown called on AppContext");
        self.scheduler.stop().await
    }
}
