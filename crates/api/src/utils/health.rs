//! Readiness report for the `check` command
//!
//! Each component of the configuration is checked independently so a single
//! run lists every problem instead of stopping at the first.

use autopost_domain::AppConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Overall readiness of a loaded configuration
///
/// # Example
/// ```
/// use autopost_app::utils::health::{ComponentHealth, HealthStatus};
///
/// let status = HealthStatus::new()
///     .add_component(ComponentHealth::healthy("topics"))
///     .add_component(ComponentHealth::unhealthy("credentials", "missing token_secret"));
///
/// assert!(!status.is_healthy);
/// assert_eq!(status.unhealthy().count(), 1);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// True when every component is healthy
    pub is_healthy: bool,
    pub components: Vec<ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self { is_healthy: true, components: Vec::new(), checked_at: Utc::now() }
    }

    /// Add a component check; any unhealthy component makes the whole status
    /// unhealthy.
    pub fn add_component(mut self, component: ComponentHealth) -> Self {
        self.is_healthy &= component.is_healthy;
        self.components.push(component);
        self
    }

    pub fn unhealthy(&self) -> impl Iterator<Item = &ComponentHealth> {
        self.components.iter().filter(|c| !c.is_healthy)
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Health of a single component
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub is_healthy: bool,
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn healthy_with(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: Some(message.into()) }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}

/// Check a validated configuration for everything a scheduled run needs.
pub fn check_config(config: &AppConfig) -> HealthStatus {
    let topics = config.clean_topics();
    let topics_health = if topics.is_empty() {
        ComponentHealth::unhealthy("topics", "no topics configured")
    } else {
        ComponentHealth::healthy_with("topics", format!("{} configured", topics.len()))
    };

    let missing = config.credentials.missing_fields();
    let credentials_health = if missing.is_empty() {
        ComponentHealth::healthy("credentials")
    } else {
        ComponentHealth::unhealthy("credentials", format!("missing {}", missing.join(", ")))
    };

    let has_key =
        config.generation.api_key.as_deref().is_some_and(|key| !key.trim().is_empty());
    let generation_health = if has_key {
        ComponentHealth::healthy_with("generation", config.generation.model.clone())
    } else {
        ComponentHealth::unhealthy("generation", "AUTOPOST_GENERATION_API_KEY is not set")
    };

    HealthStatus::new()
        .add_component(topics_health)
        .add_component(credentials_health)
        .add_component(generation_health)
        .add_component(ComponentHealth::healthy_with(
            "schedule",
            format!("every {} minutes", config.schedule.interval_minutes),
        ))
}
