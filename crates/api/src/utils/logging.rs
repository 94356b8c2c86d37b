use autopost_core::CycleObserver;
use autopost_domain::CycleState;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,autopost=debug";

/// Selects JSON output when set to `json`.
pub const LOG_FORMAT_ENV: &str = "AUTOPOST_LOG_FORMAT";

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Writes every cycle state transition to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl CycleObserver for LoggingObserver {
    fn on_state_change(&self, cycle_id: Uuid, state: CycleState, message: &str) {
        if state == CycleState::Error {
            warn!(%cycle_id, state = state.as_str(), message, "cycle_state");
        } else {
            info!(%cycle_id, state = state.as_str(), message, "cycle_state");
        }
    }
}
