//! Automation cycle service - pick a topic, generate, publish

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use autopost_domain::constants::{DEFAULT_PROMPT_TEMPLATE, MAX_POST_CHARS, POST_TRUNCATE_SUFFIX};
use autopost_domain::{AutopostError, CycleMode, CycleReport, CycleState, Result};
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::ports::{
    AutomationSettings, ContentGenerator, CycleObserver, ManualPublishFallback, Publisher,
    RandomSource, SettingsSource,
};
use super::settings::ThreadRandom;

/// Placeholder replaced with the chosen topic in the prompt template.
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// One "pick topic → generate → publish" unit of work.
///
/// The cycle owns its [`CycleState`]; schedulers only ask whether a cycle is
/// in flight. Failures never escape [`AutomationCycle::run`]; they are
/// recorded in the returned [`CycleReport`].
pub struct AutomationCycle {
    settings: Arc<dyn SettingsSource>,
    generator: Arc<dyn ContentGenerator>,
    publisher: Arc<dyn Publisher>,
    random: Arc<dyn RandomSource>,
    fallback: Option<Arc<dyn ManualPublishFallback>>,
    observers: Vec<Arc<dyn CycleObserver>>,
    prompt_template: String,
    max_post_chars: usize,
    state: Mutex<CycleState>,
    active: AtomicUsize,
}

impl AutomationCycle {
    /// Create a new cycle with thread-local randomness and no fallback
    pub fn new(
        settings: Arc<dyn SettingsSource>,
        generator: Arc<dyn ContentGenerator>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            settings,
            generator,
            publisher,
            random: Arc::new(ThreadRandom),
            fallback: None,
            observers: Vec::new(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            max_post_chars: MAX_POST_CHARS,
            state: Mutex::new(CycleState::Idle),
            active: AtomicUsize::new(0),
        }
    }

    /// Replace the topic picker; tests inject a fixed index.
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Offer the given fallback after failed manual publishes.
    pub fn with_fallback(mut self, fallback: Arc<dyn ManualPublishFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Add an observer notified of every state change.
    pub fn with_observer(mut self, observer: Arc<dyn CycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Template containing [`TOPIC_PLACEHOLDER`].
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    /// Cap on published text length, in characters.
    pub fn with_max_post_chars(mut self, max_chars: usize) -> Self {
        self.max_post_chars = max_chars.max(1);
        self
    }

    /// Current (most recently reported) state.
    pub fn state(&self) -> CycleState {
        *self.state.lock()
    }

    /// Whether any cycle is currently generating or posting.
    pub fn is_in_flight(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    /// Check topics and credentials before scheduling starts.
    ///
    /// # Errors
    /// Returns [`AutopostError::Config`] naming what is missing.
    pub fn preflight(&self) -> Result<()> {
        let settings = self.settings.snapshot();
        ready_topics(&settings).map(|_| ())
    }

    /// Run one cycle to completion.
    #[instrument(skip(self), fields(cycle_id = tracing::field::Empty))]
    pub async fn run(&self, mode: CycleMode) -> CycleReport {
        let mut report = CycleReport::begin(mode);
        tracing::Span::current().record("cycle_id", tracing::field::display(report.cycle_id));

        self.transition(report.cycle_id, CycleState::Idle, "Cycle started");

        let outcome = {
            let _guard = InFlightGuard::enter(&self.active);
            self.execute(&mut report).await
        };

        match outcome {
            Ok(()) => {
                let state = mode.success_state();
                let message = match &report.post {
                    Some(post) => format!("Published post {}", post.id),
                    None => "Cycle complete".to_string(),
                };
                self.transition(report.cycle_id, state, &message);
                report.final_state = state;
            }
            Err(err) => {
                warn!(error = %err, kind = err.label(), "Automation cycle failed");
                self.transition(report.cycle_id, CycleState::Error, &err.to_string());
                report.final_state = CycleState::Error;
                report.fallback_offered = self.maybe_offer_fallback(mode, &err, &report).await;
                report.error = Some(err);
            }
        }

        report.finished_at = Utc::now();
        info!(
            state = %report.final_state,
            duration_ms = report.duration_ms(),
            fallback_offered = report.fallback_offered,
            "Automation cycle finished"
        );
        report
    }

    async fn execute(&self, report: &mut CycleReport) -> Result<()> {
        // Configuration problems fail here, before any network call.
        let settings = self.settings.snapshot();
        let topics = ready_topics(&settings)?;

        let index = self.random.pick_index(topics.len()).min(topics.len() - 1);
        let topic = topics[index].clone();
        report.topic = Some(topic.clone());

        self.transition(
            report.cycle_id,
            CycleState::Generating,
            &format!("Generating post about \"{topic}\""),
        );
        let prompt = build_prompt(&self.prompt_template, &topic);
        let raw = self.generator.generate(&prompt).await?;
        let text = normalize_post_text(&raw, self.max_post_chars)
            .ok_or_else(|| AutopostError::NoContent("generator returned empty text".to_string()))?;
        debug!(chars = text.chars().count(), "Generated post text");
        report.text = Some(text.clone());

        self.transition(report.cycle_id, CycleState::Posting, "Publishing post");
        let post = self.publisher.publish(&text, &settings.credentials).await?;
        report.post = Some(post);
        Ok(())
    }

    async fn maybe_offer_fallback(
        &self,
        mode: CycleMode,
        err: &AutopostError,
        report: &CycleReport,
    ) -> bool {
        if !mode.allows_fallback() || !err.offers_manual_fallback() {
            return false;
        }
        let (Some(fallback), Some(text)) = (&self.fallback, &report.text) else {
            return false;
        };

        info!("Offering manual publish fallback");
        match fallback.offer_manual_publish(text).await {
            Ok(()) => true,
            Err(fallback_err) => {
                warn!(error = %fallback_err, "Manual publish fallback failed");
                false
            }
        }
    }

    fn transition(&self, cycle_id: Uuid, state: CycleState, message: &str) {
        *self.state.lock() = state;
        debug!(%cycle_id, %state, message, "Cycle state changed");
        for observer in &self.observers {
            observer.on_state_change(cycle_id, state, message);
        }
    }
}

/// Counts a running cycle; released on drop so a cancelled cycle does not
/// stay in flight forever.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Topics usable by a cycle, or the configuration error that blocks it.
fn ready_topics(settings: &AutomationSettings) -> Result<Vec<String>> {
    let topics = clean_topics(&settings.topics);
    if topics.is_empty() {
        return Err(AutopostError::Config("no topics configured".to_string()));
    }
    let missing = settings.credentials.missing_fields();
    if !missing.is_empty() {
        return Err(AutopostError::Config(format!(
            "missing credentials: {}",
            missing.join(", ")
        )));
    }
    Ok(topics)
}

fn clean_topics(topics: &[String]) -> Vec<String> {
    topics.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).map(str::to_string).collect()
}

/// Substitute `topic` into `template`; a template without the placeholder
/// gets the topic appended.
pub fn build_prompt(template: &str, topic: &str) -> String {
    if template.contains(TOPIC_PLACEHOLDER) {
        template.replace(TOPIC_PLACEHOLDER, topic)
    } else {
        format!("{} {topic}", template.trim_end())
    }
}

/// Trim, strip one pair of surrounding quotes, and truncate to `max_chars`
/// characters (ellipsis included). Returns `None` when nothing remains.
pub fn normalize_post_text(raw: &str, max_chars: usize) -> Option<String> {
    let trimmed = strip_quotes(raw.trim()).trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().count() <= max_chars {
        return Some(trimmed.to_string());
    }

    let keep = max_chars.saturating_sub(POST_TRUNCATE_SUFFIX.chars().count());
    let mut truncated: String = trimmed.chars().take(keep).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push_str(POST_TRUNCATE_SUFFIX);
    Some(truncated)
}

fn strip_quotes(text: &str) -> &str {
    const PAIRS: [(char, char); 3] = [('"', '"'), ('\'', '\''), ('\u{201C}', '\u{201D}')];
    for (open, close) in PAIRS {
        if let Some(inner) = text.strip_prefix(open).and_then(|rest| rest.strip_suffix(close)) {
            return inner;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_substitutes_topic() {
        assert_eq!(build_prompt("Write about {topic}!", "Rust"), "Write about Rust!");
        assert_eq!(build_prompt("Write a post about", "Rust"), "Write a post about Rust");
    }

    #[test]
    fn normalize_rejects_blank() {
        assert_eq!(normalize_post_text("   \n\t", 280), None);
        assert_eq!(normalize_post_text("\"\"", 280), None);
    }

    #[test]
    fn normalize_strips_quotes_and_whitespace() {
        assert_eq!(normalize_post_text("  \"hello world\"  ", 280).as_deref(), Some("hello world"));
        assert_eq!(normalize_post_text("\u{201C}smart\u{201D}", 280).as_deref(), Some("smart"));
        assert_eq!(normalize_post_text("it's fine", 280).as_deref(), Some("it's fine"));
    }

    #[test]
    fn normalize_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        let out = normalize_post_text(&long, 280).unwrap();
        assert_eq!(out.chars().count(), 280);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn normalize_keeps_text_at_limit() {
        let exact = "a".repeat(280);
        assert_eq!(normalize_post_text(&exact, 280).unwrap(), exact);
    }
}
