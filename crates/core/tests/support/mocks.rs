use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use autopost_core::{ContentGenerator, CycleObserver, ManualPublishFallback, Publisher};
use autopost_domain::{AutopostError, Credentials, CycleState, PublishedPost, Result};
use uuid::Uuid;

pub fn complete_credentials() -> Credentials {
    Credentials::new("ck", "cs", "at", "ts")
}

/// Generator returning queued responses, repeating the last one.
#[derive(Clone)]
pub struct MockGenerator {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    pub fn returning(text: &str) -> Self {
        Self::with_responses(vec![Ok(text.to_string())])
    }

    pub fn with_responses(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap_or_else(|| Ok(String::new()))
        }
    }
}

/// Publisher that either succeeds with a fixed id or fails with a fixed error.
#[derive(Clone)]
pub struct MockPublisher {
    outcome: std::result::Result<String, AutopostError>,
    pub calls: Arc<AtomicUsize>,
    pub published: Arc<Mutex<Vec<String>>>,
}

impl MockPublisher {
    pub fn succeeding(id: &str) -> Self {
        Self::with_outcome(Ok(id.to_string()))
    }

    pub fn failing(err: AutopostError) -> Self {
        Self::with_outcome(Err(err))
    }

    fn with_outcome(outcome: std::result::Result<String, AutopostError>) -> Self {
        Self {
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, text: &str, _credentials: &Credentials) -> Result<PublishedPost> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.published.lock().unwrap().push(text.to_string());
        match &self.outcome {
            Ok(id) => Ok(PublishedPost::new(id.clone(), text)),
            Err(err) => Err(err.clone()),
        }
    }
}

/// Records texts handed to the fallback, optionally failing each offer.
#[derive(Clone, Default)]
pub struct RecordingFallback {
    pub offered: Arc<Mutex<Vec<String>>>,
    failure: Option<AutopostError>,
}

impl RecordingFallback {
    pub fn failing(err: AutopostError) -> Self {
        Self { failure: Some(err), ..Self::default() }
    }
}

#[async_trait]
impl ManualPublishFallback for RecordingFallback {
    async fn offer_manual_publish(&self, text: &str) -> Result<()> {
        self.offered.lock().unwrap().push(text.to_string());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Records every state transition.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Arc<Mutex<Vec<(Uuid, CycleState, String)>>>,
}

impl RecordingObserver {
    pub fn states(&self) -> Vec<CycleState> {
        self.events.lock().unwrap().iter().map(|(_, state, _)| *state).collect()
    }
}

impl CycleObserver for RecordingObserver {
    fn on_state_change(&self, cycle_id: Uuid, state: CycleState, message: &str) {
        self.events.lock().unwrap().push((cycle_id, state, message.to_string()));
    }
}
