use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post accepted by the publish endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: String,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

impl PublishedPost {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), published_at: Utc::now() }
    }
}
