//! Share-intent fallback for manual publishing
//!
//! Builds a web intent URL prefilled with the generated text so the user can
//! publish by hand after an automated publish failed.

use std::process::Stdio;

use async_trait::async_trait;
use autopost_core::ManualPublishFallback;
use autopost_domain::constants::DEFAULT_SHARE_INTENT_URL;
use autopost_domain::{AutopostError, Result};
use parking_lot::Mutex;
use tokio::process::Command;
use tracing::{info, warn};

use crate::errors::InfraError;

/// Opens (or just logs) a share-intent URL for the generated text.
pub struct ShareIntentFallback {
    base_url: String,
    open_browser: bool,
    last_url: Mutex<Option<String>>,
}

impl ShareIntentFallback {
    /// Fallback for `base_url`; `open_browser` launches the system opener.
    pub fn new(base_url: impl Into<String>, open_browser: bool) -> Self {
        Self { base_url: base_url.into(), open_browser, last_url: Mutex::new(None) }
    }

    /// URL handed out by the most recent offer.
    pub fn last_url(&self) -> Option<String> {
        self.last_url.lock().clone()
    }
}

impl Default for ShareIntentFallback {
    fn default() -> Self {
        Self::new(DEFAULT_SHARE_INTENT_URL, false)
    }
}

/// `base?text=<percent-encoded text>`
pub fn build_share_url(base_url: &str, text: &str) -> Result<String> {
    let base = url::Url::parse(base_url).map_err(|err| AutopostError::from(InfraError::from(err)))?;
    let separator = if base.query().is_some() { '&' } else { '?' };
    Ok(format!("{}{separator}text={}", base.as_str(), urlencoding::encode(text)))
}

/// Platform URL opener. The URL is passed as a single argument and never
/// through a shell, so `&` in the query stays part of the URL.
fn opener_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new(opener_program());
    cmd.arg(url);
    cmd
}

#[async_trait]
impl ManualPublishFallback for ShareIntentFallback {
    async fn offer_manual_publish(&self, text: &str) -> Result<()> {
        let url = build_share_url(&self.base_url, text)?;
        info!(%url, "Publish manually via share intent");
        *self.last_url.lock() = Some(url.clone());

        if !self.open_browser {
            return Ok(());
        }

        let spawned = opener_command(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(_child) => Ok(()),
            Err(err) => {
                warn!(error = %err, "Failed to launch URL opener");
                Err(AutopostError::Internal(format!("failed to launch URL opener: {err}")))
            }
        }
    }
}
