//! Conversions from external infrastructure errors into domain errors.

use autopost_domain::AutopostError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AutopostError);

impl From<InfraError> for AutopostError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AutopostError> for InfraError {
    fn from(value: AutopostError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAutopostError {
    fn into_autopost(self) -> AutopostError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AutopostError */
/* -------------------------------------------------------------------------- */

impl IntoAutopostError for HttpError {
    fn into_autopost(self) -> AutopostError {
        if self.is_timeout() {
            return AutopostError::Transient("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return AutopostError::Transient("HTTP connection failure".into());
        }

        if self.is_builder() {
            return AutopostError::Internal(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return AutopostError::InvalidResponse(format!("failed to decode body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                429 | 500..=599 => AutopostError::Transient(message),
                _ => AutopostError::Rejected { status: code, message },
            };
        }

        AutopostError::Transient(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_autopost())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → AutopostError */
/* -------------------------------------------------------------------------- */

impl IntoAutopostError for JsonError {
    fn into_autopost(self) -> AutopostError {
        AutopostError::InvalidResponse(format!("malformed JSON: {self}"))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_autopost())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → AutopostError */
/* -------------------------------------------------------------------------- */

impl IntoAutopostError for UrlError {
    fn into_autopost(self) -> AutopostError {
        AutopostError::Config(format!("invalid URL: {self}"))
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        InfraError(value.into_autopost())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
