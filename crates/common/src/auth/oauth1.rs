//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! Implements the subset of RFC 5849 needed to sign a request whose body is
//! not folded into the signature: percent-encoding, parameter normalization,
//! signature base string construction, key derivation, and `Authorization`
//! header assembly.
//!
//! Every request attempt must mint a fresh nonce and timestamp; a retried
//! request is signed again rather than replaying the previous header.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters pass through; everything else, including
/// `!*'()`, is escaped with uppercase hex digits.
const OAUTH_ENCODE_SET: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Only signature method supported.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// Protocol version sent in `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0";

/// Length of minted nonces.
pub const NONCE_LEN: usize = 32;

/// Percent-encode a value using the OAuth 1.0a rules.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "foundation")]
/// # {
/// use autopost_common::auth::oauth1::percent_encode;
///
/// assert_eq!(percent_encode("a!b*c'd(e)f"), "a%21b%2Ac%27d%28e%29f");
/// assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
/// # }
/// ```
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Generate a nonce of [`NONCE_LEN`] alphanumeric characters from the
/// thread-local CSPRNG.
pub fn generate_nonce() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}

/// Current Unix time in whole seconds.
pub fn current_timestamp() -> String {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default().to_string()
}

/// The six protocol parameters that accompany every signed request.
///
/// Never contains `oauth_signature`; the signature is computed over these
/// values and attached afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthParams {
    pub consumer_key: String,
    pub token: String,
    pub nonce: String,
    pub timestamp: String,
}

impl OAuthParams {
    /// Mint parameters with a fresh nonce and the current timestamp.
    pub fn new(consumer_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_nonce_and_timestamp(consumer_key, token, generate_nonce(), current_timestamp())
    }

    /// Build parameters with a caller-chosen nonce and timestamp.
    pub fn with_nonce_and_timestamp(
        consumer_key: impl Into<String>,
        token: impl Into<String>,
        nonce: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            token: token.into(),
            nonce: nonce.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Key/value pairs in canonical (sorted) order.
    pub fn pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", self.nonce.as_str()),
            ("oauth_signature_method", SIGNATURE_METHOD),
            ("oauth_timestamp", self.timestamp.as_str()),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", OAUTH_VERSION),
        ]
    }
}

impl std::fmt::Debug for OAuthParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthParams")
            .field("consumer_key", &self.consumer_key)
            .field("token", &"[REDACTED]")
            .field("nonce", &"[REDACTED]")
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Borrowed view of the four credential values needed to sign.
///
/// Secrets are optional so absence is representable; an absent secret signs
/// as the empty string.
#[derive(Clone, Copy)]
pub struct SigningCredentials<'a> {
    pub consumer_key: &'a str,
    pub consumer_secret: Option<&'a str>,
    pub token: &'a str,
    pub token_secret: Option<&'a str>,
}

/// Sort parameters by encoded key (then encoded value) and join them as
/// `key=value` pairs separated by `&`.
///
/// The result does not depend on the iteration order of `params`.
pub fn normalize_parameters<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut encoded: Vec<(String, String)> = params
        .into_iter()
        .map(|(k, v)| (percent_encode(k.as_ref()), percent_encode(v.as_ref())))
        .collect();
    encoded.sort();

    encoded.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&")
}

/// `METHOD&encoded_url&encoded_parameter_string`
pub fn signature_base_string<I, K, V>(method: &str, url: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(url),
        percent_encode(&normalize_parameters(params))
    )
}

/// `encoded_consumer_secret&encoded_token_secret`; the `&` is always present.
pub fn signing_key(consumer_secret: Option<&str>, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret.unwrap_or_default()),
        percent_encode(token_secret.unwrap_or_default())
    )
}

/// Base64 (standard alphabet, padded) HMAC-SHA1 of `data` under `key`.
pub fn hmac_sha1_base64(key: &[u8], data: &[u8]) -> String {
    let Ok(mut mac) = HmacSha1::new_from_slice(key) else {
        unreachable!("HMAC accepts keys of any length");
    };
    mac.update(data);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Compute the `oauth_signature` for a request.
///
/// Never fails; absent secrets are treated as empty.
pub fn sign<I, K, V>(
    method: &str,
    url: &str,
    params: I,
    consumer_secret: Option<&str>,
    token_secret: Option<&str>,
) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let base = signature_base_string(method, url, params);
    let key = signing_key(consumer_secret, token_secret);
    hmac_sha1_base64(key.as_bytes(), base.as_bytes())
}

/// Assemble `OAuth k="v", ...` from the protocol parameters and signature,
/// sorted by key.
pub fn authorization_header(params: &OAuthParams, signature: &str) -> String {
    let mut fields: Vec<(&str, &str)> = params.pairs().to_vec();
    fields.push(("oauth_signature", signature));
    fields.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let joined = fields
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {joined}")
}

/// Mint fresh parameters, sign, and assemble the header in one call.
pub fn build_authorization_header(
    method: &str,
    url: &str,
    credentials: SigningCredentials<'_>,
) -> String {
    let params = OAuthParams::new(credentials.consumer_key, credentials.token);
    let signature =
        sign(method, url, params.pairs(), credentials.consumer_secret, credentials.token_secret);
    authorization_header(&params, &signature)
}
