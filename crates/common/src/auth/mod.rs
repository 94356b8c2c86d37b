//! Request authentication helpers
//!
//! - [`oauth1`]: OAuth 1.0a HMAC-SHA1 request signing

pub mod oauth1;

pub use oauth1::{
    authorization_header, build_authorization_header, generate_nonce, percent_encode, sign,
    OAuthParams, SigningCredentials,
};
