//! Domain types and models

pub mod credentials;
pub mod cycle;
pub mod post;
pub mod retry;

pub use credentials::Credentials;
pub use cycle::{CycleMode, CycleReport, CycleState};
pub use post::PublishedPost;
pub use retry::RetryPolicy;
