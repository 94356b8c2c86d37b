//! External service integrations

pub mod openai;
pub mod share_intent;
pub mod x;

pub use openai::OpenAiGenerator;
pub use share_intent::ShareIntentFallback;
pub use x::XPublisher;
