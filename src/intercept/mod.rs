pub mod auth;
pub mod client;
pub mod pipeline;

pub use auth::BearerAuthStage;
pub use client::AuthClient;
pub use pipeline::{InterceptPipeline, OutgoingCall, Verdict};
