//! # Token Keeper Library
//!
//! Bearer-token lifecycle management: a fetched token is held in a store,
//! proactively renewed before expiry, attached transparently to outgoing
//! calls, and retried exactly once when a call fails on a rejected
//! credential.
//!
//! Modules:
//! - `store` — single-writer token state
//! - `token` — claims decoding and the expiry calculator
//! - `refresh` — scheduler, fetcher and periodic backstop
//! - `intercept` — pre-send / post-response pipeline and transport
//! - `provider` — identity provider capability and the HTTP implementation

pub mod config;
pub mod intercept;
pub mod keeper;
pub mod observability;
pub mod provider;
pub mod refresh;
pub mod store;
pub mod tests;
pub mod token;
pub mod utils;

pub use crate::intercept::{AuthClient, InterceptPipeline, OutgoingCall};
pub use crate::keeper::TokenKeeper;
pub use crate::provider::IdentityProvider;
pub use crate::store::TokenStore;
pub use crate::token::Token;
