pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::token::Token;

/// Identity provider capability consumed by the lifecycle manager.
///
/// `issue_token` may legitimately answer with no token (e.g. the session was
/// signed out on the provider side); that is not an error.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Whether the provider has finished initializing and can issue tokens.
    fn is_ready(&self) -> bool;

    /// Obtain a fresh token. `bypass_cache` forces issuance of a new token
    /// instead of any provider-side cached one.
    async fn issue_token(&self, bypass_cache: bool) -> Result<Option<Token>>;
}
