use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::token::Token;

/// Mutable lifecycle state behind the store: current token plus whether the
/// identity provider has finished initializing.
#[derive(Debug, Default)]
struct TokenState {
    current: Option<Token>,
    provider_ready: bool,
}

/// Single-writer holder for the bearer token.
///
/// Created once at startup and handed around in clones; the fetcher is the
/// only writer of `current`, everyone else reads. A stored token always
/// replaces the previous one, never merges with it.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<TokenState>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(TokenState::default())) }
    }

    pub async fn current_token(&self) -> Option<Token> {
        self.inner.read().await.current.clone()
    }

    pub async fn provider_ready(&self) -> bool {
        self.inner.read().await.provider_ready
    }

    pub async fn set_provider_ready(&self, ready: bool) {
        self.inner.write().await.provider_ready = ready;
    }

    /// Replace the held token with a freshly issued one.
    pub async fn store(&self, token: Token) {
        let mut state = self.inner.write().await;
        state.current = Some(token);
        debug!("token stored");
    }

    /// Teardown on sign-out or shutdown: back to the unset state.
    pub async fn clear(&self) {
        let mut state = self.inner.write().await;
        state.current = None;
        state.provider_ready = false;
    }
}
