use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

use crate::intercept::{BearerAuthStage, InterceptPipeline};
use crate::observability::metrics::get_metrics;
use crate::provider::IdentityProvider;
use crate::refresh::fetcher::{RefreshTrigger, TokenFetcher};
use crate::refresh::health;
use crate::store::TokenStore;
use crate::token::Token;

/// Facade over the whole token lifecycle: store, fetcher, proactive
/// scheduler and periodic backstop. One keeper lives for the whole session,
/// from `start` to `shutdown`.
pub struct TokenKeeper {
    fetcher: Arc<TokenFetcher>,
    check_interval_seconds: u64,
    backstop: Mutex<Option<JoinHandle<()>>>,
}

impl TokenKeeper {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        buffer_seconds: u64,
        check_interval_seconds: u64,
    ) -> Self {
        let store = TokenStore::new();
        let fetcher = TokenFetcher::new(provider, store, buffer_seconds);
        Self {
            fetcher,
            check_interval_seconds,
            backstop: Mutex::new(None),
        }
    }

    /// Initial fetch plus the periodic backstop. Idempotent against an
    /// already-running backstop.
    pub async fn start(&self) {
        Arc::clone(&self.fetcher).refresh(RefreshTrigger::Initial).await;

        let mut slot = self.backstop.lock().await;
        if slot.is_none() {
            *slot = Some(health::spawn_backstop(
                Arc::clone(&self.fetcher),
                self.check_interval_seconds,
            ));
        }
        get_metrics().await.up.set(1);
        info!("token keeper started");
    }

    pub async fn current_token(&self) -> Option<Token> {
        self.fetcher.store().current_token().await
    }

    pub async fn is_provider_ready(&self) -> bool {
        self.fetcher.store().provider_ready().await
    }

    /// Renewal on demand; concurrent calls collapse into one cycle.
    pub async fn force_refresh(&self) {
        Arc::clone(&self.fetcher).refresh(RefreshTrigger::Forced).await;
    }

    /// Pipeline with the bearer stage registered at both hook points.
    pub fn auth_pipeline(&self) -> InterceptPipeline {
        let stage = Arc::new(BearerAuthStage::new(Arc::clone(&self.fetcher)));
        InterceptPipeline::new()
            .with_pre_send(stage.clone())
            .with_post_response(stage)
    }

    pub fn fetcher(&self) -> &Arc<TokenFetcher> {
        &self.fetcher
    }

    /// Teardown on sign-out or shutdown: no pending timer, no backstop,
    /// state back to unset.
    pub async fn shutdown(&self) {
        let mut slot = self.backstop.lock().await;
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        self.fetcher.scheduler().cancel().await;
        self.fetcher.store().clear().await;
        get_metrics().await.up.set(0);
        get_metrics().await.token_held.set(0);
        info!("token keeper stopped");
    }
}
