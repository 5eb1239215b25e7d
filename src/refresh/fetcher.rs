use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::observability::metrics::get_metrics;
use crate::provider::IdentityProvider;
use crate::refresh::scheduler::RefreshScheduler;
use crate::store::TokenStore;
use crate::token::claims::decode_claims;

/// What caused a refresh cycle, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Initial,
    Scheduled,
    PreSend,
    Backstop,
    AuthRejected,
    Forced,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &'static str {
        match *self {
            RefreshTrigger::Initial => "initial",
            RefreshTrigger::Scheduled => "scheduled",
            RefreshTrigger::PreSend => "pre_send",
            RefreshTrigger::Backstop => "backstop",
            RefreshTrigger::AuthRejected => "auth_rejected",
            RefreshTrigger::Forced => "forced",
        }
    }
}

/// Performs refresh cycles against the identity provider.
///
/// Exactly one fetch is in flight at any time (the latch); every other
/// trigger arriving meanwhile is an idempotent skip. The fetcher is the sole
/// writer of the store's token.
pub struct TokenFetcher {
    provider: Arc<dyn IdentityProvider>,
    store: TokenStore,
    scheduler: RefreshScheduler,
    in_flight: AtomicBool,
}

impl TokenFetcher {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: TokenStore, buffer_seconds: u64) -> Arc<Self> {
        Arc::new(Self {
            provider,
            store,
            scheduler: RefreshScheduler::new(buffer_seconds),
            in_flight: AtomicBool::new(false),
        })
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn buffer_seconds(&self) -> u64 {
        self.scheduler.buffer_seconds()
    }

    /// One refresh cycle. Never returns an error: every failure mode is
    /// logged and leaves the previously held token untouched.
    ///
    /// Returns a boxed future because the cycle re-arms the scheduler, whose
    /// timer task calls back into `refresh` — recursive async needs boxing.
    pub fn refresh(
        self: Arc<Self>,
        trigger: RefreshTrigger,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        Box::pin(async move {
        let metrics = get_metrics().await;

        let ready = self.provider.is_ready();
        self.store.set_provider_ready(ready).await;
        if !ready {
            debug!("provider not ready, refresh skipped ({})", trigger.as_str());
            metrics.refresh_skipped.with_label_values(&["not_ready"]).inc();
            return;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("refresh already in flight, skipped ({})", trigger.as_str());
            metrics.refresh_skipped.with_label_values(&["in_flight"]).inc();
            return;
        }

        metrics.refresh_attempts.with_label_values(&[trigger.as_str()]).inc();
        let start = Instant::now();

        let result = self.provider.issue_token(true).await;

        // the latch is cleared no matter how the cycle ended, so future
        // triggers always make progress
        self.in_flight.store(false, Ordering::SeqCst);
        metrics
            .refresh_duration
            .with_label_values(&[trigger.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(Some(token)) => {
                if let Ok(claims) = decode_claims(token.value()) {
                    metrics.token_expiry_unix.set(claims.exp as i64);
                }
                metrics.token_held.set(1);
                self.store.store(token.clone()).await;
                info!("token refreshed ({})", trigger.as_str());
                self.scheduler.arm(&token, Arc::clone(&self)).await;
            }
            Ok(None) => {
                warn!("provider returned no token, keeping previous state ({})", trigger.as_str());
                metrics.refresh_failures.with_label_values(&["absent"]).inc();
            }
            Err(e) => {
                warn!("error fetching token: {} ({})", e, trigger.as_str());
                metrics.refresh_failures.with_label_values(&["error"]).inc();
            }
        }
        })
    }
}
