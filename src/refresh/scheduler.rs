use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::refresh::fetcher::{RefreshTrigger, TokenFetcher};
use crate::token::expiry::time_until_expiry;
use crate::token::Token;

/// One-shot proactive refresh timer.
///
/// Invariant: at most one pending timer exists. Arming always cancels the
/// previously armed handle before spawning the replacement; the timer task
/// vacates its own slot before invoking the fetcher so a re-arm from inside
/// the refresh cycle never aborts the task performing it.
#[derive(Debug)]
pub struct RefreshScheduler {
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
    buffer_seconds: u64,
}

impl RefreshScheduler {
    pub fn new(buffer_seconds: u64) -> Self {
        Self { pending: Arc::new(Mutex::new(None)), buffer_seconds }
    }

    pub fn buffer_seconds(&self) -> u64 {
        self.buffer_seconds
    }

    /// Arm the timer for `remaining lifetime - buffer`, clamped to zero.
    /// A clamped-to-zero delay fires the refresh immediately instead of
    /// waiting. The timer's only effect is invoking the fetcher.
    pub async fn arm(&self, token: &Token, fetcher: Arc<TokenFetcher>) {
        let remaining = time_until_expiry(token);
        let delay_ms = (remaining - self.buffer_seconds as i64 * 1000).max(0) as u64;

        let pending = Arc::clone(&self.pending);
        let mut slot = self.pending.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
            debug!("previous refresh timer cancelled");
        }

        info!("refresh scheduled in {} ms", delay_ms);
        *slot = Some(tokio::spawn(async move {
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            // the shift is over before the refresh starts
            {
                let mut slot = pending.lock().await;
                *slot = None;
            }
            fetcher.refresh(RefreshTrigger::Scheduled).await;
        }));
    }

    /// Teardown: drop any pending timer.
    pub async fn cancel(&self) {
        let mut slot = self.pending.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
        }
    }

    #[cfg(test)]
    pub async fn has_pending(&self) -> bool {
        self.pending.lock().await.is_some()
    }
}
