use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::{HeaderValue, StatusCode};
use tracing::{debug, info};

use crate::intercept::pipeline::{OutgoingCall, PostResponseStage, PreSendStage, Verdict};
use crate::observability::metrics::get_metrics;
use crate::refresh::fetcher::{RefreshTrigger, TokenFetcher};
use crate::token::expiry::due_for_renewal;

/// Bearer-token stage for both pipeline hook points.
///
/// The header is always built from the latest store value at call time,
/// never from a snapshot captured when the call was created.
pub struct BearerAuthStage {
    fetcher: Arc<TokenFetcher>,
}

impl BearerAuthStage {
    pub fn new(fetcher: Arc<TokenFetcher>) -> Self {
        Self { fetcher }
    }

    async fn attach_current_token(&self, call: &mut OutgoingCall) -> Result<()> {
        match self.fetcher.store().current_token().await {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token.value()))?;
                call.headers.insert(AUTHORIZATION, value);
            }
            None => {
                call.headers.remove(AUTHORIZATION);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PreSendStage for BearerAuthStage {
    async fn before_send(&self, call: &mut OutgoingCall) -> Result<()> {
        let metrics = get_metrics().await;
        metrics.requests_intercepted.inc();

        let token = match self.fetcher.store().current_token().await {
            Some(token) => token,
            // pre-auth call: pass through unmodified, the downstream
            // rejection is the expected outcome
            None => {
                debug!("no token held, call passes through unmodified");
                return Ok(());
            }
        };

        // a token known to be inside the buffer is never sent as-is
        if due_for_renewal(&token, self.fetcher.buffer_seconds()) {
            info!("token due for renewal, refreshing before send");
            metrics.preemptive_refreshes.inc();
            Arc::clone(&self.fetcher).refresh(RefreshTrigger::PreSend).await;
        }

        self.attach_current_token(call).await
    }
}

#[async_trait]
impl PostResponseStage for BearerAuthStage {
    async fn after_response(&self, call: &mut OutgoingCall, status: StatusCode) -> Result<Verdict> {
        if status != StatusCode::UNAUTHORIZED || call.retried() {
            return Ok(Verdict::Surface);
        }

        call.mark_retried();
        info!("authorization rejected, refreshing and retrying once");
        get_metrics().await.auth_retries.inc();

        Arc::clone(&self.fetcher).refresh(RefreshTrigger::AuthRejected).await;
        self.attach_current_token(call).await?;
        Ok(Verdict::Resubmit)
    }
}
