use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::refresh::fetcher::{RefreshTrigger, TokenFetcher};
use crate::token::expiry::due_for_renewal;

/// Low-frequency backstop against missed proactive timers (system sleep,
/// suspended execution). The fetcher's in-flight latch deduplicates it
/// against an overlapping scheduled refresh.
pub fn spawn_backstop(fetcher: Arc<TokenFetcher>, check_interval_seconds: u64) -> JoinHandle<()> {
    let buffer_seconds = fetcher.buffer_seconds();
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(check_interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let token = match fetcher.store().current_token().await {
                Some(token) => token,
                None => continue,
            };
            if due_for_renewal(&token, buffer_seconds) {
                info!("held token inside renewal buffer, backstop refresh");
                Arc::clone(&fetcher).refresh(RefreshTrigger::Backstop).await;
            }
        }
    })
}
