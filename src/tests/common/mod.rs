// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tokio::sync::Mutex;

use crate::provider::IdentityProvider;
use crate::token::Token;
use crate::utils::time::now_unix;

/// Minimal unsigned JWT with the given absolute expiry (UNIX seconds).
pub fn forge_jwt(exp: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{},"iat":{}}}"#, exp, now_unix()));
    format!("{}.{}.sig", header, payload)
}

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// One scripted provider answer.
#[derive(Debug, Clone)]
pub enum ProviderStep {
    /// Issue a token living this many seconds from now.
    Issue(u64),
    /// Answer without a token.
    Absent,
    /// Fail the call outright.
    Fail,
}

/// Identity provider whose answers follow a script; once the script runs
/// out it keeps issuing hour-long tokens. Counts every outbound call so
/// tests can assert on deduplication.
pub struct ScriptedProvider {
    ready: AtomicBool,
    delay: Duration,
    calls: AtomicUsize,
    script: Mutex<VecDeque<ProviderStep>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<ProviderStep>) -> Self {
        Self {
            ready: AtomicBool::new(true),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            script: Mutex::new(steps.into()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Number of issue_token calls actually made.
    pub fn issued(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn issue_token(&self, _bypass_cache: bool) -> Result<Option<Token>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let step = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or(ProviderStep::Issue(3600));
        match step {
            ProviderStep::Issue(ttl) => Ok(Some(Token::new(forge_jwt(now_unix() + ttl)))),
            ProviderStep::Absent => Ok(None),
            ProviderStep::Fail => Err(anyhow!("provider unreachable")),
        }
    }
}
