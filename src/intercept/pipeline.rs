use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;

/// A single outgoing call moving through the pipeline. Carries a mutable
/// header map and the per-call "already retried" marker.
#[derive(Debug, Clone)]
pub struct OutgoingCall {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    retried: bool,
}

impl OutgoingCall {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn retried(&self) -> bool {
        self.retried
    }

    pub fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// What a post-response stage decided about a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the response back to the caller unchanged.
    Surface,
    /// Resubmit the call once more.
    Resubmit,
}

/// Stage run before a call leaves the transport.
#[async_trait]
pub trait PreSendStage: Send + Sync {
    async fn before_send(&self, call: &mut OutgoingCall) -> Result<()>;
}

/// Stage run after a call came back with a non-success status.
#[async_trait]
pub trait PostResponseStage: Send + Sync {
    async fn after_response(&self, call: &mut OutgoingCall, status: StatusCode) -> Result<Verdict>;
}

/// Pluggable pre-send / post-response stage lists any transport
/// implementation registers into. Decoupled from the HTTP client.
#[derive(Clone, Default)]
pub struct InterceptPipeline {
    pre: Vec<Arc<dyn PreSendStage>>,
    post: Vec<Arc<dyn PostResponseStage>>,
}

impl InterceptPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pre_send(mut self, stage: Arc<dyn PreSendStage>) -> Self {
        self.pre.push(stage);
        self
    }

    pub fn with_post_response(mut self, stage: Arc<dyn PostResponseStage>) -> Self {
        self.post.push(stage);
        self
    }

    pub async fn run_pre(&self, call: &mut OutgoingCall) -> Result<()> {
        for stage in &self.pre {
            stage.before_send(call).await?;
        }
        Ok(())
    }

    /// Runs every post stage; one `Resubmit` vote is enough to resubmit.
    pub async fn run_post(&self, call: &mut OutgoingCall, status: StatusCode) -> Result<Verdict> {
        let mut verdict = Verdict::Surface;
        for stage in &self.post {
            if stage.after_response(call, status).await? == Verdict::Resubmit {
                verdict = Verdict::Resubmit;
            }
        }
        Ok(verdict)
    }
}
