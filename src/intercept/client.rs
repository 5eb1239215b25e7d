use anyhow::Result;
use reqwest::{Client, Response};
use tracing::debug;

use crate::intercept::pipeline::{InterceptPipeline, OutgoingCall, Verdict};

/// Transport wrapper running every call through the intercept pipeline.
///
/// A non-success response is not an error at this layer: unless a post
/// stage votes to resubmit, it is handed back to the caller unchanged. The
/// per-call retried marker bounds the loop to at most one resubmission.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    pipeline: InterceptPipeline,
}

impl AuthClient {
    pub fn new(client: Client, pipeline: InterceptPipeline) -> Self {
        Self { client, pipeline }
    }

    pub async fn execute(&self, mut call: OutgoingCall) -> Result<Response> {
        loop {
            self.pipeline.run_pre(&mut call).await?;

            let mut request = self
                .client
                .request(call.method.clone(), &call.url)
                .headers(call.headers.clone());
            if let Some(body) = &call.body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            match self.pipeline.run_post(&mut call, status).await? {
                Verdict::Resubmit => {
                    debug!("resubmitting {} {}", call.method, call.url);
                    continue;
                }
                Verdict::Surface => return Ok(response),
            }
        }
    }
}
