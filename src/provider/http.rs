use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use std::{env, fs};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::provider::{HeaderSourceValue, ProviderConfig};
use crate::provider::IdentityProvider;
use crate::token::Token;

/// HTTP identity provider: issues tokens from a configured endpoint.
#[derive(Debug)]
pub struct HttpProvider {
    cfg: ProviderConfig,
    client: Client,
    ready: AtomicBool,
}

impl HttpProvider {
    pub fn new(cfg: ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self { cfg, client, ready: AtomicBool::new(false) })
    }

    /// Flip readiness on once the provider endpoint is known reachable
    /// (the keeper marks it at startup).
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    async fn request_token(&self, bypass_cache: bool) -> Result<Option<Token>> {
        let mut request = self.client.request(self.cfg.method.clone(), &self.cfg.url);

        if bypass_cache {
            request = request.query(&[("skipCache", "true")]);
        }

        // Build headers dynamically
        if let Some(headers) = &self.cfg.headers {
            for (key, v) in headers {
                let value = resolve_header_value(v)?;
                request = request.header(key, value);
            }
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("HTTP request failed: {}", response.status()));
        }

        let body: Value = response.json().await?;
        let token_value = match body[&self.cfg.token_field].as_str() {
            Some(v) if !v.is_empty() => v.to_owned(),
            _ => {
                debug!("provider answered without field '{}'", self.cfg.token_field);
                return Ok(None);
            }
        };

        Ok(Some(Token::new(token_value)))
    }
}

#[async_trait]
impl IdentityProvider for HttpProvider {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn issue_token(&self, bypass_cache: bool) -> Result<Option<Token>> {
        self.request_token(bypass_cache).await
    }
}

fn resolve_header_value(value: &HeaderSourceValue) -> Result<String> {
    match value {
        HeaderSourceValue::Literal { value } => Ok(value.to_owned()),
        HeaderSourceValue::FromEnv { from_env } => env::var(from_env).map_err(|err| anyhow!(err)),
        HeaderSourceValue::FromFile { path } => fs::read_to_string(path)
            .map_err(|err| anyhow!(err))
            .map(|res| res.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::forge_jwt;
    use crate::utils::time::now_unix;
    use http::Method;
    use httpmock::prelude::*;
    use serde_json::json;
    use serial_test::serial;
    use std::collections::HashMap;

    fn provider_for(server: &MockServer, headers: Option<HashMap<String, HeaderSourceValue>>) -> HttpProvider {
        let cfg = ProviderConfig {
            url: server.url("/tokens"),
            method: Method::POST,
            headers,
            token_field: "jwt".to_owned(),
            timeout_ms: 2000,
        };
        let provider = HttpProvider::new(cfg).unwrap();
        provider.mark_ready();
        provider
    }

    #[tokio::test]
    async fn issues_token_and_bypasses_cache() {
        let server = MockServer::start_async().await;
        let jwt = forge_jwt(now_unix() + 3600);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/tokens")
                    .query_param("skipCache", "true");
                then.status(200).json_body(json!({ "jwt": jwt }));
            })
            .await;

        let provider = provider_for(&server, None);
        let token = provider.issue_token(true).await.unwrap().unwrap();
        assert_eq!(token.value(), jwt);
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn resolves_header_from_env() {
        let server = MockServer::start_async().await;
        let jwt = forge_jwt(now_unix() + 3600);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/tokens")
                    .header("Authorization", "Bearer sk_test_123");
                then.status(200).json_body(json!({ "jwt": jwt }));
            })
            .await;

        std::env::set_var("KEEPER_TEST_API_KEY", "Bearer sk_test_123");
        let mut headers = HashMap::new();
        headers.insert(
            "Authorization".to_owned(),
            HeaderSourceValue::FromEnv { from_env: "KEEPER_TEST_API_KEY".to_owned() },
        );

        let provider = provider_for(&server, Some(headers));
        assert!(provider.issue_token(false).await.unwrap().is_some());
        mock.assert_async().await;
        std::env::remove_var("KEEPER_TEST_API_KEY");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/tokens");
                then.status(503);
            })
            .await;

        let provider = provider_for(&server, None);
        assert!(provider.issue_token(true).await.is_err());
    }

    #[tokio::test]
    async fn missing_token_field_is_absent_not_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/tokens");
                then.status(200).json_body(json!({ "unrelated": 1 }));
            })
            .await;

        let provider = provider_for(&server, None);
        assert!(provider.issue_token(true).await.unwrap().is_none());
    }
}
