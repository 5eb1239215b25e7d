use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::keeper::TokenKeeper;
use crate::tests::common::{forge_jwt, ProviderStep, ScriptedProvider};
use crate::token::Token;
use crate::utils::time::now_unix;

const BUFFER: u64 = 300;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn start_populates_state_and_exposes_it() {
    let provider = Arc::new(ScriptedProvider::new(vec![ProviderStep::Issue(3600)]));
    let keeper = TokenKeeper::new(provider.clone(), BUFFER, 5);

    assert!(keeper.current_token().await.is_none());
    keeper.start().await;

    assert!(keeper.is_provider_ready().await);
    assert!(keeper.current_token().await.is_some());
    assert_eq!(provider.issued(), 1);

    keeper.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn force_refresh_replaces_the_held_token() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        ProviderStep::Issue(3600),
        ProviderStep::Issue(7200),
    ]));
    let keeper = TokenKeeper::new(provider.clone(), BUFFER, 5);
    keeper.start().await;

    let before = keeper.current_token().await.unwrap();
    keeper.force_refresh().await;
    let after = keeper.current_token().await.unwrap();

    assert_ne!(before, after);
    assert_eq!(provider.issued(), 2);

    keeper.shutdown().await;
}

// Backstop drift scenario: the held token slipped inside the buffer without
// any proactive timer firing (as after a system sleep).
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn backstop_renews_a_drifted_token() {
    let provider = Arc::new(ScriptedProvider::new(vec![ProviderStep::Issue(3600)]));
    let keeper = TokenKeeper::new(provider.clone(), BUFFER, 1);
    keeper.start().await;
    assert_eq!(provider.issued(), 1);

    // overwrite the held token with one already inside the buffer,
    // simulating the proactive timer having been missed
    keeper.fetcher().scheduler().cancel().await;
    keeper
        .fetcher()
        .store()
        .store(Token::new(forge_jwt(now_unix() + 60)))
        .await;

    sleep(Duration::from_millis(1500)).await;
    assert!(provider.issued() >= 2, "backstop must have refreshed");

    keeper.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn auth_pipeline_carries_the_kept_token() {
    use axum::routing::get;
    use axum::Router;
    use http::Method;

    use crate::intercept::{AuthClient, OutgoingCall};
    use crate::tests::common::spawn_axum;

    let provider = Arc::new(ScriptedProvider::new(vec![ProviderStep::Issue(3600)]));
    let keeper = TokenKeeper::new(provider, BUFFER, 5);
    keeper.start().await;

    let router = Router::new().route(
        "/echo",
        get(|headers: http::HeaderMap| async move {
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_owned()
        }),
    );
    let (server, addr) = spawn_axum(router).await;

    let client = AuthClient::new(reqwest::Client::new(), keeper.auth_pipeline());
    let response = client
        .execute(OutgoingCall::new(Method::GET, format!("http://{}/echo", addr)))
        .await
        .unwrap();

    let held = keeper.current_token().await.unwrap();
    assert_eq!(response.text().await.unwrap(), format!("Bearer {}", held.value()));

    server.abort();
    keeper.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_returns_to_the_unset_state() {
    let provider = Arc::new(ScriptedProvider::new(vec![ProviderStep::Issue(3600)]));
    let keeper = TokenKeeper::new(provider.clone(), BUFFER, 5);
    keeper.start().await;
    assert!(keeper.current_token().await.is_some());

    keeper.shutdown().await;

    assert!(keeper.current_token().await.is_none());
    assert!(!keeper.is_provider_ready().await);
    assert!(!keeper.fetcher().scheduler().has_pending().await);
}
