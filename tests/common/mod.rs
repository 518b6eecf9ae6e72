#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agape_proxy::core::fal::FalClient;
use agape_proxy::core::relay::ImageRelay;
use agape_proxy::settings::Config;
use agape_proxy::AppState;
use poem::listener::{Acceptor, Listener, TcpListener};
use poem::{Endpoint, Server};
use serde_json::Value;

pub const FAL_KEY: &str = "test-key";

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream<E>(app: E) -> String
where
    E: Endpoint + 'static,
{
    let acceptor = TcpListener::bind("127.0.0.1:0")
        .into_acceptor()
        .await
        .expect("bind mock upstream");
    let addr = *acceptor
        .local_addr()
        .first()
        .and_then(|addr| addr.as_socket_addr())
        .expect("mock upstream socket address");

    tokio::spawn(async move {
        let _ = Server::new_with_acceptor(acceptor).run(app).await;
    });

    format!("http://{addr}")
}

pub fn config() -> Config {
    Config {
        prefix: Some("/api".to_string()),
        fal_key: Some(FAL_KEY.to_string()),
        ..Config::default()
    }
}

pub fn app_state(
    fal_endpoint: &str,
    fal_key: Option<&str>,
    timeout: Duration,
    relay: ImageRelay,
) -> Arc<AppState> {
    let config = Config {
        fal_key: fal_key.map(str::to_string),
        fal_endpoint: fal_endpoint.to_string(),
        ..config()
    };
    Arc::new(AppState {
        fal: FalClient::new(fal_endpoint.to_string(), fal_key.map(str::to_string), timeout),
        relay,
        config,
    })
}

/// Relay that only trusts the local mock upstream.
pub fn local_relay(max_width: Option<u32>) -> ImageRelay {
    ImageRelay::new(vec!["127.0.0.1".to_string()], max_width).expect("build relay")
}

pub async fn body_json(resp: poem::test::TestResponse) -> Value {
    let body = resp.0.into_body().into_string().await.unwrap();
    serde_json::from_str(&body).unwrap()
}
