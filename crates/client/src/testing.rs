//! Helpers for tests that talk to an in-process API.

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ClientConfig;

/// Serve `router` on an ephemeral port and return a config pointing at it.
///
/// Routes are expected under the `/api` prefix.
pub async fn serve(router: Router) -> ClientConfig {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    ClientConfig::with_api_base_url(&format!("http://{addr}/api")).expect("test base URL")
}

/// A config whose API port has nothing listening on it.
pub async fn unreachable_config() -> ClientConfig {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    ClientConfig::with_api_base_url(&format!("http://{addr}/api")).expect("test base URL")
}
