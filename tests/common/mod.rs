//! Shared helpers for integration tests

use fittrack::config::RemoteConfig;
use fittrack::remote::{BackoffConfig, QueryExecutor, RemoteClient};
use std::sync::{Arc, Once};
use std::time::Duration;
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Install the test log subscriber once; `RUST_LOG=fittrack=debug` shows
/// attempt-by-attempt executor output
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Executor wired to a mock server with millisecond backoff so retry
/// sequences finish quickly
pub fn executor_for(server: &MockServer) -> Arc<QueryExecutor> {
    init_tracing();
    executor_for_url(&server.uri())
}

/// Executor wired to an arbitrary base URL
pub fn executor_for_url(base_url: &str) -> Arc<QueryExecutor> {
    let config = RemoteConfig::builder()
        .base_url(base_url)
        .api_key("test-key")
        .request_timeout(Duration::from_secs(2))
        .build()
        .expect("test config is valid");
    let client = RemoteClient::new(config).expect("client builds");
    Arc::new(QueryExecutor::new(client).with_backoff(BackoffConfig {
        base: Duration::from_millis(2),
        cap: Duration::from_millis(8),
    }))
}

/// Count requests the server received for a given path
pub async fn requests_for_path(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path() == path)
        .count()
}

/// A meal row as the backend would return it
pub fn meal_row(user_id: &str, name: &str, calories: f64) -> serde_json::Value {
    serde_json::json!({
        "id": uuid::Uuid::new_v4(),
        "user_id": user_id,
        "name": name,
        "meal_type": "lunch",
        "calories": calories,
        "protein_g": 20.0,
        "carbs_g": 45.0,
        "fat_g": 10.0,
        "eaten_on": "2025-03-14",
        "created_at": "2025-03-14T12:15:00Z"
    })
}
