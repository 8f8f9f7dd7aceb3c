/// Per-IP rate limiting applied around the full router
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use user_registry_api::config::Config;
use user_registry_api::db_storage::InMemoryUserStore;
use user_registry_api::enrichment::UserService;
use user_registry_api::handlers::AppState;
use user_registry_api::routes::{build_router, with_rate_limit};
use user_registry_api::services::EnrichmentService;

const API_KEY: &str = "test-key";

fn create_limited_app(per_second: u64, burst: u32) -> Router {
    let config = Config {
        api_key: Some(API_KEY.to_string()),
        ..Config::default()
    };
    let enrichment = EnrichmentService::from_config(&config).unwrap();
    let state = Arc::new(AppState {
        users: UserService::new(
            Arc::new(InMemoryUserStore::new()),
            enrichment,
            config.welcome_message.clone(),
        ),
        api_key: config.api_key.clone(),
    });
    with_rate_limit(build_router(state), per_second, burst).unwrap()
}

async fn health_status(app: &Router, client_ip: &str) -> StatusCode {
    let request = Request::builder()
        .uri("/health")
        .header("X-API-KEY", API_KEY)
        .header("X-Forwarded-For", client_ip)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap().status()
}

/// Sends requests until one is limited, returning how many got through.
async fn drain_burst(app: &Router, client_ip: &str, max: usize) -> usize {
    for sent in 0..max {
        if health_status(app, client_ip).await == StatusCode::TOO_MANY_REQUESTS {
            return sent;
        }
    }
    panic!("no request was rate limited after {} attempts", max);
}

#[tokio::test]
async fn test_burst_is_limited() {
    let app = create_limited_app(10, 20);

    let allowed = drain_burst(&app, "203.0.113.7", 60).await;
    assert!(allowed >= 20, "only {} request(s) allowed", allowed);
}

#[tokio::test]
async fn test_rate_is_replenished_every_second() {
    let app = create_limited_app(10, 20);
    drain_burst(&app, "203.0.113.7", 60).await;

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let mut allowed = 0;
    for _ in 0..10 {
        if health_status(&app, "203.0.113.7").await == StatusCode::OK {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 10);
}

#[tokio::test]
async fn test_clients_are_limited_independently() {
    let app = create_limited_app(1, 2);
    drain_burst(&app, "203.0.113.7", 10).await;

    assert_eq!(health_status(&app, "198.51.100.4").await, StatusCode::OK);
}

#[test]
fn test_zero_burst_is_rejected() {
    assert!(with_rate_limit(Router::new(), 10, 0).is_err());
}
