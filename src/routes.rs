use crate::auth;
use crate::docs::{self, OPENAPI_PATH, SWAGGER_UI_INDEX_PATH, SWAGGER_UI_PATH};
use crate::handlers::{self, AppState};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Request size limit: 1MB is far above any valid create request.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the full router: user endpoints, docs, API-key gate and HTTP layers.
///
/// Rate limiting is added separately by [`with_rate_limit`].
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/users/cpf/:cpf", get(handlers::get_user_by_cpf))
        .route(SWAGGER_UI_PATH, get(docs::serve_swagger_ui))
        .route(SWAGGER_UI_INDEX_PATH, get(docs::serve_swagger_ui))
        .route(OPENAPI_PATH, get(docs::serve_openapi_spec))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Wraps the router in per-IP rate limiting.
///
/// Each client gets `per_second` requests back every second, holding at most
/// `burst` in reserve. The client IP comes from `X-Forwarded-For`/`X-Real-IP`
/// and falls back to the peer address.
pub fn with_rate_limit(router: Router, per_second: u64, burst: u32) -> anyhow::Result<Router> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval_ms(per_second))
        .burst_size(burst)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .ok_or_else(|| {
            anyhow::anyhow!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be non-zero")
        })?;

    Ok(router.layer(GovernorLayer {
        config: Arc::new(governor_conf),
    }))
}

/// Milliseconds between two replenished requests at `per_second` requests per second.
pub fn replenish_interval_ms(per_second: u64) -> u64 {
    (1000 / per_second.max(1)).max(1)
}
