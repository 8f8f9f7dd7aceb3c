use crate::enrichment::UserService;
use crate::errors::AppError;
use crate::models::{
    CreateUserRequest, EnrichedUserView, ErrorResponse, UsersResponse, ValidationErrorResponse,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store + enrichment orchestration.
    pub users: UserService,
    /// Secret expected in `X-API-KEY`; `None` rejects every gated request.
    pub api_key: Option<String>,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "user-registry-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /users
///
/// Lists every stored user with tax and payment records attached.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = UsersResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UsersResponse>, AppError> {
    tracing::info!("GET /users");

    let response = state.users.list_users().await?;
    tracing::info!("Returning {} user(s)", response.users.len());

    Ok(Json(response))
}

/// POST /users
///
/// Creates a user and returns it enriched.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = EnrichedUserView),
        (status = 400, description = "Invalid fields", body = ValidationErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EnrichedUserView>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::info!("POST /users");

    let user = state.users.create_user(request).await?;
    tracing::debug!("Created user {}", user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users/cpf/:cpf
///
/// Looks a user up by exact cpf.
#[utoipa::path(
    get,
    path = "/users/cpf/{cpf}",
    tag = "users",
    params(("cpf" = String, Path, description = "CPF of the user", example = "12345678900")),
    responses(
        (status = 200, description = "User found", body = EnrichedUserView),
        (status = 404, description = "No user with this cpf"),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
pub async fn get_user_by_cpf(
    State(state): State<Arc<AppState>>,
    Path(cpf): Path<String>,
) -> Result<Json<EnrichedUserView>, AppError> {
    tracing::info!("GET /users/cpf/:cpf");
    tracing::debug!("Looking up cpf {}", cpf);

    let user = state.users.get_user_by_cpf(&cpf).await?;

    Ok(Json(user))
}
