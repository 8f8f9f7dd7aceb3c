use crate::auth::API_KEY_HEADER;
use crate::handlers;
use crate::models::{
    CreateUserRequest, EnrichedUserView, ErrorResponse, UserRecord, UsersResponse,
    ValidationErrorResponse,
};
use axum::{http::StatusCode, response::IntoResponse, Json};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/v3/api-docs";

/// Path of the Swagger UI page.
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";
pub const SWAGGER_UI_INDEX_PATH: &str = "/swagger-ui/index.html";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Service API",
        version = "v1",
        description = "REST service for user management."
    ),
    paths(
        handlers::list_users,
        handlers::create_user,
        handlers::get_user_by_cpf
    ),
    components(schemas(
        UserRecord,
        CreateUserRequest,
        EnrichedUserView,
        UsersResponse,
        ValidationErrorResponse,
        ErrorResponse
    )),
    modifiers(&SecurityAddon),
    tags((name = "users", description = "User management endpoints"))
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
            );
        }
    }
}

/// Serves the generated OpenAPI document as JSON.
pub async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serves a Swagger UI page pointed at [`OPENAPI_PATH`].
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = format!(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>User Service API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body {{ margin: 0; padding: 0; }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {{
            window.ui = SwaggerUIBundle({{
                url: "{openapi_path}",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            }});
        }};
    </script>
</body>
</html>
"#,
        openapi_path = OPENAPI_PATH
    );

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}
