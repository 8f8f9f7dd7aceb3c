use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

// ============ Stored Records ============

/// A locally stored user.
///
/// `cpf` is the natural key used for every external lookup.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct UserRecord {
    /// Identifier assigned by the store.
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[schema(example = "12345678900")]
    pub cpf: String,
}

/// A validated user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub cpf: String,
}

// ============ Request / Response DTOs ============

/// Body of `POST /users`.
///
/// Missing fields decode as empty strings so that validation, not the JSON
/// decoder, reports them.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "12345678900")]
    pub cpf: String,
}

/// Provider data attached to one user. Both sequences are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub tax_records: Vec<Value>,
    pub payment_records: Vec<Value>,
}

/// The outward-facing user: stored fields plus provider data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedUserView {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[schema(example = "12345678900")]
    pub cpf: String,
    /// Tax records reported by the tax provider.
    #[schema(value_type = Vec<serde_json::Value>)]
    pub tax_records: Vec<Value>,
    /// Payment records reported by the payments provider.
    #[schema(value_type = Vec<serde_json::Value>)]
    pub payment_records: Vec<Value>,
}

impl EnrichedUserView {
    pub fn new(record: UserRecord, enrichment: EnrichmentResult) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            cpf: record.cpf,
            tax_records: enrichment.tax_records,
            payment_records: enrichment.payment_records,
        }
    }
}

/// Body of `GET /users`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    #[schema(example = "Hello CKAD")]
    pub welcome_message: String,
    pub users: Vec<EnrichedUserView>,
}

/// Body of a `400` caused by invalid fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    #[schema(example = "Validation failed")]
    pub message: String,
    /// One message per invalid field.
    pub errors: std::collections::BTreeMap<String, String>,
}

/// Body of a `401` or other plain error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Unauthorized")]
    pub error: String,
}
