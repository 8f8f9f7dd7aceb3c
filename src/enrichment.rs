//! User aggregation: local records joined with provider data.
//!
//! 1. Validate create requests
//! 2. Read or write the record store
//! 3. Enrich every record through the tax and payments providers
//! 4. Return the merged view

use crate::db_storage::UserStore;
use crate::errors::{AppError, FieldErrors};
use crate::models::{CreateUserRequest, EnrichedUserView, NewUser, UserRecord, UsersResponse};
use crate::services::EnrichmentService;
use futures::future::join_all;
use regex::Regex;
use std::sync::{Arc, OnceLock};

// RFC 5322 simplified: local@domain, domain labels without a required TLD
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Syntactic email check. Says nothing about deliverability.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Checks a create request, returning the validated user or one message per
/// invalid field.
pub fn validate_create_request(request: &CreateUserRequest) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::new();

    if request.name.trim().is_empty() {
        errors.insert("name".to_string(), "name is required".to_string());
    }

    if request.email.trim().is_empty() {
        errors.insert("email".to_string(), "email is required".to_string());
    } else if !is_valid_email(&request.email) {
        errors.insert("email".to_string(), "email must be valid".to_string());
    }

    if request.cpf.trim().is_empty() {
        errors.insert("cpf".to_string(), "cpf is required".to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewUser {
        name: request.name.clone(),
        email: request.email.clone(),
        cpf: request.cpf.clone(),
    })
}

/// Orchestrates the record store and the enrichment service.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    enrichment: EnrichmentService,
    welcome_message: String,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        enrichment: EnrichmentService,
        welcome_message: impl Into<String>,
    ) -> Self {
        Self {
            store,
            enrichment,
            welcome_message: welcome_message.into(),
        }
    }

    /// Every stored user, enriched, in store order.
    pub async fn list_users(&self) -> Result<UsersResponse, AppError> {
        let records = self.store.find_all().await?;
        tracing::debug!("Enriching {} user(s)", records.len());

        // join_all keeps input order regardless of completion order
        let users = join_all(records.into_iter().map(|record| self.enrich_record(record))).await;

        Ok(UsersResponse {
            welcome_message: self.welcome_message.clone(),
            users,
        })
    }

    pub async fn create_user(
        &self,
        request: CreateUserRequest,
    ) -> Result<EnrichedUserView, AppError> {
        let new_user = validate_create_request(&request).map_err(AppError::Validation)?;
        let record = self.store.save(new_user).await?;

        Ok(self.enrich_record(record).await)
    }

    pub async fn get_user_by_cpf(&self, cpf: &str) -> Result<EnrichedUserView, AppError> {
        let record = self
            .store
            .find_by_cpf(cpf)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No user with cpf {}", cpf)))?;

        Ok(self.enrich_record(record).await)
    }

    async fn enrich_record(&self, record: UserRecord) -> EnrichedUserView {
        let enrichment = self.enrichment.enrich(&record.cpf).await;
        EnrichedUserView::new(record, enrichment)
    }
}
