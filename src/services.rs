use crate::config::{Config, ProviderConfig};
use crate::errors::AppError;
use crate::models::EnrichmentResult;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Builds the HTTP client shared by every provider.
///
/// The timeout bounds the whole exchange (connect, headers and body), so an
/// unresponsive provider can't stall the enclosing request.
pub fn build_http_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {}", e)))
}

/// One optional external HTTP data source keyed by cpf.
#[derive(Debug, Clone)]
pub struct ExternalProvider {
    name: &'static str,
    config: ProviderConfig,
    client: Client,
}

impl ExternalProvider {
    pub fn new(name: &'static str, config: ProviderConfig, client: Client) -> Self {
        Self {
            name,
            config,
            client,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fetch the records this provider holds for `cpf`.
    ///
    /// Never fails: a disabled provider, a transport error, a non-2xx status or
    /// an unparseable body all come back as an empty list.
    pub async fn fetch(&self, cpf: &str) -> Vec<Value> {
        if !self.config.is_reachable() {
            tracing::debug!("{} provider disabled, skipping lookup", self.name);
            return Vec::new();
        }

        match self.try_fetch(cpf).await {
            Ok(records) => {
                tracing::debug!("{} provider returned {} record(s)", self.name, records.len());
                records
            }
            Err(e) => {
                tracing::warn!("Failed to fetch {} records: {}", self.name, e);
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, cpf: &str) -> Result<Vec<Value>, AppError> {
        let url = append_cpf_param(self.config.base_url.trim(), cpf);
        tracing::debug!("Fetching {} records: {}", self.name, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::ExternalApiError(format!("{} request failed: {}", self.name, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalApiError(format!(
                "{} returned status {}",
                self.name, status
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to read {} response: {}", self.name, e))
        })?;

        parse_payload(&body).map_err(|e| {
            AppError::ExternalApiError(format!("{} returned invalid JSON: {}", self.name, e))
        })
    }
}

/// Appends the cpf as a query parameter, respecting an existing query string.
///
/// The key is appended verbatim; callers only pass digit strings.
pub fn append_cpf_param(base_url: &str, cpf: &str) -> String {
    if base_url.contains('?') {
        format!("{}&cpf={}", base_url, cpf)
    } else {
        format!("{}?cpf={}", base_url, cpf)
    }
}

/// Coerces a provider body into a list of records.
///
/// Blank bodies and invalid JSON yield an empty list.
pub fn normalize_payload(body: &str) -> Vec<Value> {
    parse_payload(body).unwrap_or_default()
}

fn parse_payload(body: &str) -> Result<Vec<Value>, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => Ok(items),
        single => Ok(vec![single]),
    }
}

/// Fans out to the tax and payments providers for one subject.
#[derive(Debug, Clone)]
pub struct EnrichmentService {
    tax: ExternalProvider,
    payments: ExternalProvider,
}

impl EnrichmentService {
    pub fn new(tax: ExternalProvider, payments: ExternalProvider) -> Self {
        Self { tax, payments }
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = build_http_client(config.provider_timeout())?;

        Ok(Self::new(
            ExternalProvider::new("tax", config.tax_api.clone(), client.clone()),
            ExternalProvider::new("payments", config.payments_api.clone(), client),
        ))
    }

    /// Both lookups run concurrently; neither can fail the other.
    pub async fn enrich(&self, cpf: &str) -> EnrichmentResult {
        let (tax_records, payment_records) =
            tokio::join!(self.tax.fetch(cpf), self.payments.fetch(cpf));

        EnrichmentResult {
            tax_records,
            payment_records,
        }
    }
}
