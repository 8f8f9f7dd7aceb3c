use serde::Deserialize;
use std::time::Duration;

/// Default greeting returned alongside the user listing.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hello CKAD";

/// Connection settings for one external provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl ProviderConfig {
    pub fn new(enabled: bool, base_url: impl Into<String>) -> Self {
        Self {
            enabled,
            base_url: base_url.into(),
        }
    }

    /// A provider is only called when it is switched on and has a non-blank URL.
    pub fn is_reachable(&self) -> bool {
        self.enabled && !self.base_url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Secret expected in `X-API-KEY`. `None` rejects every gated request.
    pub api_key: Option<String>,
    pub welcome_message: String,
    pub tax_api: ProviderConfig,
    pub payments_api: ProviderConfig,
    pub provider_timeout_ms: u64,
    /// Requests replenished per client IP each second.
    pub rate_limit_per_second: u64,
    /// Requests a client IP may send back to back before being limited.
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            api_key: None,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            tax_api: ProviderConfig::default(),
            payments_api: ProviderConfig::default(),
            provider_timeout_ms: 5_000,
            rate_limit_per_second: 10,
            rate_limit_burst: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            port: match lookup("PORT") {
                Some(port) => port.trim().parse().map_err(|_| {
                    anyhow::anyhow!("PORT must be a valid number between 1-65535")
                })?,
                None => defaults.port,
            },
            database_url: lookup("DATABASE_URL")
                .or_else(|| lookup("DB_URL"))
                .filter(|url| !url.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })
                .transpose()?,
            api_key: lookup("API_KEY").filter(|key| !key.trim().is_empty()),
            welcome_message: lookup("WELCOME_MESSAGE").unwrap_or(defaults.welcome_message),
            tax_api: ProviderConfig {
                enabled: parse_flag("TAX_API_ENABLED", lookup("TAX_API_ENABLED"))?,
                base_url: lookup("TAX_API_URL").unwrap_or_default(),
            },
            payments_api: ProviderConfig {
                enabled: parse_flag("PAYMENTS_API_ENABLED", lookup("PAYMENTS_API_ENABLED"))?,
                base_url: lookup("PAYMENTS_API_URL").unwrap_or_default(),
            },
            provider_timeout_ms: match lookup("PROVIDER_TIMEOUT_MS") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .ok()
                    .filter(|ms: &u64| *ms > 0)
                    .ok_or_else(|| {
                        anyhow::anyhow!("PROVIDER_TIMEOUT_MS must be a positive number")
                    })?,
                None => defaults.provider_timeout_ms,
            },
            rate_limit_per_second: match lookup("RATE_LIMIT_PER_SECOND") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .ok()
                    .filter(|rate: &u64| *rate > 0)
                    .ok_or_else(|| {
                        anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a positive number")
                    })?,
                None => defaults.rate_limit_per_second,
            },
            rate_limit_burst: match lookup("RATE_LIMIT_BURST") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a valid number"))?,
                None => defaults.rate_limit_burst,
            },
        };

        // Log what was loaded without sensitive values
        tracing::debug!("Server Port: {}", config.port);
        match config.database_url {
            Some(ref url) => tracing::debug!("Database host: {}", url.rsplit('@').next().unwrap_or("")),
            None => tracing::info!("DATABASE_URL not set, using in-memory user store"),
        }
        config.log_provider("tax", "TAX_API_URL", &config.tax_api);
        config.log_provider("payments", "PAYMENTS_API_URL", &config.payments_api);

        Ok(config)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }

    fn log_provider(&self, name: &str, var: &str, provider: &ProviderConfig) {
        if !provider.is_reachable() {
            tracing::info!("{} provider disabled", name);
            return;
        }
        if let Err(e) = url::Url::parse(provider.base_url.trim()) {
            tracing::warn!(
                "{} provider enabled but {} does not parse ({}); calls will return no data",
                name,
                var,
                e
            );
        } else {
            tracing::info!("{} provider enabled: {}", name, provider.base_url);
        }
    }
}

fn parse_flag(var: &str, raw: Option<String>) -> anyhow::Result<bool> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "off" => Ok(false),
        "true" | "1" | "yes" | "on" => Ok(true),
        other => anyhow::bail!("{} must be true or false, got '{}'", var, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, None);
        assert_eq!(config.api_key, None);
        assert_eq!(config.welcome_message, "Hello CKAD");
        assert!(!config.tax_api.enabled);
        assert_eq!(config.tax_api.base_url, "");
        assert!(!config.payments_api.is_reachable());
        assert_eq!(config.provider_timeout(), Duration::from_secs(5));
        assert_eq!(config.rate_limit_per_second, 10);
        assert_eq!(config.rate_limit_burst, 20);
    }

    #[test]
    fn test_providers_and_welcome_message() {
        let config = config_from(&[
            ("TAX_API_ENABLED", "TRUE"),
            ("TAX_API_URL", "http://tax.local/impostos"),
            ("PAYMENTS_API_ENABLED", "yes"),
            ("PAYMENTS_API_URL", "http://pay.local/list?v=2"),
            ("WELCOME_MESSAGE", "Bem-vindo"),
            ("API_KEY", "s3cret"),
        ])
        .unwrap();

        assert!(config.tax_api.is_reachable());
        assert_eq!(config.payments_api.base_url, "http://pay.local/list?v=2");
        assert!(config.payments_api.is_reachable());
        assert_eq!(config.welcome_message, "Bem-vindo");
        assert_eq!(config.api_key.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_enabled_with_blank_url_is_unreachable() {
        let config = config_from(&[("TAX_API_ENABLED", "true"), ("TAX_API_URL", "   ")]).unwrap();
        assert!(config.tax_api.enabled);
        assert!(!config.tax_api.is_reachable());
    }

    #[test]
    fn test_blank_api_key_counts_as_unset() {
        let config = config_from(&[("API_KEY", "  ")]).unwrap();
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
        assert!(config_from(&[("TAX_API_ENABLED", "maybe")]).is_err());
        assert!(config_from(&[("PROVIDER_TIMEOUT_MS", "0")]).is_err());
        assert!(config_from(&[("RATE_LIMIT_PER_SECOND", "0")]).is_err());
        assert!(config_from(&[("DATABASE_URL", "mysql://localhost/db")]).is_err());
    }

    #[test]
    fn test_database_url_fallback_and_blank() {
        let config = config_from(&[("DB_URL", "postgres://u:p@localhost/users")]).unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://u:p@localhost/users")
        );

        let config = config_from(&[("DATABASE_URL", "")]).unwrap();
        assert_eq!(config.database_url, None);
    }
}
