use crate::domain::repositories::tracker_gateway::TrackerQuery;
use crate::domain::services::cost_fetcher::DEFAULT_COST_CONCURRENCY;
use crate::domain::services::hierarchy_walker::DEFAULT_MAX_ACCOUNTS;
use crate::secrets::secret_from;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Runtime configuration of the reconciliation service
#[derive(Clone)]
pub struct ReportConfig {
    pub bind_addr: String,
    pub database_url: String,

    // Google OAuth client and Ads API access
    pub google_client_id: String,
    pub google_client_secret: Zeroizing<String>,
    pub google_developer_token: Zeroizing<String>,
    pub login_customer_id: String, // Root MCC, also sent as login-customer-id
    pub ads_api_version: String,
    pub google_account_email: Option<String>, // Account used by the combined report
    pub backend_redirect_uri: String,
    pub frontend_redirect_uri: String,
    pub frontend_url: String,

    // Tracker
    pub binom_api_url: String,
    pub binom_api_key: Zeroizing<String>,
    pub traffic_source_ids: Vec<String>,
    pub default_timezone: String,
    pub default_date_type: String,

    // Limits
    pub max_accounts: usize,
    pub cost_fetch_concurrency: usize,
    pub http_timeout_seconds: u64,

    pub api_keys: Vec<Zeroizing<String>>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            bind_addr: "127.0.0.1:8000".to_string(),
            database_url: "sqlite://data/adrecon.db".to_string(),
            google_client_id: String::new(),
            google_client_secret: Zeroizing::new(String::new()),
            google_developer_token: Zeroizing::new(String::new()),
            login_customer_id: String::new(),
            ads_api_version: "v18".to_string(),
            google_account_email: None,
            backend_redirect_uri: String::new(),
            frontend_redirect_uri: String::new(),
            frontend_url: "http://localhost:3000".to_string(),
            binom_api_url: String::new(),
            binom_api_key: Zeroizing::new(String::new()),
            traffic_source_ids: vec!["1".to_string(), "6".to_string()],
            default_timezone: "America/Atikokan".to_string(),
            default_date_type: "custom-time".to_string(),
            max_accounts: DEFAULT_MAX_ACCOUNTS,
            cost_fetch_concurrency: DEFAULT_COST_CONCURRENCY,
            http_timeout_seconds: 30,
            api_keys: Vec::new(),
        }
    }
}

impl ReportConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ReportConfig {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable source, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> ReportConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ReportConfig::default();
        let text = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(addr) = text("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(url) = text("DATABASE_URL") {
            config.database_url = url;
        }

        if let Some(client_id) = text("GOOGLE_CLIENT_ID") {
            config.google_client_id = client_id;
        }
        if let Some(secret) = secret_from(lookup("GOOGLE_CLIENT_SECRET"), "GOOGLE_CLIENT_SECRET") {
            config.google_client_secret = secret;
        }
        if let Some(token) = secret_from(lookup("GOOGLE_DEVELOPER_TOKEN"), "GOOGLE_DEVELOPER_TOKEN")
        {
            config.google_developer_token = token;
        }
        if let Some(customer_id) = text("GOOGLE_LOGIN_CUSTOMER_ID") {
            config.login_customer_id = customer_id;
        }
        if let Some(version) = text("GOOGLE_ADS_API_VERSION") {
            config.ads_api_version = version;
        }
        config.google_account_email = text("GOOGLE_ACCOUNT_EMAIL");
        if let Some(uri) = text("BACKEND_OAUTH_REDIRECT_URI") {
            config.backend_redirect_uri = uri;
        }
        if let Some(uri) = text("FRONTEND_OAUTH_REDIRECT_URI") {
            config.frontend_redirect_uri = uri;
        }
        if let Some(url) = text("FRONTEND_URL") {
            config.frontend_url = url.trim_end_matches('/').to_string();
        }

        if let Some(url) = text("BINOM_API_URL") {
            config.binom_api_url = url;
        }
        if let Some(key) = secret_from(lookup("BINOM_API_KEY"), "BINOM_API_KEY") {
            config.binom_api_key = key;
        }
        if let Some(ids) = text("TRAFFIC_SOURCE_IDS") {
            let parsed = TrackerQuery::parse_traffic_source_ids(&ids);
            if parsed.is_empty() {
                tracing::warn!(
                    "Invalid TRAFFIC_SOURCE_IDS '{}', using default: {:?}",
                    ids,
                    config.traffic_source_ids
                );
            } else {
                config.traffic_source_ids = parsed;
            }
        }
        if let Some(timezone) = text("DEFAULT_TIMEZONE") {
            config.default_timezone = timezone;
        }
        if let Some(date_type) = text("DEFAULT_DATE_TYPE") {
            config.default_date_type = date_type;
        }

        config.max_accounts = parse_in_range(
            "MAX_ACCOUNTS",
            text("MAX_ACCOUNTS"),
            1..=10_000,
            config.max_accounts,
        );
        config.cost_fetch_concurrency = parse_in_range(
            "COST_FETCH_CONCURRENCY",
            text("COST_FETCH_CONCURRENCY"),
            1..=32,
            config.cost_fetch_concurrency,
        );
        config.http_timeout_seconds = parse_in_range(
            "HTTP_TIMEOUT_SECONDS",
            text("HTTP_TIMEOUT_SECONDS"),
            1..=300,
            config.http_timeout_seconds,
        );

        if let Some(keys) = lookup("API_KEYS") {
            config.api_keys = keys
                .split(',')
                .filter_map(|key| secret_from(Some(key.to_string()), "API_KEYS entry"))
                .collect();
        }

        config
    }

    /// Login customer id as the Ads API expects it (digits only)
    pub fn login_customer_digits(&self) -> String {
        self.login_customer_id
            .chars()
            .filter(char::is_ascii_digit)
            .collect()
    }
}

/// Parse a numeric variable, keeping the default when it is malformed or out of range
fn parse_in_range<T>(name: &str, raw: Option<String>, range: RangeInclusive<T>, default: T) -> T
where
    T: FromStr + PartialOrd + Display + Copy,
    T::Err: Display,
{
    let Some(raw) = raw else {
        return default;
    };

    match raw.parse::<T>() {
        Ok(value) if range.contains(&value) => value,
        Ok(value) => {
            tracing::warn!(
                "Invalid {} value: {} (must be between {} and {}), using default: {}",
                name,
                value,
                range.start(),
                range.end(),
                default
            );
            default
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse {} '{}': {}, using default: {}",
                name,
                raw,
                e,
                default
            );
            default
        }
    }
}
