//! Google Ads REST client
//!
//! Implements `AdsGateway` over the `googleAds:searchStream` endpoint.
//! Access tokens are minted from the caller's refresh token and kept in a
//! small LRU cache until shortly before they expire.

use crate::domain::entities::account::{normalize_customer_id, ChildAccount};
use crate::domain::entities::spend::CampaignCost;
use crate::domain::errors::{GatewayError, GatewayResult};
use crate::domain::repositories::ads_gateway::AdsGateway;
use crate::domain::value_objects::credential::Credential;
use crate::domain::value_objects::date_range::DateRange;
use crate::infrastructure::google_oauth::GoogleOAuthClient;
use crate::infrastructure::transport_error;
use async_trait::async_trait;
use lru::LruCache;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use zeroize::Zeroizing;

pub const GOOGLE_ADS_API_BASE: &str = "https://googleads.googleapis.com";

/// Access tokens are dropped this long before Google says they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Distinct refresh tokens whose access tokens are kept
const TOKEN_CACHE_CAPACITY: usize = 64;

/// Error code returned when campaign metrics are requested on a manager account
const MANAGER_METRICS_ERROR: &str = "REQUESTED_METRICS_FOR_MANAGER";

pub const CHILD_ACCOUNTS_QUERY: &str = "SELECT customer_client.client_customer, \
     customer_client.manager, customer_client.descriptive_name \
     FROM customer_client \
     WHERE customer_client.level = 1 AND customer_client.status = 'ENABLED'";

pub fn account_name_query(customer_id: &str) -> String {
    format!(
        "SELECT customer.descriptive_name FROM customer WHERE customer.id = '{}'",
        customer_id
    )
}

pub fn campaign_cost_query(range: &DateRange) -> String {
    format!(
        "SELECT customer.descriptive_name, campaign.name, metrics.cost_micros \
         FROM campaign \
         WHERE segments.date BETWEEN '{}' AND '{}' AND metrics.cost_micros > 0",
        range.start_str(),
        range.end_str()
    )
}

#[derive(Clone)]
pub struct GoogleAdsConfig {
    pub api_base: String,
    pub api_version: String,
    pub developer_token: Zeroizing<String>,
    /// Digits only; sent as `login-customer-id` when non-empty
    pub login_customer_id: String,
}

impl GoogleAdsConfig {
    pub fn new(
        api_version: impl Into<String>,
        developer_token: Zeroizing<String>,
        login_customer_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base: GOOGLE_ADS_API_BASE.to_string(),
            api_version: api_version.into(),
            developer_token,
            login_customer_id: login_customer_id.into(),
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchStreamBatch {
    #[serde(default)]
    results: Vec<GoogleAdsRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GoogleAdsRow {
    customer_client: Option<CustomerClientRow>,
    customer: Option<CustomerRow>,
    campaign: Option<CampaignRow>,
    metrics: Option<MetricsRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CustomerClientRow {
    client_customer: String,
    manager: bool,
    descriptive_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CustomerRow {
    descriptive_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CampaignRow {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MetricsRow {
    #[serde(deserialize_with = "int64_from_json")]
    cost_micros: i64,
}

/// int64 fields arrive as JSON strings ("12345") in the REST encoding
fn int64_from_json<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(i64),
        Text(String),
    }

    match Option::<Int64>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Int64::Number(n)) => Ok(n),
        Some(Int64::Text(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl GoogleAdsRow {
    fn into_child(self) -> Option<ChildAccount> {
        let client = self.customer_client?;
        let customer_id = client
            .client_customer
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if customer_id.is_empty() {
            return None;
        }
        Some(ChildAccount {
            customer_id,
            is_manager: client.manager,
            descriptive_name: client.descriptive_name,
        })
    }

    fn into_campaign_cost(self) -> CampaignCost {
        CampaignCost {
            account_name: self.customer.map(|c| c.descriptive_name).unwrap_or_default(),
            campaign_name: self.campaign.map(|c| c.name).unwrap_or_default(),
            cost_micros: self.metrics.map(|m| m.cost_micros).unwrap_or_default(),
        }
    }
}

/// Classify a failed searchStream response
fn classify_ads_error(status: StatusCode, body: &str) -> GatewayError {
    if body.contains(MANAGER_METRICS_ERROR) {
        return GatewayError::NoData(MANAGER_METRICS_ERROR.to_string());
    }
    let message = extract_error_message(body).unwrap_or_else(|| body.trim().to_string());
    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Authentication(message),
        _ => GatewayError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// `error.message` from either `{"error": ...}` or `[{"error": ...}]`
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = match &value {
        serde_json::Value::Array(items) => items.first()?.get("error")?,
        other => other.get("error")?,
    };
    error.get("message")?.as_str().map(str::to_string)
}

struct CachedToken {
    token: Zeroizing<String>,
    expires_at: Instant,
}

fn cache_key(refresh_token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    refresh_token.hash(&mut hasher);
    hasher.finish()
}

pub struct GoogleAdsClient {
    client: Client,
    config: GoogleAdsConfig,
    oauth: Arc<GoogleOAuthClient>,
    token_cache: Mutex<LruCache<u64, CachedToken>>,
}

impl GoogleAdsClient {
    pub fn new(client: Client, config: GoogleAdsConfig, oauth: Arc<GoogleOAuthClient>) -> Self {
        let capacity = NonZeroUsize::new(TOKEN_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            client,
            config,
            oauth,
            token_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    async fn access_token(&self, credential: &Credential) -> GatewayResult<Zeroizing<String>> {
        let key = cache_key(credential.expose());
        if let Some(cached) = self.token_cache.lock().await.get(&key) {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.oauth.refresh_access_token(credential).await?;
        let lifetime = Duration::from_secs(fresh.expires_in_secs).saturating_sub(TOKEN_EXPIRY_MARGIN);
        self.token_cache.lock().await.put(
            key,
            CachedToken {
                token: fresh.token.clone(),
                expires_at: Instant::now() + lifetime,
            },
        );
        Ok(fresh.token)
    }

    async fn search_stream(
        &self,
        customer_id: &str,
        login_customer_id: &str,
        query: &str,
        credential: &Credential,
    ) -> GatewayResult<Vec<GoogleAdsRow>> {
        if self.config.developer_token.is_empty() {
            return Err(GatewayError::NotConfigured(
                "GOOGLE_DEVELOPER_TOKEN must be set".to_string(),
            ));
        }
        let customer_id = normalize_customer_id(customer_id)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        let access_token = self.access_token(credential).await?;

        let url = format!(
            "{}/{}/customers/{}/googleAds:searchStream",
            self.config.api_base, self.config.api_version, customer_id
        );
        let mut request = self
            .client
            .post(&url)
            .bearer_auth(access_token.as_str())
            .header("developer-token", self.config.developer_token.as_str())
            .json(&SearchRequest { query });
        if let Ok(login) = normalize_customer_id(login_customer_id) {
            request = request.header("login-customer-id", login);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.token_cache.lock().await.pop(&cache_key(credential.expose()));
            }
            let body = response.text().await.unwrap_or_default();
            return Err(classify_ads_error(status, &body));
        }

        let body = response.text().await.map_err(transport_error)?;
        parse_search_stream(&body)
    }
}

fn parse_search_stream(body: &str) -> GatewayResult<Vec<GoogleAdsRow>> {
    let batches: Vec<SearchStreamBatch> = serde_json::from_str(body)
        .map_err(|e| GatewayError::Parse(format!("Invalid searchStream response: {}", e)))?;
    Ok(batches.into_iter().flat_map(|batch| batch.results).collect())
}

#[async_trait]
impl AdsGateway for GoogleAdsClient {
    fn name(&self) -> &str {
        "google_ads"
    }

    async fn discover_children(
        &self,
        parent_id: &str,
        credential: &Credential,
    ) -> GatewayResult<Vec<ChildAccount>> {
        let rows = self
            .search_stream(
                parent_id,
                &self.config.login_customer_id,
                CHILD_ACCOUNTS_QUERY,
                credential,
            )
            .await?;
        let children: Vec<ChildAccount> = rows.into_iter().filter_map(GoogleAdsRow::into_child).collect();
        debug!("Manager {} has {} direct children", parent_id, children.len());
        Ok(children)
    }

    async fn get_account_name(
        &self,
        account_id: &str,
        credential: &Credential,
    ) -> GatewayResult<Option<String>> {
        let customer_id = normalize_customer_id(account_id)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        let rows = self
            .search_stream(
                &customer_id,
                &self.config.login_customer_id,
                &account_name_query(&customer_id),
                credential,
            )
            .await?;

        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.customer)
            .map(|customer| customer.descriptive_name))
    }

    async fn get_campaign_costs(
        &self,
        account_id: &str,
        login_customer_id: &str,
        credential: &Credential,
        range: &DateRange,
    ) -> GatewayResult<Vec<CampaignCost>> {
        let rows = self
            .search_stream(
                account_id,
                login_customer_id,
                &campaign_cost_query(range),
                credential,
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(GoogleAdsRow::into_campaign_cost)
            .collect())
    }
}
