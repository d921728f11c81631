//! In-memory gateways shared by the end-to-end suites.

#![allow(dead_code)]

use adrecon::application::services::report_service::{ReportService, ReportSettings};
use adrecon::domain::entities::account::ChildAccount;
use adrecon::domain::entities::revenue::RevenueRecord;
use adrecon::domain::entities::spend::CampaignCost;
use adrecon::domain::errors::{GatewayError, GatewayResult};
use adrecon::domain::repositories::ads_gateway::AdsGateway;
use adrecon::domain::repositories::credential_store::{
    CredentialStore, CredentialStoreError, StoredAccount, UpsertOutcome,
};
use adrecon::domain::repositories::tracker_gateway::{TrackerGateway, TrackerQuery};
use adrecon::domain::value_objects::credential::Credential;
use adrecon::domain::value_objects::date_range::DateRange;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use zeroize::Zeroizing;

pub const ROOT_ID: &str = "1234567890";
pub const USER_EMAIL: &str = "ops@agency.io";

/// Account tree plus campaign costs per leaf
#[derive(Default)]
pub struct FakeAds {
    pub children: HashMap<String, Vec<ChildAccount>>,
    pub names: HashMap<String, String>,
    pub costs: HashMap<String, Vec<CampaignCost>>,
    pub failing_costs: Vec<String>,
    pub cost_calls: Mutex<Vec<String>>,
}

impl FakeAds {
    /// Root manager with one leaf ("Acme"), one sub-manager and a leaf below it ("Globex")
    pub fn agency() -> Self {
        let mut ads = FakeAds::default();
        ads.names.insert(ROOT_ID.to_string(), "Agency MCC".to_string());
        ads.children.insert(
            ROOT_ID.to_string(),
            vec![
                child("3000000000", false, "Acme"),
                child("2000000000", true, "Sub Manager"),
            ],
        );
        ads.children.insert(
            "2000000000".to_string(),
            vec![child("4000000000", false, "Globex")],
        );
        ads.costs.insert(
            "3000000000".to_string(),
            vec![
                cost("Acme", "250417_01 Summer Sale", 125_500_000),
                cost("Acme", "Paused Campaign", 0),
            ],
        );
        ads.costs.insert(
            "4000000000".to_string(),
            vec![cost("Globex", "Winter Push", 40_000_000)],
        );
        ads
    }
}

pub fn child(id: &str, is_manager: bool, name: &str) -> ChildAccount {
    ChildAccount {
        customer_id: id.to_string(),
        is_manager,
        descriptive_name: name.to_string(),
    }
}

pub fn cost(account: &str, campaign: &str, cost_micros: i64) -> CampaignCost {
    CampaignCost {
        account_name: account.to_string(),
        campaign_name: campaign.to_string(),
        cost_micros,
    }
}

#[async_trait]
impl AdsGateway for FakeAds {
    fn name(&self) -> &str {
        "fake-ads"
    }

    async fn discover_children(
        &self,
        parent_id: &str,
        _credential: &Credential,
    ) -> GatewayResult<Vec<ChildAccount>> {
        Ok(self.children.get(parent_id).cloned().unwrap_or_default())
    }

    async fn get_account_name(
        &self,
        account_id: &str,
        _credential: &Credential,
    ) -> GatewayResult<Option<String>> {
        Ok(self.names.get(account_id).cloned())
    }

    async fn get_campaign_costs(
        &self,
        account_id: &str,
        _login_customer_id: &str,
        _credential: &Credential,
        _range: &DateRange,
    ) -> GatewayResult<Vec<CampaignCost>> {
        self.cost_calls.lock().unwrap().push(account_id.to_string());
        if self.failing_costs.iter().any(|id| id == account_id) {
            return Err(GatewayError::Api {
                status: 500,
                message: "internal".to_string(),
            });
        }
        Ok(self.costs.get(account_id).cloned().unwrap_or_default())
    }
}

/// Tracker answering every query with a fixed result
pub struct FakeTracker {
    pub result: GatewayResult<Vec<RevenueRecord>>,
    pub queries: Mutex<Vec<TrackerQuery>>,
}

impl FakeTracker {
    pub fn with_rows(rows: Vec<RevenueRecord>) -> Self {
        Self {
            result: Ok(rows),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: GatewayError) -> Self {
        Self {
            result: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// One matched campaign, one revenue-only campaign and one row without activity
    pub fn agency() -> Self {
        Self::with_rows(vec![
            revenue(json!({
                "id": 11,
                "name": "Acme - 250417_01 Summer Sale (acme.com)",
                "leads": "5",
                "revenue": 200.0
            })),
            revenue(json!({
                "id": 12,
                "name": "Initech - Brand (initech.io)",
                "leads": "2",
                "revenue": "30.00"
            })),
            revenue(json!({
                "id": 13,
                "name": "Dormant - Old (old.com)",
                "leads": "0",
                "revenue": 0
            })),
        ])
    }
}

pub fn revenue(value: serde_json::Value) -> RevenueRecord {
    serde_json::from_value(value).unwrap()
}

#[async_trait]
impl TrackerGateway for FakeTracker {
    fn name(&self) -> &str {
        "fake-tracker"
    }

    async fn get_tracker_report(&self, query: &TrackerQuery) -> GatewayResult<Vec<RevenueRecord>> {
        self.queries.lock().unwrap().push(query.clone());
        self.result.clone()
    }
}

/// Credential store backed by a map, with the same upsert rules as SQLite
#[derive(Default)]
pub struct MemoryCredentials {
    tokens: Mutex<HashMap<String, String>>,
}

impl MemoryCredentials {
    pub fn with_account(email: &str, token: &str) -> Self {
        let store = Self::default();
        store
            .tokens
            .lock()
            .unwrap()
            .insert(email.to_string(), token.to_string());
        store
    }

    pub fn token(&self, email: &str) -> Option<String> {
        self.tokens.lock().unwrap().get(email).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn find(&self, email: &str) -> Result<Option<StoredAccount>, CredentialStoreError> {
        Ok(self.token(email).map(|token| StoredAccount {
            user_email: email.to_string(),
            refresh_token: Zeroizing::new(token),
            updated_at: Utc::now(),
        }))
    }

    async fn upsert(
        &self,
        email: &str,
        refresh_token: Option<&str>,
    ) -> Result<UpsertOutcome, CredentialStoreError> {
        let mut tokens = self.tokens.lock().unwrap();
        let exists = tokens.contains_key(email);
        Ok(match (exists, refresh_token) {
            (true, None) => UpsertOutcome::Unchanged,
            (false, None) => UpsertOutcome::Skipped,
            (true, Some(token)) => {
                tokens.insert(email.to_string(), token.to_string());
                UpsertOutcome::Updated
            }
            (false, Some(token)) => {
                tokens.insert(email.to_string(), token.to_string());
                UpsertOutcome::Created
            }
        })
    }
}

pub fn settings() -> ReportSettings {
    ReportSettings {
        max_accounts: 200,
        cost_fetch_concurrency: 2,
        login_customer_id: ROOT_ID.to_string(),
        default_email: Some(USER_EMAIL.to_string()),
        timezone: "Europe/Moscow".to_string(),
        traffic_source_ids: vec!["1".to_string(), "6".to_string()],
        date_type: "custom_time".to_string(),
    }
}

pub fn service(
    ads: Arc<FakeAds>,
    tracker: Arc<FakeTracker>,
    credentials: Arc<MemoryCredentials>,
) -> ReportService {
    ReportService::new(ads, tracker, credentials, settings())
}

pub fn may_2025() -> DateRange {
    DateRange::parse("2025-05-01", "2025-05-31").unwrap()
}
