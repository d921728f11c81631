//! Report Service
//!
//! Orchestrates one reporting request: resolves the stored Google credential,
//! walks the account hierarchy, collects spend, fetches tracker revenue and
//! reconciles both sides.

use crate::config::ReportConfig;
use crate::domain::entities::account::AccountNode;
use crate::domain::entities::report::CombinedReport;
use crate::domain::entities::revenue::RevenueRecord;
use crate::domain::entities::spend::SpendRecord;
use crate::domain::errors::{ReportError, ValidationError};
use crate::domain::repositories::ads_gateway::AdsGateway;
use crate::domain::repositories::credential_store::CredentialStore;
use crate::domain::repositories::tracker_gateway::{TrackerGateway, TrackerQuery};
use crate::domain::services::cost_fetcher::CostFetcher;
use crate::domain::services::hierarchy_walker::HierarchyWalker;
use crate::domain::services::reconciler::reconcile;
use crate::domain::value_objects::credential::Credential;
use crate::domain::value_objects::date_range::DateRange;
use std::sync::Arc;
use tracing::{info, warn};

/// Request defaults taken from configuration
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub max_accounts: usize,
    pub cost_fetch_concurrency: usize,
    pub login_customer_id: String,
    pub default_email: Option<String>,
    pub timezone: String,
    pub traffic_source_ids: Vec<String>,
    pub date_type: String,
}

impl From<&ReportConfig> for ReportSettings {
    fn from(config: &ReportConfig) -> Self {
        Self {
            max_accounts: config.max_accounts,
            cost_fetch_concurrency: config.cost_fetch_concurrency,
            login_customer_id: config.login_customer_digits(),
            default_email: config.google_account_email.clone(),
            timezone: config.default_timezone.clone(),
            traffic_source_ids: config.traffic_source_ids.clone(),
            date_type: config.default_date_type.clone(),
        }
    }
}

pub struct ReportService {
    walker: HierarchyWalker,
    cost_fetcher: CostFetcher,
    tracker: Arc<dyn TrackerGateway>,
    credentials: Arc<dyn CredentialStore>,
    settings: ReportSettings,
}

impl ReportService {
    pub fn new(
        ads: Arc<dyn AdsGateway>,
        tracker: Arc<dyn TrackerGateway>,
        credentials: Arc<dyn CredentialStore>,
        settings: ReportSettings,
    ) -> Self {
        let walker = HierarchyWalker::new(ads.clone(), settings.login_customer_id.clone());
        let cost_fetcher = CostFetcher::new(
            ads,
            settings.login_customer_id.clone(),
            settings.cost_fetch_concurrency,
        );
        Self {
            walker,
            cost_fetcher,
            tracker,
            credentials,
            settings,
        }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Tracker query using the configured defaults for anything not supplied
    pub fn tracker_query(
        &self,
        range: DateRange,
        timezone: Option<String>,
        traffic_source_ids: Option<&str>,
        date_type: Option<String>,
    ) -> TrackerQuery {
        let traffic_source_ids = traffic_source_ids
            .map(TrackerQuery::parse_traffic_source_ids)
            .filter(|ids| !ids.is_empty())
            .unwrap_or_else(|| self.settings.traffic_source_ids.clone());

        TrackerQuery {
            range,
            timezone: non_blank(timezone).unwrap_or_else(|| self.settings.timezone.clone()),
            traffic_source_ids,
            date_type: non_blank(date_type).unwrap_or_else(|| self.settings.date_type.clone()),
        }
    }

    /// Stored refresh token for an authorized Google account
    pub async fn credential_for(&self, email: &str) -> Result<Credential, ReportError> {
        let account = self
            .credentials
            .find(email)
            .await
            .map_err(|e| ReportError::Storage(e.to_string()))?
            .ok_or_else(|| ReportError::AccountNotFound(email.to_string()))?;

        Credential::new(account.refresh_token.as_str())
            .map_err(|_| ReportError::MissingRefreshToken(email.to_string()))
    }

    /// Every account in the configured hierarchy (diagnostic)
    pub async fn discover_accounts(&self, email: &str) -> Result<Vec<AccountNode>, ReportError> {
        let credential = self.credential_for(email).await?;
        self.walker
            .discover(None, &credential, self.settings.max_accounts)
            .await
    }

    /// Spend per campaign across the whole hierarchy
    pub async fn campaign_costs(
        &self,
        email: &str,
        range: &DateRange,
    ) -> Result<Vec<SpendRecord>, ReportError> {
        let credential = self.credential_for(email).await?;
        self.collect_spend(&credential, range).await
    }

    /// Tracker rows with activity, sorted case-insensitively by name
    pub async fn tracker_report(
        &self,
        query: &TrackerQuery,
    ) -> Result<Vec<RevenueRecord>, ReportError> {
        let mut rows: Vec<RevenueRecord> = self
            .fetch_tracker_rows(query)
            .await?
            .into_iter()
            .filter(|row| !row.is_empty())
            .collect();

        rows.sort_by_cached_key(|row| row.name.to_lowercase());
        Ok(rows)
    }

    /// Reconciled spend and revenue for the given (or configured) account
    pub async fn combined_report(
        &self,
        email: Option<&str>,
        range: DateRange,
    ) -> Result<CombinedReport, ReportError> {
        let email = email
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .or(self.settings.default_email.as_deref())
            .ok_or_else(|| ValidationError::MissingParameter("email".to_string()))?;

        // Zero-activity tracker rows still join, so a matched campaign keeps its tracker label
        let query = self.tracker_query(range.clone(), None, None, None);
        let revenue = self.fetch_tracker_rows(&query).await?;

        let credential = self.credential_for(email).await?;
        let spend = self.collect_spend(&credential, &range).await?;

        let rows = reconcile(&spend, &revenue);
        info!(
            "Combined report {} .. {}: {} spend rows, {} revenue rows, {} combined rows",
            range.start_str(),
            range.end_str(),
            spend.len(),
            revenue.len(),
            rows.len()
        );

        Ok(CombinedReport::new(rows, range.start_str(), range.end_str()))
    }

    async fn fetch_tracker_rows(
        &self,
        query: &TrackerQuery,
    ) -> Result<Vec<RevenueRecord>, ReportError> {
        self.tracker.get_tracker_report(query).await.map_err(|e| {
            warn!("Tracker {} request failed: {}", self.tracker.name(), e);
            ReportError::Tracker(e)
        })
    }

    async fn collect_spend(
        &self,
        credential: &Credential,
        range: &DateRange,
    ) -> Result<Vec<SpendRecord>, ReportError> {
        let accounts = self
            .walker
            .discover(None, credential, self.settings.max_accounts)
            .await?;
        Ok(self.cost_fetcher.fetch_costs(&accounts, credential, range).await)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
