use crate::domain::entities::account::AccountNode;
use crate::domain::entities::spend::SpendRecord;
use crate::domain::errors::GatewayError;
use crate::domain::repositories::ads_gateway::AdsGateway;
use crate::domain::value_objects::credential::Credential;
use crate::domain::value_objects::date_range::DateRange;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Default number of leaf accounts queried at once
pub const DEFAULT_COST_CONCURRENCY: usize = 4;

/// Collects per-campaign spend for every leaf account of a hierarchy
pub struct CostFetcher {
    gateway: Arc<dyn AdsGateway>,
    login_customer_id: String,
    concurrency: usize,
}

impl CostFetcher {
    pub fn new(
        gateway: Arc<dyn AdsGateway>,
        login_customer_id: impl Into<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            gateway,
            login_customer_id: login_customer_id.into(),
            concurrency: concurrency.max(1),
        }
    }

    /// Spend per campaign over `range`, sorted by (account, campaign).
    ///
    /// Managers are skipped, zero-cost campaigns dropped, and a failing
    /// account contributes nothing instead of failing the whole fetch.
    pub async fn fetch_costs(
        &self,
        accounts: &[AccountNode],
        credential: &Credential,
        range: &DateRange,
    ) -> Vec<SpendRecord> {
        let leaves: Vec<&AccountNode> = accounts.iter().filter(|a| a.is_leaf()).collect();
        debug!(
            "Fetching campaign costs for {} leaf accounts ({} in parallel)",
            leaves.len(),
            self.concurrency
        );

        let requests: Vec<_> = leaves
            .into_iter()
            .map(|account| self.fetch_account(account, credential, range))
            .collect();
        let per_account: Vec<Vec<SpendRecord>> = stream::iter(requests)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut spend: Vec<SpendRecord> = per_account
            .into_iter()
            .flatten()
            .filter(|record| record.cost > 0.0)
            .collect();
        spend.sort_by(|a, b| {
            a.account_name
                .cmp(&b.account_name)
                .then_with(|| a.campaign_name.cmp(&b.campaign_name))
        });

        info!("Collected {} campaigns with spend", spend.len());
        spend
    }

    async fn fetch_account(
        &self,
        account: &AccountNode,
        credential: &Credential,
        range: &DateRange,
    ) -> Vec<SpendRecord> {
        match self
            .gateway
            .get_campaign_costs(&account.customer_id, &self.login_customer_id, credential, range)
            .await
        {
            Ok(rows) => rows.into_iter().map(SpendRecord::from).collect(),
            Err(GatewayError::NoData(reason)) => {
                info!(
                    "No campaign data for customer_id {}: {}",
                    account.customer_id, reason
                );
                Vec::new()
            }
            Err(e) => {
                error!(
                    "Error fetching campaign costs for customer_id {}: {}",
                    account.customer_id, e
                );
                Vec::new()
            }
        }
    }
}
