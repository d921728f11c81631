//! Ads Gateway Trait
//!
//! This module defines the `AdsGateway` trait, the interface the hierarchy
//! walker and the cost fetcher need from an advertising API. Keeping the
//! vendor client behind this seam lets both services be exercised against
//! in-memory account trees.

use crate::domain::entities::account::ChildAccount;
use crate::domain::entities::spend::CampaignCost;
use crate::domain::errors::GatewayResult;
use crate::domain::value_objects::credential::Credential;
use crate::domain::value_objects::date_range::DateRange;
use async_trait::async_trait;

/// Advertising API operations used by the reporting pipeline
#[async_trait]
pub trait AdsGateway: Send + Sync {
    /// Get the name of this gateway
    fn name(&self) -> &str;

    /// List the enabled direct children of a manager account (one hierarchy level)
    ///
    /// # Arguments
    /// * `parent_id` - Customer id of the manager account
    /// * `credential` - Refresh token authorizing the query
    async fn discover_children(
        &self,
        parent_id: &str,
        credential: &Credential,
    ) -> GatewayResult<Vec<ChildAccount>>;

    /// Get the descriptive name of a single account
    ///
    /// # Returns
    /// `None` when the account query returned no rows
    async fn get_account_name(
        &self,
        account_id: &str,
        credential: &Credential,
    ) -> GatewayResult<Option<String>>;

    /// Get per-campaign cost for one account over an inclusive date range
    ///
    /// # Arguments
    /// * `account_id` - Customer id the query is scoped to
    /// * `login_customer_id` - Top-level manager the query is authorized through
    /// * `credential` - Refresh token authorizing the query
    /// * `range` - Inclusive reporting window
    async fn get_campaign_costs(
        &self,
        account_id: &str,
        login_customer_id: &str,
        credential: &Credential,
        range: &DateRange,
    ) -> GatewayResult<Vec<CampaignCost>>;
}
