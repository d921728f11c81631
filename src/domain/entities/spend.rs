use crate::domain::value_objects::money::micros_to_amount;
use serde::{Deserialize, Serialize};

/// Raw campaign cost row as returned by the Ads API, cost still in micros
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignCost {
    pub account_name: String,
    pub campaign_name: String,
    pub cost_micros: i64,
}

/// One campaign's spend over the reporting window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    #[serde(rename = "Account")]
    pub account_name: String,
    #[serde(rename = "Campaign")]
    pub campaign_name: String,
    /// Currency units rounded to cents
    #[serde(rename = "Cost")]
    pub cost: f64,
}

impl From<CampaignCost> for SpendRecord {
    fn from(row: CampaignCost) -> Self {
        Self {
            account_name: row.account_name,
            campaign_name: row.campaign_name,
            cost: micros_to_amount(row.cost_micros),
        }
    }
}
