use crate::domain::entities::revenue::Leads;
use serde::{Serialize, Serializer};

/// Return on investment as a ratio (`0.5` is +50%).
///
/// Empty when there is no spend to divide by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roi(Option<f64>);

impl Roi {
    /// `revenue / spend - 1`, empty when spend is zero
    pub fn from_totals(revenue: f64, total_spend: f64) -> Self {
        if total_spend > 0.0 {
            Roi(Some(revenue / total_spend - 1.0))
        } else {
            Roi(None)
        }
    }

    /// Fixed -100% for campaigns the tracker never saw
    pub fn total_loss() -> Self {
        Roi(Some(-1.0))
    }

    pub fn empty() -> Self {
        Roi(None)
    }

    pub fn ratio(&self) -> Option<f64> {
        self.0
    }
}

impl std::fmt::Display for Roi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(ratio) => write!(f, "{:.2}%", ratio * 100.0),
            None => Ok(()),
        }
    }
}

impl Serialize for Roi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One reconciled campaign
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRow {
    /// Presentation index, reassigned on every report
    pub id: usize,
    #[serde(rename = "Account")]
    pub account_name: String,
    #[serde(rename = "Campaign")]
    pub campaign_name: String,
    #[serde(rename = "Total Spend")]
    pub total_spend: f64,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "P/L")]
    pub profit_loss: f64,
    #[serde(rename = "ROI")]
    pub roi: Roi,
    #[serde(rename = "Sales")]
    pub sales: Leads,
}

impl CombinedRow {
    /// Build a row; P/L is always the exact revenue minus spend
    pub fn new(
        account_name: String,
        campaign_name: String,
        total_spend: f64,
        revenue: f64,
        roi: Roi,
        sales: Leads,
    ) -> Self {
        Self {
            id: 0,
            account_name,
            campaign_name,
            total_spend,
            revenue,
            profit_loss: revenue - total_spend,
            roi,
            sales,
        }
    }

    pub fn has_identity(&self) -> bool {
        !self.account_name.trim().is_empty() || !self.campaign_name.trim().is_empty()
    }

    pub fn has_activity(&self) -> bool {
        self.total_spend != 0.0 || self.revenue != 0.0
    }
}

/// Wire shape of the combined report
#[derive(Debug, Clone, Serialize)]
pub struct CombinedReport {
    pub data: Vec<CombinedRow>,
    pub start_date: String,
    pub end_date: String,
    pub total_rows: usize,
}

impl CombinedReport {
    pub fn new(data: Vec<CombinedRow>, start_date: String, end_date: String) -> Self {
        let total_rows = data.len();
        Self {
            data,
            start_date,
            end_date,
            total_rows,
        }
    }
}
