use crate::domain::entities::revenue::RevenueRecord;
use crate::domain::errors::GatewayResult;
use crate::domain::value_objects::date_range::DateRange;
use async_trait::async_trait;

/// Parameters of one tracker campaign report
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerQuery {
    pub range: DateRange,
    /// IANA timezone the tracker buckets conversions in
    pub timezone: String,
    pub traffic_source_ids: Vec<String>,
    pub date_type: String,
}

impl TrackerQuery {
    /// Split a comma-separated id list ("1, 6") into trimmed, non-empty ids
    pub fn parse_traffic_source_ids(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Conversion tracker returning revenue per campaign
#[async_trait]
pub trait TrackerGateway: Send + Sync {
    fn name(&self) -> &str;

    async fn get_tracker_report(&self, query: &TrackerQuery) -> GatewayResult<Vec<RevenueRecord>>;
}
