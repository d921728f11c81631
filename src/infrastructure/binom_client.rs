use crate::domain::entities::revenue::RevenueRecord;
use crate::domain::errors::{GatewayError, GatewayResult};
use crate::domain::repositories::tracker_gateway::{TrackerGateway, TrackerQuery};
use crate::infrastructure::{ensure_success, transport_error};
use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use zeroize::Zeroizing;

#[derive(Clone)]
pub struct BinomConfig {
    /// Full URL of the campaign report endpoint
    pub api_url: String,
    pub api_key: Zeroizing<String>,
}

/// Binom tracker client for campaign revenue reports
pub struct BinomClient {
    client: Client,
    config: BinomConfig,
}

impl BinomClient {
    pub fn new(client: Client, config: BinomConfig) -> Self {
        Self { client, config }
    }
}

/// Query string for one report, in the order Binom documents it
pub fn report_params(query: &TrackerQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("datePreset", "custom_time".to_string()),
        ("dateType", query.date_type.clone()),
        ("dateFrom", format!("{} 00:00:00", query.range.start_str())),
        ("dateTo", format!("{} 23:59:59", query.range.end_str())),
        ("timezone", query.timezone.clone()),
    ];
    params.extend(
        query
            .traffic_source_ids
            .iter()
            .map(|id| ("trafficSourceIds[]", id.clone())),
    );
    params
}

/// Extract report rows from either a bare array or `{"data": [...]}`.
///
/// Rows that cannot be read are logged and skipped.
pub fn parse_report(body: Value) -> GatewayResult<Vec<RevenueRecord>> {
    let rows = match body {
        Value::Array(rows) => rows,
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(rows)) => rows,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(GatewayError::Parse(format!(
                    "Expected 'data' to be a list, got {}",
                    json_kind(&other)
                )))
            }
        },
        other => {
            return Err(GatewayError::Parse(format!(
                "Expected a list or an object with 'data', got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<RevenueRecord>(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed tracker row: {}", e);
                None
            }
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl TrackerGateway for BinomClient {
    fn name(&self) -> &str {
        "binom"
    }

    async fn get_tracker_report(&self, query: &TrackerQuery) -> GatewayResult<Vec<RevenueRecord>> {
        if self.config.api_url.is_empty() {
            return Err(GatewayError::NotConfigured(
                "BINOM_API_URL must be set".to_string(),
            ));
        }

        let params = report_params(query);
        debug!(
            "Requesting tracker report {} .. {} for traffic sources {:?}",
            query.range.start_str(),
            query.range.end_str(),
            query.traffic_source_ids
        );

        let response = self
            .client
            .get(&self.config.api_url)
            .query(&params)
            .header("Api-Key", self.config.api_key.as_str())
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(transport_error)?;

        let body: Value = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        parse_report(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::revenue::Leads;
    use crate::domain::value_objects::date_range::DateRange;
    use serde_json::json;

    fn query() -> TrackerQuery {
        TrackerQuery {
            range: DateRange::parse("2025-05-01", "2025-05-31").unwrap(),
            timezone: "America/Atikokan".to_string(),
            traffic_source_ids: vec!["1".to_string(), "6".to_string()],
            date_type: "custom-time".to_string(),
        }
    }

    #[test]
    fn test_report_params() {
        let params = report_params(&query());

        assert_eq!(
            params,
            vec![
                ("datePreset", "custom_time".to_string()),
                ("dateType", "custom-time".to_string()),
                ("dateFrom", "2025-05-01 00:00:00".to_string()),
                ("dateTo", "2025-05-31 23:59:59".to_string()),
                ("timezone", "America/Atikokan".to_string()),
                ("trafficSourceIds[]", "1".to_string()),
                ("trafficSourceIds[]", "6".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_bare_list() {
        let rows = parse_report(json!([
            {"id": 7, "name": "Acme - Summer (a.com)", "leads": "5", "revenue": "150.5"},
            {"id": 8, "name": "Beta", "leads": 2, "revenue": 20}
        ]))
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].revenue, 150.5);
        assert_eq!(rows[0].leads, Leads::Label("5".to_string()));
        assert_eq!(rows[1].leads, Leads::Count(2));
    }

    #[test]
    fn test_parse_wrapped_data() {
        let rows = parse_report(json!({"data": [{"id": "x", "name": "Gamma", "leads": "0", "revenue": "0"}]}))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_empty());

        assert!(parse_report(json!({"status": "ok"})).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let rows = parse_report(json!([
            {"id": 1, "name": "Good", "leads": "1", "revenue": "10"},
            {"id": 2, "name": "Bad", "leads": "1", "revenue": "lots"}
        ]))
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Good");
    }

    #[test]
    fn test_unexpected_shape_is_parse_error() {
        assert!(matches!(parse_report(json!("nope")), Err(GatewayError::Parse(_))));
        assert!(matches!(
            parse_report(json!({"data": "nope"})),
            Err(GatewayError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_client() {
        let client = BinomClient::new(
            Client::new(),
            BinomConfig {
                api_url: String::new(),
                api_key: Zeroizing::new(String::new()),
            },
        );
        assert!(matches!(
            client.get_tracker_report(&query()).await,
            Err(GatewayError::NotConfigured(_))
        ));
    }
}
