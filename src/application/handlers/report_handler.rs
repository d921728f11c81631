use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::application::handlers::api_error::ApiError;
use crate::application::state::AppState;
use crate::domain::entities::account::AccountNode;
use crate::domain::entities::report::CombinedReport;
use crate::domain::entities::revenue::RevenueRecord;
use crate::domain::entities::spend::SpendRecord;
use crate::domain::value_objects::date_range::DateRange;

/// Query parameters for the Google Ads spend endpoint
#[derive(Debug, Default, Deserialize)]
pub struct SpendQuery {
    pub email: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query parameters for the hierarchy check endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ManagerCheckQuery {
    pub email: Option<String>,
}

/// Query parameters for the raw tracker report; Binom's own names are accepted too
#[derive(Debug, Default, Deserialize)]
pub struct TrackerReportQuery {
    pub start_date: Option<String>,
    #[serde(rename = "dateFrom")]
    pub date_from: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "dateTo")]
    pub date_to: Option<String>,
    pub timezone: Option<String>,
    #[serde(rename = "dateTimeZone")]
    pub date_time_zone: Option<String>,
    #[serde(rename = "trafficSourceIds")]
    pub traffic_source_ids: Option<String>,
    #[serde(rename = "dateType")]
    pub date_type: Option<String>,
}

/// Query parameters for the combined report
#[derive(Debug, Default, Deserialize)]
pub struct CombinedReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub email: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn date_range(start: Option<String>, end: Option<String>) -> Result<DateRange, ApiError> {
    let (Some(start), Some(end)) = (present(start), present(end)) else {
        return Err(ApiError::BadRequest(
            "Missing required query parameters: start_date, end_date".to_string(),
        ));
    };
    DateRange::parse(start.trim(), end.trim()).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Spend per campaign across the account hierarchy
pub async fn google_ads_spend(
    State(state): State<AppState>,
    Query(params): Query<SpendQuery>,
) -> Result<Json<Vec<SpendRecord>>, ApiError> {
    let (Some(email), Some(start), Some(end)) = (
        present(params.email),
        present(params.start_date),
        present(params.end_date),
    ) else {
        return Err(ApiError::BadRequest(
            "Missing required query parameters: email, start_date, end_date".to_string(),
        ));
    };
    let range = date_range(Some(start), Some(end))?;

    let spend = state.reports.campaign_costs(email.trim(), &range).await?;
    Ok(Json(spend))
}

/// Every account discovered under the configured root manager
pub async fn manager_check(
    State(state): State<AppState>,
    Query(params): Query<ManagerCheckQuery>,
) -> Result<Json<Vec<AccountNode>>, ApiError> {
    let email = present(params.email)
        .ok_or_else(|| ApiError::BadRequest("Email parameter is required.".to_string()))?;

    let accounts = state.reports.discover_accounts(email.trim()).await?;
    Ok(Json(accounts))
}

/// Tracker rows with revenue or leads, sorted by name
pub async fn generate_report(
    State(state): State<AppState>,
    Query(params): Query<TrackerReportQuery>,
) -> Result<Json<Vec<RevenueRecord>>, ApiError> {
    let range = date_range(
        present(params.start_date).or(params.date_from),
        present(params.end_date).or(params.date_to),
    )?;
    let query = state.reports.tracker_query(
        range,
        present(params.timezone).or(params.date_time_zone),
        params.traffic_source_ids.as_deref(),
        params.date_type,
    );

    let rows = state.reports.tracker_report(&query).await?;
    Ok(Json(rows))
}

/// Google Ads spend reconciled with tracker revenue
pub async fn combined_report(
    State(state): State<AppState>,
    Query(params): Query<CombinedReportQuery>,
) -> Result<Json<CombinedReport>, ApiError> {
    let range = date_range(params.start_date, params.end_date)?;

    let report = state
        .reports
        .combined_report(params.email.as_deref(), range)
        .await?;
    Ok(Json(report))
}
