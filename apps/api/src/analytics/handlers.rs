use axum::{
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::analytics::aggregate::AnalyticsReport;
use crate::analytics::confirm::Preconfirmed;
use crate::analytics::render::render_report_md;
use crate::analytics::{ClearOutcome, FeedbackAnalytics};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// GET /api/v1/analytics
pub async fn handle_get_analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsReport>, AppError> {
    let report = FeedbackAnalytics::new(state.store.clone()).load()?;
    Ok(Json(report))
}

/// GET /api/v1/analytics/report.md
pub async fn handle_analytics_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let report = FeedbackAnalytics::new(state.store.clone()).load()?;
    Ok((
        [(CONTENT_TYPE, "text/markdown; charset=utf-8")],
        render_report_md(&report),
    ))
}

/// DELETE /api/v1/analytics?confirm=true
///
/// Without `confirm=true` nothing is deleted and the current report comes back.
pub async fn handle_clear_analytics(
    State(state): State<AppState>,
    Query(params): Query<ClearQuery>,
) -> Result<Json<ClearOutcome>, AppError> {
    let outcome = FeedbackAnalytics::new(state.store.clone()).clear(&Preconfirmed(params.confirm))?;
    Ok(Json(outcome))
}
