// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only JSON API over the stored activity.

use crate::error::{AppError, Result};
use crate::services::intervals::DEFAULT_PLOT_WIDTH;
use crate::services::{AccountReport, AccountReporter, DateFallback, Ranking, RankingAggregator};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

const MAX_PLOT_WIDTH: f64 = 4000.0;

/// API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ranking", get(get_ranking))
        .route("/api/accounts/{account_id}", get(get_account_report))
}

/// Query string errors go out as the usual JSON error body.
fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|raw| {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest("Invalid 'date' parameter: expected YYYY-MM-DD".to_string())
        })
    })
    .transpose()
}

// ─── Ranking ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct RankingQuery {
    /// Day to rank (defaults to the latest day with activity)
    date: Option<String>,
}

/// Top characters of a day.
async fn get_ranking(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<RankingQuery>, QueryRejection>,
) -> Result<Json<Ranking>> {
    let params = query_params(query)?;
    let date = parse_date(params.date.as_deref())?;
    let ranking = RankingAggregator::new(state.db.clone())
        .top_characters(date)
        .await?;
    Ok(Json(ranking))
}

// ─── Account Report ──────────────────────────────────────────

#[derive(Deserialize)]
struct AccountQuery {
    /// Requested day (defaults to today)
    date: Option<String>,
    /// Day to show when the requested one has no data
    #[serde(default)]
    fallback: DateFallback,
    /// Plot width in pixels
    width: Option<f64>,
}

/// One account's characters and their activity on a day.
async fn get_account_report(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<u64>,
    query: std::result::Result<Query<AccountQuery>, QueryRejection>,
) -> Result<Json<AccountReport>> {
    let params = query_params(query)?;
    let date = parse_date(params.date.as_deref())?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let width = params.width.unwrap_or(DEFAULT_PLOT_WIDTH);
    if !(width > 0.0 && width <= MAX_PLOT_WIDTH) {
        return Err(AppError::BadRequest(format!(
            "Invalid 'width' parameter: must be in (0, {}]",
            MAX_PLOT_WIDTH
        )));
    }

    tracing::debug!(account_id, %date, fallback = ?params.fallback, "Building account report");

    let report = AccountReporter::new(state.db.clone(), width)
        .account_day(account_id, date, params.fallback)
        .await?;
    Ok(Json(report))
}
