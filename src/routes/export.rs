// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! XML export download.

use crate::error::Result;
use crate::services::ActivityExporter;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/export/{account_id}", get(export_account))
}

/// Download an account's activity history as XML.
async fn export_account(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<u64>,
) -> Result<impl IntoResponse> {
    let document = ActivityExporter::new(state.db.clone())
        .export_account(account_id)
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/xml; charset=ISO-8859-1".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.body,
    ))
}
