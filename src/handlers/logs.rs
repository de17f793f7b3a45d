//! Event log handlers

use axum::extract::State;
use chrono::Utc;

use crate::{AppState, AppResult};
use crate::extract::{Json, Query};
use super::blocking;
use crate::models::{LogAppended, LogEntry, LogQuery, LogRange, LogSummary, NewLogEntry, SummaryQuery};
use crate::store::log_store::DEFAULT_SUMMARY_DAYS;

/// Store a fault/warning/info event
pub async fn append(
    State(state): State<AppState>,
    Json(req): Json<NewLogEntry>,
) -> AppResult<Json<LogAppended>> {
    let entry = req.into_entry(Utc::now())?;
    let engine = state.engine.clone();
    let entry = blocking(move || Ok(engine.logs().append(entry))).await?;

    Ok(Json(LogAppended {
        success: true,
        entry,
    }))
}

/// List events, optionally bounded by `start` / `end`
pub async fn query(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<Vec<LogEntry>>> {
    let range = LogRange::try_from(query)?;
    Ok(Json(state.engine.logs().query(&range)))
}

/// Per-zone daily counts for the last `days` days
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Json<LogSummary> {
    let days = query.days.unwrap_or(DEFAULT_SUMMARY_DAYS);
    Json(state.engine.logs().summarize(days))
}
