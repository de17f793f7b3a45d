//! Telemetry handlers

use axum::extract::State;

use crate::{AppState, AppResult, AppError};
use crate::extract::Json;
use super::blocking;
use crate::models::{zone_id_of, TelemetryAccepted, TelemetryPayload, TelemetrySnapshots};

/// Receive telemetry from a zone producer
pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<TelemetryPayload>,
) -> AppResult<Json<TelemetryAccepted>> {
    let zone_id = zone_id_of(&payload).ok_or_else(|| AppError::missing("zoneId"))?;

    let engine = state.engine.clone();
    let zone = zone_id.clone();
    blocking(move || engine.ingest(&zone, payload)).await?;

    Ok(Json(TelemetryAccepted {
        message: "Telemetry stored",
        zone_id,
    }))
}

/// Latest telemetry of every zone
pub async fn list(State(state): State<AppState>) -> Json<TelemetrySnapshots> {
    Json(state.engine.snapshots())
}
