//! Protection handlers

use axum::extract::State;

use crate::{AppState, AppResult, AppError};
use crate::extract::Json;
use crate::middleware::auth::ControlAccess;
use super::blocking;
use crate::models::{ProtectionResponse, ProtectionStates, SetProtectionRequest, SimulateBreakRequest};

/// Protection state of every known zone
pub async fn list(State(state): State<AppState>) -> Json<ProtectionStates> {
    Json(state.engine.protection_states())
}

/// Enable or disable auto-protection for a zone
pub async fn set(
    State(state): State<AppState>,
    _access: ControlAccess,
    Json(req): Json<SetProtectionRequest>,
) -> AppResult<Json<ProtectionResponse>> {
    let zone_id = req.zone_id().ok_or_else(|| AppError::missing("zoneId"))?;

    let engine = state.engine.clone();
    let zone = zone_id.clone();
    let enabled = req.enabled;
    let record = blocking(move || engine.set_protection(&zone, enabled)).await?;

    Ok(Json(ProtectionResponse {
        success: true,
        zone_id,
        state: record,
    }))
}

/// Inject a synthetic line break for testing the protection path
pub async fn simulate_break(
    State(state): State<AppState>,
    _access: ControlAccess,
    Json(req): Json<SimulateBreakRequest>,
) -> AppResult<Json<ProtectionResponse>> {
    let zone_id = req.zone_id().ok_or_else(|| AppError::missing("zoneId"))?;
    let substation = req.substation();

    let engine = state.engine.clone();
    let zone = zone_id.clone();
    let outcome = blocking(move || engine.simulate_break(&zone, substation.as_deref())).await?;

    Ok(Json(ProtectionResponse {
        success: true,
        zone_id,
        state: outcome.state,
    }))
}
