//! Operator command handler

use crate::{AppResult, AppError};
use crate::extract::Json;
use crate::middleware::auth::ControlAccess;
use crate::models::{CommandRequest, CommandResponse};

/// Acknowledge an operator command. No control action is taken.
pub async fn acknowledge(
    _access: ControlAccess,
    Json(req): Json<CommandRequest>,
) -> AppResult<Json<CommandResponse>> {
    let zone_id = req.zone_id().ok_or_else(|| AppError::missing("zoneId"))?;

    tracing::info!(zone = %zone_id, action = %req.action, "Command received");

    Ok(Json(CommandResponse {
        success: true,
        zone_id,
        action: req.action,
    }))
}
