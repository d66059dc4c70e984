//! `processHeartbeat` RPC handler (§4.4).

use axum::{extract::State, response::Json};
use scm_core::prelude::SCMCommand;

use crate::api::{ApiResponse, HeartbeatRequestDto};
use crate::handlers::ServerResult;
use crate::server::AppState;

pub async fn heartbeat(
    State(app_state): State<AppState>,
    Json(request): Json<HeartbeatRequestDto>,
) -> ServerResult<Json<ApiResponse<Vec<SCMCommand>>>> {
    let commands = app_state.registry.process_heartbeat(request.into());
    Ok(Json(ApiResponse::success(commands)))
}
