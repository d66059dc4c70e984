//! `register` RPC handler (§4.5).

use axum::{extract::State, response::Json};
use tracing::info;

use crate::api::{ApiResponse, RegisterRequestDto, RegisterResponseDto};
use crate::handlers::ServerResult;
use crate::server::AppState;

pub async fn register(
    State(app_state): State<AppState>,
    Json(request): Json<RegisterRequestDto>,
) -> ServerResult<Json<ApiResponse<RegisterResponseDto>>> {
    let uuid = request.uuid;
    let response = app_state.registry.register(request.into());
    info!(dn_uuid = %uuid, error_code = ?response.error_code, "register");
    Ok(Json(ApiResponse::success(response.into())))
}
