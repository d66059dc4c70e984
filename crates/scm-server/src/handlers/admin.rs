//! Read-only admin/management surface (spec.md §6 "Observable management
//! surface"): per-node status, cluster usage totals, and version info.

use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::api::{ApiResponse, ClusterStatDto, NodeStatusDto, VersionResponseDto};
use crate::handlers::ServerResult;
use crate::server::AppState;

pub async fn list_nodes(
    State(app_state): State<AppState>,
) -> ServerResult<Json<ApiResponse<Vec<NodeStatusDto>>>> {
    let nodes = app_state
        .registry
        .get_all_nodes(None, None)
        .into_iter()
        .map(|record| NodeStatusDto {
            uuid: record.identity.uuid,
            host_name: record.identity.host_name.clone(),
            ip_address: record.identity.ip_address.clone(),
            operational_state: record.persisted_op_state,
            health: record.health,
            op_state_expiry_epoch_sec: record.op_state_expiry_epoch_sec,
        })
        .collect();
    Ok(Json(ApiResponse::success(nodes)))
}

pub async fn get_node(
    State(app_state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ServerResult<Json<ApiResponse<NodeStatusDto>>> {
    let record = app_state.registry.get_node_by_uuid(uuid)?;
    let dto = NodeStatusDto {
        uuid: record.identity.uuid,
        host_name: record.identity.host_name,
        ip_address: record.identity.ip_address,
        operational_state: record.persisted_op_state,
        health: record.health,
        op_state_expiry_epoch_sec: record.op_state_expiry_epoch_sec,
    };
    Ok(Json(ApiResponse::success(dto)))
}

pub async fn cluster_stat(
    State(app_state): State<AppState>,
) -> ServerResult<Json<ApiResponse<ClusterStatDto>>> {
    let totals = app_state.registry.cluster_stat();
    Ok(Json(ApiResponse::success(totals.into())))
}

pub async fn version(
    State(app_state): State<AppState>,
) -> ServerResult<Json<ApiResponse<VersionResponseDto>>> {
    Ok(Json(ApiResponse::success(
        app_state.registry.get_version().into(),
    )))
}
