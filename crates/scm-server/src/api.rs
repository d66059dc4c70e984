//! Wire-level data transfer objects and response wrappers.
//!
//! `scm-core`'s domain types that are already `Serialize`/`Deserialize`
//! (`StorageReport`, `LayoutInfo`, `OperationalState`, ...) are reused
//! directly; request/response envelopes that `scm-core` deliberately keeps
//! free of a serde dependency (`RegisterRequest`, `HeartbeatRequest`) get a
//! thin wire counterpart here.

use scm_core::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Standard API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self { data, success: true }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequestDto {
    pub uuid: Uuid,
    pub host_name: String,
    pub ip_address: String,
    pub node_report: Vec<StorageReport>,
    pub layout: LayoutInfo,
}

impl From<RegisterRequestDto> for RegisterRequest {
    fn from(dto: RegisterRequestDto) -> Self {
        Self {
            uuid: dto.uuid,
            host_name: dto.host_name,
            ip_address: dto.ip_address,
            node_report: dto.node_report,
            layout: dto.layout,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponseDto {
    pub error_code: &'static str,
    pub identity: DatanodeIdentity,
    pub cluster_id: String,
}

impl From<RegisterResponse> for RegisterResponseDto {
    fn from(response: RegisterResponse) -> Self {
        let error_code = match response.error_code {
            RegisterErrorCode::Success => "SUCCESS",
            RegisterErrorCode::ErrorNodeNotPermitted => "ERROR_NODE_NOT_PERMITTED",
        };
        Self {
            error_code,
            identity: response.identity,
            cluster_id: response.cluster_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequestDto {
    pub uuid: Uuid,
    pub layout: LayoutInfo,
    pub reported_op_state: OperationalState,
    pub reported_op_state_expiry_epoch_sec: i64,
    pub command_queue_report: Option<HashMap<CommandType, i64>>,
}

impl From<HeartbeatRequestDto> for HeartbeatRequest {
    fn from(dto: HeartbeatRequestDto) -> Self {
        Self {
            uuid: dto.uuid,
            layout: dto.layout,
            reported_op_state: dto.reported_op_state,
            reported_op_state_expiry_epoch_sec: dto.reported_op_state_expiry_epoch_sec,
            command_queue_report: dto.command_queue_report,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersionResponseDto {
    pub version: String,
    pub scm_id: String,
    pub cluster_id: String,
}

impl From<VersionInfo> for VersionResponseDto {
    fn from(info: VersionInfo) -> Self {
        Self {
            version: info.version,
            scm_id: info.scm_id,
            cluster_id: info.cluster_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NodeStatusDto {
    pub uuid: Uuid,
    pub host_name: String,
    pub ip_address: String,
    pub operational_state: OperationalState,
    pub health: HealthState,
    pub op_state_expiry_epoch_sec: i64,
}

#[derive(Debug, Serialize)]
pub struct ClusterStatDto {
    pub capacity: u64,
    pub used: u64,
    pub remaining: u64,
}

impl From<UsageTotals> for ClusterStatDto {
    fn from(totals: UsageTotals) -> Self {
        Self {
            capacity: totals.capacity,
            used: totals.used,
            remaining: totals.remaining,
        }
    }
}
