//! Subcommand implementations.

use anyhow::{Context, Result, anyhow};
use clap::Subcommand;
use scm_core::models::OperationalState;
use scm_core::registry::NodeRegistry;
use serde_json::json;
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every datanode the registry currently tracks.
    ListNodes,
    /// Show one datanode's identity, operational state, and health.
    ShowNode {
        /// Datanode UUID.
        uuid: Uuid,
    },
    /// Administratively set a datanode's operational state.
    SetOpstate {
        /// Datanode UUID.
        uuid: Uuid,
        /// New operational state.
        #[arg(value_enum)]
        state: OpStateArg,
        /// Expiry, in epoch seconds (`0` for states with no expiry).
        #[arg(long, default_value_t = 0)]
        expiry: i64,
    },
    /// Print cluster-wide usage totals.
    Stats,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum OpStateArg {
    InService,
    Decommissioning,
    Decommissioned,
    EnteringMaintenance,
    InMaintenance,
}

impl From<OpStateArg> for OperationalState {
    fn from(arg: OpStateArg) -> Self {
        match arg {
            OpStateArg::InService => Self::InService,
            OpStateArg::Decommissioning => Self::Decommissioning,
            OpStateArg::Decommissioned => Self::Decommissioned,
            OpStateArg::EnteringMaintenance => Self::EnteringMaintenance,
            OpStateArg::InMaintenance => Self::InMaintenance,
        }
    }
}

pub fn run(registry: &NodeRegistry, command: Commands) -> Result<()> {
    match command {
        Commands::ListNodes => list_nodes(registry),
        Commands::ShowNode { uuid } => show_node(registry, uuid),
        Commands::SetOpstate { uuid, state, expiry } => {
            set_opstate(registry, uuid, state.into(), expiry)
        }
        Commands::Stats => stats(registry),
    }
}

fn list_nodes(registry: &NodeRegistry) -> Result<()> {
    let nodes = registry.get_all_nodes(None, None);
    let rows: Vec<_> = nodes
        .iter()
        .map(|record| {
            json!({
                "uuid": record.identity.uuid,
                "host_name": record.identity.host_name,
                "operational_state": record.persisted_op_state,
                "health": record.health,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn show_node(registry: &NodeRegistry, uuid: Uuid) -> Result<()> {
    let record = registry
        .get_node_by_uuid(uuid)
        .map_err(|error| anyhow!("{error}"))
        .with_context(|| format!("no such datanode: {uuid}"))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn set_opstate(
    registry: &NodeRegistry,
    uuid: Uuid,
    state: OperationalState,
    expiry: i64,
) -> Result<()> {
    registry
        .set_node_operational_state(uuid, state, expiry)
        .map_err(|error| anyhow!("{error}"))
        .with_context(|| format!("failed to set operational state for {uuid}"))?;
    println!("ok");
    Ok(())
}

fn stats(registry: &NodeRegistry) -> Result<()> {
    let totals = registry.cluster_stat();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "capacity": totals.capacity,
            "used": totals.used,
            "remaining": totals.remaining,
        }))?
    );
    Ok(())
}
