//! `scm-cli`: admin command-line interface for the datanode registry.

mod commands;
mod runtime;

use anyhow::Result;
use clap::Parser;

/// Datanode registry admin CLI.
#[derive(Parser, Debug)]
#[command(name = "scm-cli")]
#[command(about = "Admin CLI for the datanode registry")]
#[command(version)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Register this many synthetic datanodes before running the command.
    #[arg(long, default_value_t = 0)]
    seed: u32,

    #[command(subcommand)]
    command: commands::Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().init();
    }

    let registry = runtime::build_registry(cli.seed);
    commands::run(&registry, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_list_nodes() {
        let cli = Cli::try_parse_from(["scm-cli", "list-nodes"]).unwrap();
        assert!(matches!(cli.command, commands::Commands::ListNodes));
    }

    #[test]
    fn cli_parses_show_node() {
        let uuid = uuid::Uuid::new_v4();
        let cli = Cli::try_parse_from(["scm-cli", "show-node", &uuid.to_string()]).unwrap();
        match cli.command {
            commands::Commands::ShowNode { uuid: parsed } => assert_eq!(parsed, uuid),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_set_opstate_with_expiry() {
        let uuid = uuid::Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "scm-cli",
            "set-opstate",
            &uuid.to_string(),
            "in-maintenance",
            "--expiry",
            "123",
        ])
        .unwrap();
        match cli.command {
            commands::Commands::SetOpstate { uuid: parsed, expiry, .. } => {
                assert_eq!(parsed, uuid);
                assert_eq!(expiry, 123);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_missing_subcommand() {
        assert!(Cli::try_parse_from(["scm-cli"]).is_err());
    }

    #[test]
    fn cli_seed_defaults_to_zero() {
        let cli = Cli::try_parse_from(["scm-cli", "stats"]).unwrap();
        assert_eq!(cli.seed, 0);
    }
}
