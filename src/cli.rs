//! CLI definitions for agentwire.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// agentwire CLI.
#[derive(Parser)]
#[command(name = "agentwire")]
#[command(about = "Streaming session backend for checkpointed conversational agents")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Working directory used to locate langgraph.json
    #[arg(short, long, global = true)]
    pub work_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the server in foreground (default)
    Run {
        /// Server host, overrides `server.host`
        #[arg(long, env = "AGENTWIRE_HOST")]
        host: Option<String>,

        /// Server port, overrides `server.port`
        #[arg(long, env = "AGENTWIRE_PORT")]
        port: Option<u16>,
    },

    /// Create the checkpoint schema in the durable store
    InitCheckpointer,

    /// List configured workflows
    Workflows,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_overrides() {
        let cli = Cli::try_parse_from(["agentwire", "run", "--host", "0.0.0.0", "--port", "2024"])
            .unwrap();
        match cli.command {
            Some(Commands::Run { host, port }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(2024));
            }
            _ => panic!("expected run"),
        }
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["agentwire", "init-checkpointer", "-c", "prod.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::InitCheckpointer)));
        assert_eq!(cli.config, PathBuf::from("prod.toml"));

        let cli = Cli::try_parse_from(["agentwire", "workflows"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Workflows)));

        let cli = Cli::try_parse_from(["agentwire"]).unwrap();
        assert!(cli.command.is_none());
    }
}
