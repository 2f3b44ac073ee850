//! agentwire - streaming session backend for checkpointed conversational agents.
//!
//! Main entry point for the agentwire CLI and server.

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use agentwire_api::{ApiServer, AppState, ServerOptions};
use agentwire_checkpoint::{open_durable, CheckpointerProvider};
use agentwire_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig, WorkflowLocators};
use agentwire_runtime::{SessionOrchestrator, WorkflowCatalog, WorkflowRegistry};

use cli::{Cli, Commands};

/// Get the .agentwire directory path.
fn agentwire_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".agentwire"))
        .unwrap_or_else(|| PathBuf::from(".agentwire"))
}

/// Initialize tracing with console and optional file output.
///
/// Log files are written to `~/.agentwire/logs/` with daily rotation.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = if logging.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).with_ansi(true).boxed()
    };

    let file = if logging.file_logs {
        let log_dir = match &logging.log_dir {
            Some(dir) => PathBuf::from(ConfigLoader::expand_path(&dir.to_string_lossy())),
            None => agentwire_dir().join("logs"),
        };
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("creating log directory {}", log_dir.display()))?;

        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("agentwire")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&log_dir)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // Keeps the writer flushing for the life of the process.
        static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
            std::sync::OnceLock::new();
        let _ = GUARD.set(guard);

        Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    init_tracing(&config.logging)?;

    let work_dir = match cli.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving working directory")?,
    };

    match cli.command {
        None => run_server(config, &work_dir, None, None).await,
        Some(Commands::Run { host, port }) => run_server(config, &work_dir, host, port).await,
        Some(Commands::InitCheckpointer) => init_checkpointer(&config).await,
        Some(Commands::Workflows) => list_workflows(&config, &work_dir),
    }
}

/// Validate the configuration and its resolved locators, logging warnings.
fn validate(config: &Config, locators: &WorkflowLocators) -> anyhow::Result<()> {
    let warnings = ConfigValidator::validate(config)?.into_result()?;
    let locator_warnings = ConfigValidator::validate_locators(config, locators)?.into_result()?;
    for warning in warnings.iter().chain(&locator_warnings) {
        warn!("{}: {}", warning.path, warning.message);
    }
    Ok(())
}

/// Run the server in foreground.
async fn run_server(
    mut config: Config,
    work_dir: &Path,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    info!("Starting agentwire v{}", env!("CARGO_PKG_VERSION"));
    info!("Working directory: {}", work_dir.display());

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let locators = WorkflowLocators::resolve(&config.workflows, work_dir)?;
    validate(&config, &locators)?;

    let registry = Arc::new(WorkflowRegistry::new(locators, WorkflowCatalog::with_builtins()));
    info!("Workflows: {}", registry.names().join(", "));

    let checkpointer = Arc::new(CheckpointerProvider::from_config(&config.checkpoint));
    let orchestrator = Arc::new(SessionOrchestrator::new(
        registry,
        checkpointer,
        config.workflows.default_agent.clone(),
    ));

    let server = ApiServer::new(ServerOptions::from(&config.server), Arc::new(AppState::new(orchestrator)));

    info!("agentwire ready:");
    info!("  WebSocket:     ws://{}/ws", server.addr());
    info!("  Chat history:  http://{}/chat-history/{{thread_id}}", server.addr());
    info!("  Health:        http://{}/health", server.addr());

    server.run().await?;

    info!("Shutting down...");
    Ok(())
}

/// Create the checkpoint schema in the durable store.
async fn init_checkpointer(config: &Config) -> anyhow::Result<()> {
    let var = &config.checkpoint.db_uri_env;
    let uri = match std::env::var(var) {
        Ok(uri) if !uri.trim().is_empty() => uri,
        _ => bail!("{} is not set; nothing to initialize", var),
    };

    let store = open_durable(&uri)
        .await
        .with_context(|| format!("initializing checkpoint store from {}", var))?;
    info!(backend = store.backend(), "Checkpoint schema ready");
    println!("Checkpoint store initialized ({})", store.backend());
    Ok(())
}

/// Print configured workflows and whether a built-in constructor backs them.
fn list_workflows(config: &Config, work_dir: &Path) -> anyhow::Result<()> {
    let registry =
        WorkflowRegistry::from_config(&config.workflows, work_dir, WorkflowCatalog::with_builtins())?;

    let names = registry.names();
    if names.is_empty() {
        println!("No workflows configured.");
        return Ok(());
    }

    println!("{:<24} {:<48} STATUS", "NAME", "LOCATOR");
    for name in names {
        let locator = registry.locator(&name).unwrap_or_default();
        let status = match registry.resolve(&name) {
            Ok(_) => "ok".to_string(),
            Err(e) => e.to_string(),
        };
        let marker = if name == config.workflows.default_agent { " (default)" } else { "" };
        println!("{:<24} {:<48} {}{}", name, locator, status, marker);
    }
    Ok(())
}
