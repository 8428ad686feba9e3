use anyhow::Result;
use clap::{Parser, Subcommand};
use rove_node::config::{self, NodeConfig};
use rove_node::context::NodeContext;
use rove_node::local::{EchoGenerator, IntervalRoundClock, LocalSurface};
use rove_node::node;
use rove_node::orchestrator::RoundOrchestrator;
use rove_proofs::{JsonFileStore, MemoryContentStore};
use rove_session::FatalReason;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rove")]
#[command(about = "Rove - decentralized collection task node", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the node
    Start {
        /// Data directory for persisted proofs and session state
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Round length in seconds for the local round clock
        #[arg(long, default_value = "60")]
        round_secs: i64,
    },

    /// Write a default configuration file
    Init {
        /// Output directory for the configuration
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("rove={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Init { output } => {
            let path = output.join("rove-config.toml");
            NodeConfig::default().save_to_file(&path)?;
            info!("Wrote default configuration to {}", path.display());
            Ok(())
        }
        Commands::Start {
            data_dir,
            round_secs,
        } => start(cli.config, data_dir, round_secs).await,
    }
}

async fn start(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    round_secs: i64,
) -> Result<()> {
    // Priority order: CLI args > ENV vars > config file > defaults
    let mut config = if let Some(path) = config_path {
        NodeConfig::from_file(&path)?
    } else if Path::new("./rove-config.toml").exists() {
        NodeConfig::from_file(Path::new("./rove-config.toml"))?
    } else {
        NodeConfig::default()
    };
    config.apply_env_overrides();
    if let Some(data_dir) = data_dir {
        config.node.data_dir = data_dir;
    }

    let credentials = config::credentials_from_env()?;

    std::fs::create_dir_all(&config.node.data_dir)?;
    let store = Arc::new(JsonFileStore::open(&config.node.data_dir)?);
    let cas = Arc::new(MemoryContentStore::new());
    let surface = Arc::new(LocalSurface::new(&credentials.username));
    let audit_surface = Arc::new(surface.linked_view());

    let ctx = NodeContext::new(
        surface,
        audit_surface,
        Arc::new(EchoGenerator),
        store,
        cas,
        credentials,
        &config,
    );
    let orchestrator = RoundOrchestrator::new(ctx);
    let clock = IntervalRoundClock::starting_now(round_secs);

    info!(
        name = %config.node.name,
        data_dir = %config.node.data_dir.display(),
        "🚀 Rove node starting"
    );

    tokio::select! {
        result = node::run(
            &orchestrator,
            &clock,
            Duration::from_secs(config.node.round_poll_secs),
        ) => {
            if let Err(e) = result {
                match e.fatal_reason() {
                    Some(FatalReason::CredentialsRejected) => {
                        error!(
                            "Surface rejected the configured credentials; \
                             check ROVE_USERNAME and ROVE_PASSWORD"
                        );
                    }
                    Some(FatalReason::UnrecoverableChallenge) => {
                        error!(
                            "Surface raised a verification challenge that could not \
                             be satisfied; set ROVE_VERIFICATION"
                        );
                    }
                    Some(FatalReason::RetriesExhausted) => {
                        error!("Could not establish a session after repeated attempts");
                    }
                    None => return Err(e.into()),
                }
                std::process::exit(1);
            }
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping");
            Ok(())
        }
    }
}
