//! Reunite daemon: entry point for the verification service.

mod config;
mod shutdown;

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use reunite_nullables::NullCaseStore;
use reunite_rpc::RpcServer;
use reunite_store::CaseStore;
use reunite_store_lmdb::LmdbEnvironment;
use reunite_types::SystemClock;
use reunite_utils::{init_logging, LogFormat};
use reunite_verification::{CaseWorkflow, TracingNotifier};
use tracing::{info, warn};

use crate::config::{ConfigOverrides, ServiceConfig, StorageBackend};

#[derive(Parser)]
#[command(name = "reunite-daemon", about = "Pet ownership verification service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "REUNITE_CONFIG")]
    config: Option<PathBuf>,

    /// Address the HTTP API binds to.
    #[arg(long, env = "REUNITE_LISTEN_ADDR")]
    listen_addr: Option<IpAddr>,

    /// HTTP API port.
    #[arg(long, env = "REUNITE_PORT")]
    port: Option<u16>,

    /// Allow cross-origin requests.
    #[arg(long, env = "REUNITE_ENABLE_CORS")]
    cors: bool,

    /// Storage backend: "lmdb" or "memory".
    #[arg(long, env = "REUNITE_STORAGE")]
    storage: Option<StorageBackend>,

    /// Data directory for the LMDB environment.
    #[arg(long, env = "REUNITE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LMDB map size in bytes.
    #[arg(long, env = "REUNITE_MAP_SIZE")]
    map_size: Option<usize>,

    /// Log format: "human" or "json".
    #[arg(long, env = "REUNITE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "REUNITE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP API until SIGINT/SIGTERM.
    Serve,
    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<ServiceConfig> {
        let base = match &self.config {
            Some(path) => ServiceConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServiceConfig::default(),
        };
        let config = base.apply(ConfigOverrides {
            listen_addr: self.listen_addr,
            port: self.port,
            enable_cors: self.cors,
            storage: self.storage,
            data_dir: self.data_dir.clone(),
            map_size: self.map_size,
            log_format: self.log_format,
            log_level: self.log_level.clone(),
        })?;
        Ok(config)
    }
}

fn open_store(config: &ServiceConfig) -> anyhow::Result<Arc<dyn CaseStore>> {
    match config.storage {
        StorageBackend::Lmdb => {
            let env = LmdbEnvironment::open(&config.data_dir, config.map_size)
                .with_context(|| format!("opening LMDB at {}", config.data_dir.display()))?;
            let store = env.case_store();
            let cases = store.case_count().context("counting stored cases")?;
            info!(
                path = %config.data_dir.display(),
                schema = env.schema_version().context("reading schema version")?,
                cases,
                "case store ready"
            );
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage; cases are lost on exit");
            Ok(Arc::new(NullCaseStore::new()))
        }
    }
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let store = open_store(&config)?;
    let workflow = Arc::new(CaseWorkflow::new(
        store,
        Arc::new(SystemClock),
        Arc::new(TracingNotifier),
        config.limits.clone(),
    ));

    info!(
        addr = %config.socket_addr(),
        storage = ?config.storage,
        "starting Reunite daemon"
    );
    RpcServer::new(config.socket_addr())
        .with_cors(config.enable_cors)
        .start(workflow, shutdown::shutdown_signal())
        .await?;

    info!("Reunite daemon exited cleanly");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    match cli.command {
        Command::PrintConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        Command::Serve => {
            init_logging(config.log_format, &config.log_level)?;
            serve(config).await
        }
    }
}
