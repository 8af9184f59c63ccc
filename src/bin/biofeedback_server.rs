//! Biofeedback streaming server entry point

use biofeedback_core::config::{write_config, ConfigError, ConfigLoader, SystemConfig};
use biofeedback_core::error::BiofeedbackResult;
use biofeedback_core::hal::simulation::Scenario;
use biofeedback_core::server::BiofeedbackServer;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "biofeedback-server", version, about = "Biofeedback simulation WebSocket server")]
struct Args {
    /// Extra TOML configuration file, applied after the default search paths
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listen host
    #[arg(long, env = "BIOFEEDBACK_HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(long, env = "BIOFEEDBACK_PORT")]
    port: Option<u16>,

    /// Streaming frequency in Hz (0.1 to 50)
    #[arg(long, value_name = "HZ")]
    frequency: Option<f64>,

    /// Initial simulation scenario
    #[arg(long, value_name = "NAME")]
    scenario: Option<Scenario>,

    /// Seed for reproducible signals
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for the session file written at shutdown
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Write the effective configuration as TOML and exit
    #[arg(long, value_name = "PATH")]
    export_config: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut SystemConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(hz) = self.frequency {
            config.server.stream_frequency_hz = hz;
        }
        if let Some(scenario) = self.scenario {
            config.simulation.initial_scenario = scenario;
        }
        if let Some(seed) = self.seed {
            config.simulation.rng_seed = Some(seed);
        }
        if let Some(dir) = &self.output_dir {
            config.session.output_dir = dir.clone();
        }
    }
}

fn load_config(args: &Args) -> BiofeedbackResult<SystemConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader.require_file(path)?;
    }

    let mut config = loader.load_system_config()?;
    args.apply(&mut config);
    if let Err(errors) = config.validate() {
        return Err(ConfigError::Validation(errors).into());
    }
    Ok(config)
}

async fn run(args: Args) -> BiofeedbackResult<()> {
    let config = load_config(&args)?;

    if let Some(path) = &args.export_config {
        write_config(&config, path)?;
        info!(path = %path.display(), "Configuration exported");
        return Ok(());
    }

    let summary = config.get_summary();
    info!(
        address = %summary.bind_address,
        frequency_hz = summary.stream_frequency_hz,
        scenario = %summary.initial_scenario,
        seeded = summary.seeded,
        "Starting biofeedback server"
    );

    let server = BiofeedbackServer::bind(config).await?;
    let shutdown = CancellationToken::new();

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
        signal.cancel();
    });

    if let Some(path) = server.serve(shutdown).await? {
        info!(path = %path.display(), "Session saved");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server terminated with error");
            ExitCode::FAILURE
        }
    }
}
