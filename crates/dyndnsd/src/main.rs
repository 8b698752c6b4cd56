// # dyndnsd - Dynamic DNS Daemon
//
// A thin integration layer: it reads configuration, wires the HTTP transport,
// the IP source and the Cloudflare reconciler into a `DyndnsEngine`, and runs
// the engine until SIGINT/SIGTERM. All DNS logic lives in the library crates.
//
// ## Configuration
//
// ### Environment
// - `CF_token`: Cloudflare API token (required)
// - `Domain`: Zone name, e.g. `example.com` (required)
// - `Subdomain`: Record label, e.g. `home` (required)
// - `CF_proxy_disabled`: When set (to any value), the record is not proxied
//
// ### Flags
// - `--freq <hours>` / `DYNDNS_FREQ_HOURS`: Update frequency (default 2)
// - `--log-level <level>` / `DYNDNS_LOG_LEVEL`: trace, debug, info, warn, error
// - `--ip-url <url>` / `DYNDNS_IP_URL`: JSON IP service (default ipify)
//
// ## Example
//
// ```bash
// export CF_token=your_token
// export Domain=example.com
// export Subdomain=home
//
// dyndnsd --freq 1
// ```

use anyhow::Result;
use clap::Parser;
use dyndns_core::traits::HttpTransport;
use dyndns_core::{DyndnsConfig, DyndnsEngine, ReqwestTransport};
use dyndns_ip_http::HttpIpSource;
use dyndns_provider_cloudflare::CloudflareReconciler;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DyndnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DyndnsExitCode> for ExitCode {
    fn from(code: DyndnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Parser, Debug)]
#[command(name = "dyndnsd")]
#[command(about = "Keeps a Cloudflare A record pointed at this host's public IPv4 address", long_about = None)]
#[command(version)]
struct Args {
    /// IP update frequency in hours
    #[arg(
        long,
        env = "DYNDNS_FREQ_HOURS",
        default_value_t = 2,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    freq: u64,

    /// Maximum log level
    #[arg(long, env = "DYNDNS_LOG_LEVEL", default_value_t = Level::INFO)]
    log_level: Level,

    /// Service answering `{"ip": "..."}` with the public address
    #[arg(long, env = "DYNDNS_IP_URL")]
    ip_url: Option<String>,
}

impl Args {
    fn interval(&self) -> Duration {
        Duration::from_secs(self.freq.saturating_mul(3600))
    }
}

/// Combine the environment with the command line and validate the result
fn load_config(args: &Args) -> Result<DyndnsConfig> {
    let mut config = DyndnsConfig::from_env()?.with_interval(args.interval());
    if let Some(url) = &args.ip_url {
        config = config.with_ip_url(url.as_str());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DyndnsExitCode::ConfigError.into();
    }

    let config = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DyndnsExitCode::ConfigError.into();
        }
    };

    info!("Starting dyndnsd daemon");
    info!("Configuration loaded: {:?}", config);

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DyndnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let (engine, events) = match build_engine(config) {
            Ok(parts) => parts,
            Err(e) => {
                error!("Startup error: {}", e);
                return DyndnsExitCode::ConfigError;
            }
        };

        if let Err(e) = run_daemon(engine, events).await {
            error!("Daemon error: {}", e);
            DyndnsExitCode::RuntimeError
        } else {
            DyndnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Wire the transport, IP source and reconciler into an engine
fn build_engine(
    config: DyndnsConfig,
) -> Result<(DyndnsEngine, mpsc::Receiver<dyndns_core::EngineEvent>)> {
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::with_default_timeout()?);

    let ip_source = HttpIpSource::with_url(transport.clone(), config.ip_url.clone());
    let reconciler = CloudflareReconciler::new(transport);
    info!("IP source: {:?}", ip_source);
    info!("Provider: {:?}", reconciler);

    Ok(DyndnsEngine::new(
        Box::new(ip_source),
        Box::new(reconciler),
        config,
    )?)
}

/// Run the engine until a shutdown signal arrives
async fn run_daemon(
    engine: DyndnsEngine,
    mut events: mpsc::Receiver<dyndns_core::EngineEvent>,
) -> Result<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let signals = tokio::spawn(async move {
        let received = wait_for_shutdown().await;
        // The engine stops either way; a failed handler is reported below
        let _ = shutdown_tx.send(());
        received
    });

    engine.run_until_shutdown(shutdown_rx).await?;

    let signal = signals.await??;
    info!("Received shutdown signal: {}", signal);
    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received, or an error if the handlers could
/// not be installed.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
