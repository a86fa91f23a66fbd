//! Albor Space 5G GNodeB Main Application
//!
//! Runs the NR RRC control plane of a single cell: loads the configuration,
//! builds the protocol stack and drives the RRC timers until shutdown.

mod config;
mod stack;

use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use config::GnbConfig;
use layers::ngap::NgapLayer;
use layers::rrc::RrcMacInterface;

/// Albor Space 5G GNodeB
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, default_value = "gnb.yml")]
    config: String,

    /// Log level (trace, debug, info, warn, error), overrides the configuration file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Physical Cell ID (0-1007), overrides the configuration file
    #[arg(long)]
    pci: Option<u16>,

    /// Run as a standalone (SA) cell
    #[arg(long)]
    standalone: bool,
}

fn init_logging(args: &Args, cfg: &GnbConfig) -> Result<()> {
    let directive = args.log_level.clone().unwrap_or_else(|| cfg.log.filter_directive());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    match &cfg.log.filename {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            builder.with_ansi(false).with_writer(std::sync::Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut gnb_cfg = GnbConfig::from_file(&args.config)?;
    if let Some(pci) = args.pci {
        gnb_cfg.cell_cfg.pci = pci;
    }
    if args.standalone {
        gnb_cfg.rrc.standalone = true;
    }

    init_logging(&args, &gnb_cfg)?;

    info!("Starting Albor Space 5G GNodeB");
    info!("Configuration file: {}", args.config);

    let rrc_cfg = gnb_cfg.to_rrc_config()?;
    let cell = rrc_cfg.pscell()?;
    info!("Cell configuration:");
    info!("  PCI: {}", cell.pci);
    info!("  Cell ID: 0x{:x}", cell.cell_id);
    info!("  DL ARFCN: {} (band {})", cell.dl_arfcn, cell.band);
    info!("  Bandwidth: {} PRBs at {} kHz", cell.nof_prb, cell.scs.khz());
    info!("  Mode: {}", if rrc_cfg.is_standalone { "SA" } else { "NSA" });

    let ngap = Arc::new(NgapLayer::new(gnb_cfg.ngap_config()?));
    if gnb_cfg.cu_cp.amf.no_core {
        ngap.set_connected(true);
    } else {
        warn!(
            "No NG association towards {}, RRC connections will be rejected",
            ngap.config().amf_address
        );
    }

    let rrc = stack::build_rrc(rrc_cfg, ngap.clone()).map_err(|e| anyhow!("RRC init failed: {}", e))?;
    let mib_len = rrc.read_master_info(0)?.len();
    info!("GNodeB initialized successfully (MIB {} B)", mib_len);

    let rrc = Arc::new(Mutex::new(rrc));
    let running = Arc::new(AtomicBool::new(true));

    let timer_handle = tokio::spawn(stack::run_timers(rrc.clone(), running.clone()));

    // Start statistics reporting
    let stats_handle = {
        let rrc = rrc.clone();
        let running = running.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(5));

            while running.load(Ordering::SeqCst) {
                interval.tick().await;

                let metrics = rrc.lock().await.get_metrics();
                info!("RRC Statistics: {} user(s)", metrics.len());
                for ue in &metrics {
                    match serde_json::to_string(ue) {
                        Ok(json) => info!("  {}", json),
                        Err(e) => error!("Failed to render metrics: {}", e),
                    }
                }
            }
        })
    };

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");

    // Shutdown
    info!("Shutting down GNodeB");
    running.store(false, Ordering::SeqCst);
    rrc.lock().await.stop();

    // Wait for tasks to complete
    let _ = tokio::time::timeout(tokio::time::Duration::from_secs(5), timer_handle).await;
    stats_handle.abort();

    info!("GNodeB shutdown complete");
    Ok(())
}
