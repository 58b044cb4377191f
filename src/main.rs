//! Fellowship live dashboard
//!
//! Loads the dashboard, polls the backend for attendance and redraws the
//! terminal until Ctrl-C.

use clap::Parser;
use fellowship_attendance::render::DashboardView;
use fellowship_attendance::{
    logging, AttendanceViewModel, Config, HttpAttendanceApi, PollingScheduler,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Clear the screen and move the cursor home
const CLEAR: &str = "\x1b[2J\x1b[H";

#[derive(Parser)]
#[command(name = "fellowship")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live attendance dashboard for the fellowship")]
struct Args {
    /// Config file (default: user config dir, then ./fellowship.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long)]
    base_url: Option<String>,

    /// Append frames instead of redrawing the screen
    #[arg(long)]
    no_clear: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = logging::bootstrap(|| Config::resolve(args.config.as_deref()))?;
    if let Some(url) = args.base_url {
        config.backend.base_url = url;
        config.validate()?;
    }

    logging::init(&config.logging);
    tracing::info!("Fellowship Attendance v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(backend = %config.backend.base_url, "Using attendance backend");

    let api = Arc::new(HttpAttendanceApi::new(&config.backend)?);
    let dashboard = Arc::new(AttendanceViewModel::from_config(api, &config.dashboard));

    dashboard.activate().await;
    let polling = PollingScheduler::from_config(&config.dashboard).start(Arc::clone(&dashboard));

    let mut redraw = tokio::time::interval(config.dashboard.render_interval());
    loop {
        tokio::select! {
            _ = redraw.tick() => {
                let snapshot = dashboard.snapshot().await;
                let frame = DashboardView::new(&snapshot, &config.dashboard.scan_base_url);
                if args.no_clear {
                    println!("{}", frame);
                } else {
                    print!("{}{}", CLEAR, frame);
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                }
                break;
            }
        }
    }

    tracing::info!("Shutting down...");
    polling.stop();
    tracing::info!("Dashboard closed");
    Ok(())
}
