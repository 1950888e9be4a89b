//! # Example: Fault Console
//!
//! Three sources fault at a shortened cadence; the console prints each entry
//! on stdout. Stops on Ctrl+C or after `FAULT_DEMO_SECS` (default 15).
//!
//! ```text
//! RUST_LOG=faultline=debug cargo run --example fault_demo
//! ```

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use faultline::{Config, FaultMonitor, TextSurface};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("faultline=info")),
        )
        .with_target(false)
        .init();

    let secs = std::env::var("FAULT_DEMO_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(15);

    let cfg = Config {
        min_interval: Duration::from_millis(500),
        max_interval: Duration::from_millis(1500),
        seed: None,
        ..Config::default()
    };
    let monitor = FaultMonitor::builder(cfg).build(TextSurface::stdout())?;

    let token = monitor.shutdown_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        println!("[demo] time is up");
        token.cancel();
    });

    let console = monitor.run().await?;

    println!("[demo] totals:");
    for record in console.aggregator().records() {
        println!("  {:<10} {}", record.source, record.count);
    }
    Ok(())
}
