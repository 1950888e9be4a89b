//! Termination trigger for [`FaultMonitor::run`](crate::FaultMonitor::run).
//!
//! On Unix any of `SIGINT`, `SIGTERM` or `SIGQUIT` stops the monitor; `SIGINT`
//! already covers Ctrl-C from a terminal. Elsewhere only Ctrl-C is observed.
//! When registration fails the monitor falls back to its shutdown token.

/// Waits for a termination signal.
///
/// Returns `Err` if the signal handlers cannot be registered.
#[cfg(unix)]
pub async fn wait_for_termination() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Err` if the Ctrl-C handler cannot be registered.
#[cfg(not(unix))]
pub async fn wait_for_termination() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
