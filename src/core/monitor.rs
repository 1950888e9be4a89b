//! # FaultMonitor: wires sources, the home thread and the cadence generator.
//!
//! The [`FaultMonitor`] owns the signal sources, the dispatcher feeding the
//! home thread, and the cancellation token shared by every component.
//!
//! ## High-level architecture
//! ```text
//! build():
//!   token = CancellationToken::new()
//!   FaultConsole { FaultAggregator, FaultPresenter(surface, disposing = token) }
//!        └──► spawn_home(name, token, console) ──► (Dispatcher, HomeThread)
//!   for each SignalSource:
//!        subscribe(handler: signal ──► dispatcher.post(console.on_signal))
//!
//! run():
//!   Orchestrator::run(token) ──► source.emit(same/cross thread)
//!        │                           └──► handler ──► Dispatcher ──► home thread
//!   wait for SIGINT/SIGTERM/SIGQUIT or an explicit shutdown()
//!
//! Shutdown path:
//!   token.cancel()
//!        ├─► cadence loop exits (its sleep is cancellable)
//!        ├─► dispatcher rejects posts, drops queued callbacks
//!        ├─► presenter is disposing (never shows again)
//!        └─► home thread returns the FaultConsole ──► join (bounded by grace)
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use faultline::{Config, FaultMonitor, TextSurface};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = FaultMonitor::builder(Config::default()).build(TextSurface::stdout())?;
//!     let console = monitor.run().await?;
//!     for record in console.aggregator().records() {
//!         println!("{} faulted {} times", record.source, record.count);
//!     }
//!     Ok(())
//! }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;
use std::thread;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::orchestrator::Orchestrator;
use crate::core::{shutdown, Config};
use crate::dispatch::{spawn_home, Dispatcher, HomeThread};
use crate::error::{DeliveryError, RuntimeError};
use crate::faults::{AggregateRecord, FaultConsole, FaultPresenter, LogEntry, Surface};
use crate::signals::{HandlerFn, HandlerRef, Signal, SignalSource};

/// Builder for [`FaultMonitor`].
pub struct MonitorBuilder<V> {
    cfg: Config,
    sources: Option<Vec<Arc<SignalSource>>>,
    _surface: PhantomData<fn() -> V>,
}

impl<V> MonitorBuilder<V>
where
    V: Surface + Send + 'static,
{
    /// Uses the given sources instead of generating them from the config.
    pub fn with_sources(mut self, sources: Vec<Arc<SignalSource>>) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Starts the home thread and subscribes the console to every source.
    ///
    /// ### Errors
    /// - [`RuntimeError::NoSources`] if there is no source to watch.
    /// - [`RuntimeError::HomeThread`] if the home thread cannot start.
    pub fn build(self, surface: V) -> Result<FaultMonitor<V>, RuntimeError> {
        let cfg = self.cfg;
        let sources = match self.sources {
            Some(sources) => sources,
            None => cfg
                .source_names()
                .into_iter()
                .map(SignalSource::arc)
                .collect(),
        };
        if sources.is_empty() {
            return Err(RuntimeError::NoSources);
        }

        let token = CancellationToken::new();
        let console = FaultConsole::new(FaultPresenter::new(surface, token.clone()));
        let (dispatcher, home) = spawn_home(cfg.home_thread_name.clone(), token.clone(), console)?;

        for source in &sources {
            source.subscribe(console_handler(dispatcher.clone()));
        }
        info!(sources = sources.len(), "fault monitor ready");

        Ok(FaultMonitor {
            cfg,
            token,
            sources,
            dispatcher,
            home,
        })
    }
}

/// Handler that marshals each signal onto the home thread.
fn console_handler<V>(dispatcher: Dispatcher<FaultConsole<V>>) -> HandlerRef
where
    V: Surface + 'static,
{
    HandlerFn::arc("fault-console", move |signal: &Signal| {
        debug!(
            source = %signal.source,
            invoke_required = dispatcher.invoke_required(),
            "fault signal raised"
        );
        let signal = signal.clone();
        dispatcher.post(move |console: &mut FaultConsole<V>| {
            console.on_signal(&signal);
        });
    })
}

/// Owner of a running fault monitoring setup.
pub struct FaultMonitor<V> {
    cfg: Config,
    token: CancellationToken,
    sources: Vec<Arc<SignalSource>>,
    dispatcher: Dispatcher<FaultConsole<V>>,
    home: HomeThread<FaultConsole<V>>,
}

impl<V> FaultMonitor<V>
where
    V: Surface + Send + 'static,
{
    /// Starts building a monitor.
    pub fn builder(cfg: Config) -> MonitorBuilder<V> {
        MonitorBuilder {
            cfg,
            sources: None,
            _surface: PhantomData,
        }
    }

    /// Configuration the monitor was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Watched sources, in construction order.
    pub fn sources(&self) -> &[Arc<SignalSource>] {
        &self.sources
    }

    /// Looks up a source by name.
    pub fn source(&self, name: &str) -> Option<&Arc<SignalSource>> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Dispatcher feeding the home thread.
    pub fn dispatcher(&self) -> &Dispatcher<FaultConsole<V>> {
        &self.dispatcher
    }

    /// Token cancelled on shutdown; cancelling it triggers shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cadence generator over this monitor's sources, per the config.
    pub fn orchestrator(&self) -> Orchestrator<rand::rngs::StdRng> {
        Orchestrator::from_config(&self.cfg, self.sources.clone())
    }

    /// Spawns the cadence generator on the current tokio runtime.
    pub fn spawn_cadence(&self) -> JoinHandle<()> {
        tokio::spawn(self.orchestrator().run(self.token.clone()))
    }

    /// Per-source counters, read on the home thread.
    ///
    /// Observes every signal posted before the call.
    pub async fn records(&self) -> Result<Vec<AggregateRecord>, DeliveryError> {
        self.dispatcher
            .invoke(|console: &mut FaultConsole<V>| console.aggregator().records())
            .await
    }

    /// Copy of the fault log, read on the home thread.
    pub async fn log(&self) -> Result<Vec<LogEntry>, DeliveryError> {
        self.dispatcher
            .invoke(|console: &mut FaultConsole<V>| console.aggregator().log().to_vec())
            .await
    }

    /// Hides the presentation surface (operator acknowledged).
    pub fn dismiss(&self) {
        self.dispatcher
            .post(|console: &mut FaultConsole<V>| console.presenter_mut().dismiss());
    }

    /// Cancels the cadence generator, disables the dispatcher and marks the
    /// presenter as disposing. Idempotent.
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("fault monitor shutting down");
        }
        self.token.cancel();
    }

    /// True once shutdown has been requested.
    pub fn is_shut_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Shuts down and blocks until the home thread returns its console.
    pub fn join(self) -> Result<FaultConsole<V>, RuntimeError> {
        self.shutdown();
        self.home.join()
    }

    /// Drives the cadence generator until a termination signal or
    /// [`shutdown`](Self::shutdown), then tears everything down.
    ///
    /// Returns the final console so callers can inspect the counters.
    ///
    /// ### Errors
    /// - [`RuntimeError::GraceExceeded`] if the home thread does not stop in time.
    ///   The thread is then left running detached and does not block runtime
    ///   or process exit.
    /// - [`RuntimeError::HomePanicked`] if the home thread died.
    pub async fn run(self) -> Result<FaultConsole<V>, RuntimeError> {
        let cadence = self.spawn_cadence();
        let token = self.token.clone();

        tokio::select! {
            res = shutdown::wait_for_termination() => match res {
                Ok(()) => info!("termination signal received"),
                Err(e) => {
                    warn!(error = %e, "signal handlers unavailable; waiting for explicit shutdown");
                    token.cancelled().await;
                }
            },
            _ = token.cancelled() => {}
        }
        self.shutdown();
        if let Err(e) = cadence.await {
            warn!(error = %e, "cadence task ended abnormally");
        }

        self.wait_home().await
    }

    /// Joins the home thread from a detached watcher thread, not a runtime
    /// blocking task.
    async fn wait_home(self) -> Result<FaultConsole<V>, RuntimeError> {
        let name = self.home.name().to_string();
        let home = self.home;
        let (tx, joined) = oneshot::channel();
        thread::Builder::new()
            .name(format!("{name}-join"))
            .spawn(move || {
                let _ = tx.send(home.join());
            })?;

        let grace = self.cfg.grace;
        match tokio::time::timeout(grace, joined).await {
            Ok(Ok(res)) => res,
            Ok(Err(_)) => Err(RuntimeError::HomePanicked { name }),
            Err(_) => {
                warn!(thread = %name, ?grace, "home thread still running; left detached");
                Err(RuntimeError::GraceExceeded { grace })
            }
        }
    }
}
