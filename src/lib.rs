//! # faultline
//!
//! **faultline** delivers fault signals raised on arbitrary threads onto one
//! designated home thread, and counts them there in order.
//!
//! The home thread plays the role of a UI message loop: it owns the fault
//! counters and the presentation surface, and it is the only thread that ever
//! touches them. Every other thread marshals work through a [`Dispatcher`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ SignalSource │   │ SignalSource │   │ SignalSource │
//!     │  (Screen0)   │   │  (Screen1)   │   │  (Screen2)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▲                  ▲                  ▲
//!            └──────── emit(same / cross thread) ──┘
//!                               │
//!                 ┌─────────────┴─────────────┐
//!                 │ Orchestrator (cadence)    │
//!                 │ sleep [5s,10s) → pick →   │
//!                 │ coin flip → emit          │
//!                 └───────────────────────────┘
//!
//!   emitting thread (caller or short-lived worker)
//!      └─► FaultHandler::on_signal ──► Dispatcher::post(cb)
//!                                          │
//!                                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │            unbounded mpsc queue (global FIFO of post calls)       │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                     ┌──────────────────────────┐
//!                     │ HomeLoop (home thread)   │
//!                     │ one callback at a time   │
//!                     └────────────┬─────────────┘
//!                                  ▼
//!                     FaultConsole::on_signal
//!                        ├─► FaultAggregator::report  (count, Severity, LogEntry)
//!                        ├─► FaultPresenter::append_entry
//!                        └─► FaultPresenter::ensure_visible
//! ```
//!
//! ### Lifecycle
//! ```text
//! FaultMonitor::builder(cfg).build(surface)
//!   ├─► spawn_home(..) → home thread owns FaultConsole
//!   └─► each source.subscribe(handler → dispatcher.post)
//!
//! FaultMonitor::run()
//!   ├─► spawn Orchestrator::run(token)
//!   ├─► wait: SIGINT / SIGTERM / SIGQUIT or shutdown()
//!   └─► token.cancel()
//!         ├─ cadence loop exits
//!         ├─ posts dropped silently, queued callbacks discarded
//!         ├─ presenter disposing (never shown again)
//!         └─ home thread returns FaultConsole (bounded by Config::grace)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types                                   |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Dispatch**      | Serialized, ordered delivery onto one home thread.           | [`Dispatcher`], [`HomeLoop`], [`spawn_home`] |
//! | **Signals**       | Same-thread and cross-thread emission to subscribed handlers.| [`SignalSource`], [`Signal`], [`FaultHandler`] |
//! | **Aggregation**   | Per-source counts, severity tiers, append-only log.          | [`FaultAggregator`], [`Severity`], [`LogEntry`] |
//! | **Presentation**  | Show-once surface, accent per tier.                          | [`FaultPresenter`], [`Surface`], [`TextSurface`] |
//! | **Cadence**       | Seeded random fault generator.                               | [`Orchestrator`]                            |
//! | **Wiring**        | Build, run and tear down the whole setup.                    | [`FaultMonitor`], [`Config`]                |
//! | **Errors**        | Benign delivery outcomes and runtime failures.               | [`DeliveryError`], [`RuntimeError`]         |
//!
//! ## Example
//! ```rust
//! use faultline::{Config, FaultMonitor, Severity, TextSurface};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = FaultMonitor::builder(Config::default())
//!         .build(TextSurface::new(Vec::new(), false))?;
//!
//!     let screen = monitor.source("Screen0").expect("generated source");
//!     screen.emit(false);
//!     if let Some(worker) = screen.emit(true) {
//!         worker.join().expect("worker");
//!     }
//!
//!     let log = monitor.log().await?;
//!     assert_eq!(log.len(), 2);
//!     assert_eq!(log[1].severity, Severity::Elevated);
//!
//!     let console = monitor.join()?;
//!     assert_eq!(console.aggregator().count("Screen0"), 2);
//!     Ok(())
//! }
//! ```

mod core;
mod dispatch;
mod error;
mod faults;
mod signals;

// ---- Public re-exports ----

pub use crate::core::{Config, FaultMonitor, MonitorBuilder, Orchestrator, Pick};
pub use dispatch::{channel, spawn_home, Dispatcher, HomeLoop, HomeThread};
pub use error::{DeliveryError, RuntimeError};
pub use faults::{
    Accent, AggregateRecord, FaultAggregator, FaultConsole, FaultPresenter, LogEntry, Severity,
    Surface, TextSurface, ELEVATED_AT,
};
pub use signals::{FaultHandler, HandlerFn, HandlerId, HandlerRef, Signal, SignalSource};
