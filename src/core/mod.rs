//! Runtime core: wiring, cadence and lifecycle.
//!
//! The public entry point is [`FaultMonitor`], which connects the signal
//! sources to the home thread and owns teardown.
//!
//! Internal modules:
//! - [`config`]: global settings;
//! - [`monitor`]: builds the home thread and subscribes the console to sources;
//! - [`orchestrator`]: randomized cadence generator;
//! - [`shutdown`]: process termination signals.

mod config;
mod monitor;
mod orchestrator;
mod shutdown;

pub use config::Config;
pub use monitor::{FaultMonitor, MonitorBuilder};
pub use orchestrator::{Orchestrator, Pick};
