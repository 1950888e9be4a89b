//! Fault signals: the value, its handlers and its sources.
//!
//! ## Contents
//! - [`Signal`] immutable fault value (source, time, thread, seq)
//! - [`FaultHandler`], [`HandlerFn`], [`HandlerRef`] callback contract
//! - [`SignalSource`], [`HandlerId`] named emitter with same-thread and
//!   cross-thread emission

mod handler;
mod signal;
mod source;

pub use handler::{FaultHandler, HandlerFn, HandlerRef};
pub use signal::Signal;
pub use source::{HandlerId, SignalSource};
