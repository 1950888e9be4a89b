//! # Fault handlers
//!
//! [`FaultHandler`] is the callback a [`SignalSource`](crate::SignalSource)
//! invokes for each emitted [`Signal`]. [`HandlerFn`] wraps a closure.
//!
//! ## Contract
//! - Handlers run on the **emitting** thread: the caller's own thread for
//!   same-thread emission, a short-lived worker for cross-thread emission.
//! - A handler must not touch home-thread state directly; it marshals through a
//!   [`Dispatcher`](crate::Dispatcher) instead.
//! - Handlers should return quickly: a cross-thread worker lives exactly as long
//!   as its handlers run.
//!
//! ## Example
//! ```rust
//! use faultline::{HandlerFn, HandlerRef, Signal};
//!
//! let h: HandlerRef = HandlerFn::arc("printer", |signal: &Signal| {
//!     println!("fault from {}", signal.source);
//! });
//! assert_eq!(h.name(), "printer");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use super::signal::Signal;

/// Shared handle to a handler.
pub type HandlerRef = Arc<dyn FaultHandler>;

/// Contract for fault signal handlers.
pub trait FaultHandler: Send + Sync + 'static {
    /// Handles one signal on the emitting thread.
    fn on_signal(&self, signal: &Signal);

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed handler.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new closure-backed handler.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> FaultHandler for HandlerFn<F>
where
    F: Fn(&Signal) + Send + Sync + 'static,
{
    fn on_signal(&self, signal: &Signal) {
        (self.f)(signal)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
