//! # SignalSource: named emitter of fault signals.
//!
//! A [`SignalSource`] emits [`Signal`]s to its subscribed
//! [`FaultHandler`](super::FaultHandler)s, either on the caller's thread or on
//! a short-lived worker thread.
//!
//! ## Emission paths
//! ```text
//! emit(false) ──► handlers run on the caller's thread
//!
//! emit(true)  ──► thread::spawn ──► handlers run on the worker ──► worker exits
//! ```
//!
//! ## Rules
//! - No retry and no backoff: one emission invokes each handler at most once.
//! - With no subscriber, emission is a no-op (`try_emit` reports
//!   [`DeliveryError::NoSubscriber`]).
//! - Handlers are snapshotted at emission time; later (un)subscriptions do not
//!   affect a worker that is already running.
//! - A panicking handler is caught and logged; the remaining handlers still run.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use faultline::{HandlerFn, Signal, SignalSource};
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let source = SignalSource::arc("Screen0");
//! let counter = Arc::clone(&hits);
//! source.subscribe(HandlerFn::arc("count", move |_: &Signal| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! }));
//!
//! source.emit(false);
//! if let Some(worker) = source.emit(true) {
//!     worker.join().unwrap();
//! }
//! assert_eq!(hits.load(Ordering::SeqCst), 2);
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;

use tracing::{trace, warn};

use super::handler::HandlerRef;
use super::signal::Signal;
use crate::dispatch::panic_message;
use crate::error::DeliveryError;

/// Token returned by [`SignalSource::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Named emitter of fault signals.
pub struct SignalSource {
    name: Arc<str>,
    handlers: RwLock<Vec<(HandlerId, HandlerRef)>>,
    next_id: AtomicU64,
    active: AtomicBool,
}

impl fmt::Debug for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalSource")
            .field("name", &self.name)
            .field("subscribers", &self.subscriber_count())
            .field("active", &self.is_active())
            .finish()
    }
}

impl SignalSource {
    /// Creates an active source with no subscriber.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
            active: AtomicBool::new(true),
        }
    }

    /// Creates the source and returns it as a shared handle.
    pub fn arc(name: impl Into<Arc<str>>) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    /// Stable source name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches a handler; handlers run in subscription order.
    pub fn subscribe(&self, handler: HandlerRef) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, handler));
        id
    }

    /// Detaches a handler. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != id);
        handlers.len() != before
    }

    /// Number of attached handlers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True while the source is shown; the cadence generator only picks active sources.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Shows or hides the source. Hidden sources can still emit when asked directly.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    /// Emits one signal, silently doing nothing if no handler is attached.
    ///
    /// Returns the worker's join handle for cross-thread emission.
    pub fn emit(&self, cross_thread: bool) -> Option<thread::JoinHandle<()>> {
        match self.try_emit(cross_thread) {
            Ok(worker) => worker,
            Err(e) => {
                trace!(source = %self.name, reason = e.as_label(), "emit skipped");
                None
            }
        }
    }

    /// Emits one signal.
    ///
    /// - `cross_thread = false`: handlers run before this call returns.
    /// - `cross_thread = true`: a worker thread runs them; its handle is returned.
    ///
    /// ### Errors
    /// [`DeliveryError::NoSubscriber`] if no handler is attached. A worker thread
    /// that cannot be spawned is logged and treated as a dropped emission.
    pub fn try_emit(
        &self,
        cross_thread: bool,
    ) -> Result<Option<thread::JoinHandle<()>>, DeliveryError> {
        let handlers = self.snapshot();
        if handlers.is_empty() {
            return Err(DeliveryError::NoSubscriber {
                source_name: Arc::clone(&self.name),
            });
        }

        if !cross_thread {
            notify(&handlers, &Signal::now(Arc::clone(&self.name)));
            return Ok(None);
        }

        let name = Arc::clone(&self.name);
        let spawned = thread::Builder::new()
            .name(format!("{}-fault", self.name))
            .spawn(move || notify(&handlers, &Signal::now(name)));
        match spawned {
            Ok(worker) => Ok(Some(worker)),
            Err(e) => {
                warn!(
                    source = %self.name,
                    error = %e,
                    "failed to spawn fault worker; signal dropped"
                );
                Ok(None)
            }
        }
    }

    fn snapshot(&self) -> Vec<HandlerRef> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect()
    }
}

/// Invokes every handler once, isolating panics.
fn notify(handlers: &[HandlerRef], signal: &Signal) {
    for handler in handlers {
        let call = AssertUnwindSafe(|| handler.on_signal(signal));
        if let Err(panic_err) = panic::catch_unwind(call) {
            warn!(
                source = %signal.source,
                handler = handler.name(),
                info = %panic_message(panic_err.as_ref()),
                "fault handler panicked"
            );
        }
    }
}
