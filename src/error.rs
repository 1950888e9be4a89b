//! Error types used by the faultline runtime.
//!
//! This module defines two enums:
//!
//! - [`DeliveryError`]: benign outcomes on the signal delivery path. The
//!   fire-and-forget entry points (`post`, `emit`, `ensure_visible`) swallow
//!   them; the `try_*` variants hand them back to the caller.
//! - [`RuntimeError`]: failures of the runtime itself (home thread setup,
//!   teardown, wiring).
//!
//! Both types provide `as_label` for logs/metrics.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// # Benign delivery outcomes.
///
/// None of these are fatal. Each one describes a race or a no-op that the
/// runtime is expected to absorb during normal operation and teardown.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The dispatcher was shut down before (or while) the callback was queued.
    ///
    /// Also returned by [`Dispatcher::invoke`](crate::Dispatcher::invoke) when a
    /// queued callback is discarded by shutdown before it starts.
    #[error("dispatcher is shut down; callback dropped")]
    PostAfterShutdown,

    /// A signal was emitted by a source that has no handler attached.
    #[error("signal source `{source_name}` has no subscriber")]
    NoSubscriber {
        /// Name of the emitting source.
        source_name: Arc<str>,
    },

    /// The presentation surface is already visible.
    #[error("presentation surface already visible")]
    AlreadyVisible,

    /// The owner is disposing; the surface must not be shown anymore.
    #[error("owner is disposing; surface not shown")]
    Disposing,
}

impl DeliveryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use faultline::DeliveryError;
    ///
    /// assert_eq!(DeliveryError::PostAfterShutdown.as_label(), "post_after_shutdown");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::PostAfterShutdown => "post_after_shutdown",
            DeliveryError::NoSubscriber { .. } => "no_subscriber",
            DeliveryError::AlreadyVisible => "already_visible",
            DeliveryError::Disposing => "disposing",
        }
    }
}

/// # Errors produced by the faultline runtime.
///
/// These represent failures to set up or tear down the runtime, never
/// failures of individual deliveries.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The home thread (or its single-threaded runtime) could not be started.
    #[error("failed to start home thread: {0}")]
    HomeThread(#[from] io::Error),

    /// The home thread terminated abnormally and its state is lost.
    #[error("home thread `{name}` panicked")]
    HomePanicked {
        /// Name of the home thread.
        name: String,
    },

    /// The home thread did not stop within the grace period after shutdown.
    #[error("home thread did not stop within {grace:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },

    /// A monitor was built without any signal source.
    #[error("no signal sources configured")]
    NoSources,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use faultline::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::NoSources.as_label(), "runtime_no_sources");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::HomeThread(_) => "runtime_home_thread",
            RuntimeError::HomePanicked { .. } => "runtime_home_panicked",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::NoSources => "runtime_no_sources",
        }
    }
}
