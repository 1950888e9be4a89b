//! # Fault signals raised by sources.
//!
//! A [`Signal`] is an immutable value created at emission time and consumed
//! once by delivery. It records which source raised it, when, and on which
//! thread.
//!
//! ## Ordering
//! Each signal carries a globally unique, monotonically increasing `seq`
//! assigned at emission. Delivery order is decided by the dispatcher, not by
//! `seq`; the two can differ when independent threads race to post.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::thread::{self, ThreadId};
use std::time::SystemTime;

/// Global sequence counter for emitted signals.
static SIGNAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// A fault raised by one [`SignalSource`](crate::SignalSource).
#[derive(Clone, Debug)]
pub struct Signal {
    /// Globally unique, monotonically increasing emission number.
    pub seq: u64,
    /// Name of the emitting source.
    pub source: Arc<str>,
    /// Wall-clock emission time.
    pub at: SystemTime,
    /// Thread the signal was emitted on.
    pub thread: ThreadId,
}

impl Signal {
    /// Creates a signal stamped with the current time, thread and next sequence number.
    pub fn now(source: impl Into<Arc<str>>) -> Self {
        Self {
            seq: SIGNAL_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            source: source.into(),
            at: SystemTime::now(),
            thread: thread::current().id(),
        }
    }

    /// True when the signal was emitted on the given thread.
    #[inline]
    pub fn emitted_on(&self, thread: ThreadId) -> bool {
        self.thread == thread
    }
}
