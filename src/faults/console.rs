//! # FaultConsole: the home-thread state.
//!
//! Couples a [`FaultAggregator`] with a [`FaultPresenter`]. An instance is
//! moved into the home thread and only reached through dispatched callbacks.
//!
//! ## Per-signal flow
//! ```text
//! on_signal(signal)
//!   ├─► aggregator.report(source)     → LogEntry
//!   ├─► presenter.append_entry(entry)
//!   └─► presenter.ensure_visible()    (skipped when disposing or already shown)
//! ```

use tracing::debug;

use super::aggregator::{FaultAggregator, LogEntry};
use super::presenter::{FaultPresenter, Surface};
use crate::signals::Signal;

/// Aggregation plus presentation, owned by the home thread.
#[derive(Debug)]
pub struct FaultConsole<V> {
    aggregator: FaultAggregator,
    presenter: FaultPresenter<V>,
}

impl<V: Surface> FaultConsole<V> {
    /// Creates a console with an empty aggregator.
    pub fn new(presenter: FaultPresenter<V>) -> Self {
        Self {
            aggregator: FaultAggregator::new(),
            presenter,
        }
    }

    /// Reports a delivered signal and makes sure the operator sees it.
    pub fn on_signal(&mut self, signal: &Signal) -> LogEntry {
        let entry = self.aggregator.report(&signal.source);
        debug!(
            source = %entry.source,
            count = entry.count,
            severity = entry.severity.as_label(),
            seq = signal.seq,
            "fault reported"
        );
        self.presenter.append_entry(&entry);
        self.presenter.ensure_visible();
        entry
    }

    /// Read access to the counters and the log.
    pub fn aggregator(&self) -> &FaultAggregator {
        &self.aggregator
    }

    /// Read access to the presenter.
    pub fn presenter(&self) -> &FaultPresenter<V> {
        &self.presenter
    }

    /// Mutable access to the presenter (e.g. to dismiss the surface).
    pub fn presenter_mut(&mut self) -> &mut FaultPresenter<V> {
        &mut self.presenter
    }

    /// Splits the console into its parts.
    pub fn into_parts(self) -> (FaultAggregator, FaultPresenter<V>) {
        (self.aggregator, self.presenter)
    }
}
