//! Fault aggregation and presentation (home-thread side).
//!
//! ## Contents
//! - [`Severity`] tier derived from a repeat count
//! - [`FaultAggregator`], [`AggregateRecord`], [`LogEntry`] counting and the ordered log
//! - [`FaultPresenter`], [`Surface`], [`Accent`] presentation seam
//! - [`TextSurface`] text/ANSI reference surface
//! - [`FaultConsole`] aggregator + presenter, owned by the home thread

mod aggregator;
mod console;
mod presenter;
mod severity;
mod surface;

pub use aggregator::{AggregateRecord, FaultAggregator, LogEntry};
pub use console::FaultConsole;
pub use presenter::{Accent, FaultPresenter, Surface};
pub use severity::{Severity, ELEVATED_AT};
pub use surface::TextSurface;
