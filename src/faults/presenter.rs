//! # FaultPresenter: keeps the fault log in front of the operator.
//!
//! The presenter owns a [`Surface`] (the rendering collaborator: a window, a
//! terminal pane, a test double) and drives it from the home thread.
//!
//! ## Rules
//! - [`FaultPresenter::ensure_visible`] is idempotent: at most one surface is
//!   shown at a time, and an open surface is reused.
//! - The disposing flag is checked immediately before showing; once the owner
//!   is tearing down, the surface is never opened again.
//! - [`FaultPresenter::append_entry`] is append-only and follows the
//!   aggregator's log order.
//! - Tier → accent mapping is purely presentational: warning = light,
//!   elevated = medium, critical = strong.

use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::aggregator::LogEntry;
use super::severity::Severity;
use crate::error::DeliveryError;

/// Visual weight of a rendered line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Accent {
    /// Light accent (salmon).
    Light,
    /// Medium accent (yellow).
    Medium,
    /// Strong accent (red).
    Strong,
}

impl From<Severity> for Accent {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => Accent::Light,
            Severity::Elevated => Accent::Medium,
            Severity::Critical => Accent::Strong,
        }
    }
}

/// Rendering collaborator driven by [`FaultPresenter`].
///
/// Every method is called on the home thread only.
pub trait Surface {
    /// True while the surface is shown.
    fn is_visible(&self) -> bool;

    /// Shows (and raises) the surface.
    fn show(&mut self);

    /// Hides the surface without discarding its content.
    fn hide(&mut self);

    /// Appends one rendered line.
    fn append_line(&mut self, line: &str, accent: Accent);
}

/// Presents log entries on a [`Surface`].
#[derive(Debug)]
pub struct FaultPresenter<V> {
    surface: V,
    disposing: CancellationToken,
}

impl<V: Surface> FaultPresenter<V> {
    /// Creates a presenter; `disposing` is cancelled when the owner tears down.
    pub fn new(surface: V, disposing: CancellationToken) -> Self {
        Self { surface, disposing }
    }

    /// Shows the surface unless it is already visible or the owner is disposing.
    pub fn ensure_visible(&mut self) {
        if let Err(e) = self.try_show() {
            trace!(reason = e.as_label(), "surface not shown");
        }
    }

    /// Shows the surface.
    ///
    /// ### Errors
    /// - [`DeliveryError::Disposing`] once the owner started tearing down.
    /// - [`DeliveryError::AlreadyVisible`] if the surface is already shown.
    pub fn try_show(&mut self) -> Result<(), DeliveryError> {
        if self.surface.is_visible() {
            return Err(DeliveryError::AlreadyVisible);
        }
        if self.disposing.is_cancelled() {
            return Err(DeliveryError::Disposing);
        }
        self.surface.show();
        Ok(())
    }

    /// Renders one entry as a new line with its tier's accent.
    pub fn append_entry(&mut self, entry: &LogEntry) {
        self.surface
            .append_line(&entry.render(), Accent::from(entry.severity));
    }

    /// Hides the surface (operator acknowledged); the next fault reopens it.
    pub fn dismiss(&mut self) {
        if self.surface.is_visible() {
            self.surface.hide();
        }
    }

    /// True while the surface is shown.
    pub fn is_visible(&self) -> bool {
        self.surface.is_visible()
    }

    /// True once the owner started tearing down.
    pub fn is_disposing(&self) -> bool {
        self.disposing.is_cancelled()
    }

    /// Borrows the surface.
    pub fn surface(&self) -> &V {
        &self.surface
    }

    /// Mutably borrows the surface.
    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    /// Consumes the presenter and returns its surface.
    pub fn into_surface(self) -> V {
        self.surface
    }
}
