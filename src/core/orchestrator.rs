//! # Orchestrator: randomized cadence generator.
//!
//! Periodically picks a random active [`SignalSource`] and makes it emit,
//! flipping a coin between same-thread and cross-thread emission so both
//! delivery paths get exercised.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► delay = uniform[min, max)
//!   ├─► sleep(delay)              (cancellable → exit)
//!   ├─► active = sources.filter(is_active)
//!   │     └─ empty → skip cycle
//!   ├─► source = active[uniform index]
//!   └─► source.emit(cross_thread = coin flip)
//! }
//! ```
//!
//! ## Randomness
//! The generator is injected (`R: rand::Rng`). [`Orchestrator::from_config`]
//! uses a [`StdRng`] seeded with [`Config::seed`], so a fixed seed replays
//! the same picks; `seed = None` draws the seed from OS entropy.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::Config;
use crate::signals::SignalSource;

/// One cadence decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pick {
    /// Name of the chosen source.
    pub source: String,
    /// Whether the signal was emitted from a fresh worker thread.
    pub cross_thread: bool,
}

/// Background cadence generator.
pub struct Orchestrator<R> {
    sources: Vec<Arc<SignalSource>>,
    min: Duration,
    max: Duration,
    rng: R,
}

impl Orchestrator<StdRng> {
    /// Builds a generator with bounds and seed taken from `cfg`.
    pub fn from_config(cfg: &Config, sources: Vec<Arc<SignalSource>>) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(sources, cfg.cadence_bounds(), rng)
    }
}

impl<R: Rng> Orchestrator<R> {
    /// Creates a generator sleeping in `[bounds.0, bounds.1)` between picks.
    pub fn new(sources: Vec<Arc<SignalSource>>, bounds: (Duration, Duration), rng: R) -> Self {
        let (min, max) = bounds;
        Self {
            sources,
            min,
            max: max.max(min),
            rng,
        }
    }

    /// Draws the next sleep duration.
    pub fn next_delay(&mut self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        self.rng.random_range(self.min..self.max)
    }

    /// Picks a random active source and emits once.
    ///
    /// Returns `None` (and emits nothing) when no source is active.
    pub fn tick(&mut self) -> Option<Pick> {
        let active: Vec<&Arc<SignalSource>> =
            self.sources.iter().filter(|s| s.is_active()).collect();
        if active.is_empty() {
            debug!("no active source; cadence cycle skipped");
            return None;
        }

        let source = active[self.rng.random_range(0..active.len())];
        let cross_thread = self.rng.random_bool(0.5);
        source.emit(cross_thread);

        Some(Pick {
            source: source.name().to_string(),
            cross_thread,
        })
    }

    /// Runs until `token` is cancelled.
    ///
    /// Cancellation is observed during the sleep, so shutdown never waits for
    /// a full cadence interval.
    pub async fn run(mut self, token: CancellationToken) {
        info!(sources = self.sources.len(), "cadence generator started");
        loop {
            let delay = self.next_delay();
            select! {
                biased;
                _ = token.cancelled() => break,
                _ = time::sleep(delay) => {}
            }
            // Cancellation may land between the timer firing and this poll.
            if token.is_cancelled() {
                break;
            }
            if let Some(pick) = self.tick() {
                debug!(
                    source = %pick.source,
                    cross_thread = pick.cross_thread,
                    after = ?delay,
                    "fault triggered"
                );
            }
        }
        info!("cadence generator stopped");
    }
}
