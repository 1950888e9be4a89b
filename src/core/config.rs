//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for a [`FaultMonitor`](crate::FaultMonitor).
//!
//! ## Sentinel values
//! - `seed = None` → non-deterministic generator seeded from OS entropy
//! - `max_interval <= min_interval` → fixed cadence of `min_interval`

use std::time::Duration;

/// Global configuration for the fault monitor.
///
/// ## Field semantics
/// - `min_interval` / `max_interval`: cadence sleep drawn uniformly from `[min, max)`
/// - `seed`: cadence generator seed (`None` = OS entropy)
/// - `source_count` / `source_prefix`: generated sources `"{prefix}{i}"`
/// - `home_thread_name`: OS thread name of the home thread
/// - `grace`: how long `run()` waits for the home thread to stop
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Lower bound of the cadence sleep (inclusive).
    pub min_interval: Duration,

    /// Upper bound of the cadence sleep (exclusive).
    pub max_interval: Duration,

    /// Seed of the cadence generator.
    ///
    /// A fixed seed makes the pick sequence reproducible, which is what demos
    /// and tests want. Deployments should use `None`.
    pub seed: Option<u64>,

    /// Number of sources generated when none are supplied to the builder.
    pub source_count: usize,

    /// Name prefix of generated sources.
    pub source_prefix: String,

    /// Name of the home OS thread.
    pub home_thread_name: String,

    /// Maximum wait for the home thread after shutdown.
    pub grace: Duration,
}

impl Config {
    /// Returns `(min, max)` with `max >= min`.
    #[inline]
    pub fn cadence_bounds(&self) -> (Duration, Duration) {
        (self.min_interval, self.max_interval.max(self.min_interval))
    }

    /// Names of the generated sources: `Screen0`, `Screen1`, ...
    pub fn source_names(&self) -> Vec<String> {
        (0..self.source_count)
            .map(|i| format!("{}{i}", self.source_prefix))
            .collect()
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - cadence in `[5s, 10s)`
    /// - `seed = Some(4)` (reproducible demo runs)
    /// - three sources `Screen0..Screen2`
    /// - home thread `fault-home`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(10),
            seed: Some(4),
            source_count: 3,
            source_prefix: "Screen".to_string(),
            home_thread_name: "fault-home".to_string(),
            grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_setup() {
        let cfg = Config::default();
        assert_eq!(
            cfg.cadence_bounds(),
            (Duration::from_secs(5), Duration::from_secs(10))
        );
        assert_eq!(cfg.source_names(), vec!["Screen0", "Screen1", "Screen2"]);
        assert_eq!(cfg.grace, Duration::from_secs(5));
    }

    #[test]
    fn inverted_bounds_collapse_to_min() {
        let cfg = Config {
            min_interval: Duration::from_secs(3),
            max_interval: Duration::from_secs(1),
            ..Config::default()
        };
        assert_eq!(
            cfg.cadence_bounds(),
            (Duration::from_secs(3), Duration::from_secs(3))
        );
    }
}
