//! # Severity tiers derived from repeat counts.
//!
//! [`Severity`] is a pure function of how many times one source has faulted,
//! compared against [`ELEVATED_AT`]:
//!
//! - count below the threshold → [`Severity::Warning`]
//! - count equal to the threshold → [`Severity::Elevated`]
//! - count above the threshold → [`Severity::Critical`]

use std::cmp::Ordering;
use std::fmt;

/// Repeat count at which a source becomes [`Severity::Elevated`].
pub const ELEVATED_AT: u64 = 2;

/// Classification of a source by its fault count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// First fault from a source.
    Warning,
    /// The source has faulted exactly [`ELEVATED_AT`] times.
    Elevated,
    /// The source keeps faulting.
    Critical,
}

impl Severity {
    /// Classifies a fault count.
    ///
    /// # Example
    /// ```
    /// use faultline::Severity;
    ///
    /// assert_eq!(Severity::from_count(1), Severity::Warning);
    /// assert_eq!(Severity::from_count(2), Severity::Elevated);
    /// assert_eq!(Severity::from_count(9), Severity::Critical);
    /// ```
    pub fn from_count(count: u64) -> Self {
        match count.cmp(&ELEVATED_AT) {
            Ordering::Less => Severity::Warning,
            Ordering::Equal => Severity::Elevated,
            Ordering::Greater => Severity::Critical,
        }
    }

    /// Short stable label (snake_case) for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Elevated => "elevated",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
