//! Simulation clock reading.

use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// A point on the host simulation clock, in seconds since mission start.
///
/// The engine never reads a wall clock; every timestamp comes from the host
/// [`Timeline`](crate::Timeline) and flows through this newtype.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct SimTime(f64);

impl SimTime {
    /// Mission start.
    pub const ZERO: SimTime = SimTime(0.0);

    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// Shifts this reading by `secs` (negative values shift backwards).
    #[inline]
    pub fn offset(self, secs: f64) -> Self {
        Self(self.0 + secs)
    }

    /// Seconds elapsed from `earlier` to `self`.
    #[inline]
    pub fn elapsed_since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> SimTime {
        SimTime(self.0 + rhs.as_secs_f64())
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}
