//! Artifact identifiers.
//!
//! Every persisted artifact is keyed by the millisecond timestamp of its
//! creation. Ids handed out by one [`IdGenerator`] are strictly increasing,
//! so two records created within the same millisecond still get distinct ids.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

use crate::common::clock::Clock;

/// Identifier of a persisted artifact (creation time in epoch millis).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ArtifactId(i64);

impl ArtifactId {
    /// Wrap a raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ArtifactId {
    #[inline]
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<ArtifactId> for i64 {
    #[inline]
    fn from(value: ArtifactId) -> Self {
        value.0
    }
}

impl FromStr for ArtifactId {
    type Err = core::num::ParseIntError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Hands out strictly increasing, clock-derived artifact ids.
pub struct IdGenerator {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
}

impl IdGenerator {
    /// Create a generator reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(i64::MIN),
        }
    }

    /// Next id: the current time, or one past the previous id if the clock
    /// has not moved forward since.
    pub fn next_id(&self) -> ArtifactId {
        let now = self.clock.now_millis();
        let mut prev = self.last.load(Ordering::SeqCst);
        loop {
            let candidate = now.max(prev.saturating_add(1));
            match self
                .last
                .compare_exchange(prev, candidate, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return ArtifactId(candidate),
                Err(actual) => prev = actual,
            }
        }
    }

    /// Clock shared with the generator.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator")
            .field("last", &self.last.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
