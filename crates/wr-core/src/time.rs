//! Wall-clock timestamps for route lifecycle stamping.
//!
//! # Design
//!
//! A `Timestamp` is milliseconds since the Unix epoch stored as `i64`.  Route
//! records only need ordering and persistence, so no datetime library is
//! pulled in; consumers format the integer however they like.
//!
//! Time is read through the [`Clock`] trait so the route manager can be driven
//! by a [`ManualClock`] in tests and by [`SystemClock`] in production.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// Milliseconds since 1970-01-01T00:00:00Z.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_unix_millis(ms: i64) -> Self {
        Timestamp(ms)
    }

    #[inline]
    pub fn unix_millis(self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`; negative if `earlier`
    /// is actually later.
    #[inline]
    pub fn millis_since(self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Reads the operating-system clock.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // A clock set before 1970 yields a negative offset rather than a panic.
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => Timestamp(d.as_millis() as i64),
            Err(e) => Timestamp(-(e.duration().as_millis() as i64)),
        }
    }
}

/// A clock that only moves when told to.
///
/// Every call to [`Clock::now`] returns the current value and then advances
/// it by `step_ms`, so consecutive stamps are strictly increasing unless the
/// step is zero.
#[derive(Debug)]
pub struct ManualClock {
    now_ms:  AtomicI64,
    step_ms: i64,
}

impl ManualClock {
    pub fn new(start: Timestamp, step_ms: i64) -> Self {
        Self { now_ms: AtomicI64::new(start.0), step_ms }
    }

    /// Jump the clock to `at`.
    pub fn set(&self, at: Timestamp) {
        self.now_ms.store(at.0, Ordering::SeqCst);
    }

    /// Current value without advancing.
    pub fn peek(&self) -> Timestamp {
        Timestamp(self.now_ms.load(Ordering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now_ms.fetch_add(self.step_ms, Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
