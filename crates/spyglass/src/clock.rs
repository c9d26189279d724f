//! Fake system time for deterministic tests.
//!
//! Substitutes the wall-clock "now" seen by code under test. Once fake timers
//! are in use, time is frozen at the moment of installation and only moves
//! when set or advanced explicitly. Timer queues are out of scope; this is a
//! clock source, not a scheduler.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Which source `now()` reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    /// System time
    Real,
    /// Frozen fake time
    Fake,
}

/// Errors that can occur with clock operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    /// Fake timers not in use
    #[error("Fake timers are not in use")]
    NotInstalled,
    /// Fake timers already in use
    #[error("Fake timers are already in use")]
    AlreadyInstalled,
    /// Timestamp outside the supported range
    #[error("Timestamp out of range: {0}ms")]
    OutOfRange(i64),
}

/// Switchable system clock
#[derive(Debug)]
pub struct FakeClock {
    /// Whether fake time is in use
    fake: AtomicBool,
    /// Fake time in milliseconds since the Unix epoch
    fake_ms: AtomicI64,
}

impl FakeClock {
    /// Create a clock reading system time
    #[must_use]
    pub fn new() -> Self {
        Self {
            fake: AtomicBool::new(false),
            fake_ms: AtomicI64::new(0),
        }
    }

    /// Switch to fake time, frozen at the current system time
    ///
    /// # Errors
    ///
    /// Returns error if fake timers are already in use
    pub fn use_fake_timers(&self) -> Result<(), ClockError> {
        if self.fake.load(Ordering::SeqCst) {
            return Err(ClockError::AlreadyInstalled);
        }
        // Readers that observe the flag must already see the frozen time.
        let now_ms = Utc::now().timestamp_millis();
        self.fake_ms.store(now_ms, Ordering::SeqCst);
        if self
            .fake
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ClockError::AlreadyInstalled);
        }
        debug!(now_ms, "fake timers installed");
        Ok(())
    }

    /// Switch back to system time. Idempotent.
    pub fn use_real_timers(&self) {
        if self.fake.swap(false, Ordering::SeqCst) {
            debug!("real timers restored");
        }
    }

    /// Set the fake time
    ///
    /// # Errors
    ///
    /// Returns error if fake timers are not in use
    pub fn set_system_time(&self, at: DateTime<Utc>) -> Result<(), ClockError> {
        self.set_system_time_ms(at.timestamp_millis())
    }

    /// Set the fake time in milliseconds since the Unix epoch
    ///
    /// # Errors
    ///
    /// Returns error if fake timers are not in use or the timestamp cannot
    /// be represented
    pub fn set_system_time_ms(&self, ms: i64) -> Result<(), ClockError> {
        self.ensure_fake()?;
        if Utc.timestamp_millis_opt(ms).single().is_none() {
            return Err(ClockError::OutOfRange(ms));
        }
        self.fake_ms.store(ms, Ordering::SeqCst);
        debug!(ms, "system time set");
        Ok(())
    }

    /// Move fake time forward
    ///
    /// # Errors
    ///
    /// Returns error if fake timers are not in use or the result overflows
    pub fn advance_time_by(&self, duration: Duration) -> Result<(), ClockError> {
        self.ensure_fake()?;
        let delta = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        let current = self.fake_ms.load(Ordering::SeqCst);
        let next = current.saturating_add(delta);
        if Utc.timestamp_millis_opt(next).single().is_none() {
            return Err(ClockError::OutOfRange(next));
        }
        self.fake_ms.store(next, Ordering::SeqCst);
        Ok(())
    }

    /// Current time in milliseconds since the Unix epoch
    #[must_use]
    pub fn now_ms(&self) -> i64 {
        if self.is_fake() {
            self.fake_ms.load(Ordering::SeqCst)
        } else {
            Utc::now().timestamp_millis()
        }
    }

    /// Current time
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.now_ms())
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Whether fake time is in use
    #[must_use]
    pub fn is_fake(&self) -> bool {
        self.fake.load(Ordering::SeqCst)
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ClockState {
        if self.is_fake() {
            ClockState::Fake
        } else {
            ClockState::Real
        }
    }

    fn ensure_fake(&self) -> Result<(), ClockError> {
        if self.is_fake() {
            Ok(())
        } else {
            Err(ClockError::NotInstalled)
        }
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared clock handle
pub type Clock = Arc<FakeClock>;

/// Create a new shared clock
#[must_use]
pub fn create_clock() -> Clock {
    Arc::new(FakeClock::new())
}
