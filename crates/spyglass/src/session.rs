//! Per-test mocking session.
//!
//! A [`MockSession`] bundles a [`MockRegistry`] and a shared [`Clock`] so a
//! test gets everything it needs from one injected value instead of global
//! state. When the session is finished (explicitly or on drop) every spy is
//! restored, the registry is torn down, and the clock goes back to real time.

use crate::clock::{create_clock, Clock};
use crate::config::MockConfig;
use crate::mock::MockHandle;
use crate::object::TargetObject;
use crate::registry::MockRegistry;
use crate::result::SpyResult;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Registry and clock scoped to one test
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use spyglass::{MockSession, TargetObject};
///
/// let obj = TargetObject::new("obj").with_method("add", |args: &[Value]| {
///     json!(args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0))
/// });
///
/// {
///     let session = MockSession::new();
///     let spy = session.spy_on(&obj, "add")?;
///     obj.invoke("add", &[json!(2), json!(3)])?;
///     assert_eq!(spy.calls(), vec![vec![json!(2), json!(3)]]);
/// } // dropped: spy restored
///
/// assert!(obj.get("add").and_then(|c| c.as_mock().cloned()).is_none());
/// # Ok::<(), spyglass::SpyError>(())
/// ```
#[derive(Debug)]
pub struct MockSession {
    registry: MockRegistry,
    clock: Clock,
    finished: bool,
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSession {
    /// Create a session with default configuration and its own clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a session with the given registry configuration
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            registry: MockRegistry::with_config(config),
            clock: create_clock(),
            finished: false,
        }
    }

    /// Use an existing clock, e.g. one shared with the code under test
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Underlying registry
    #[must_use]
    pub fn registry(&self) -> &MockRegistry {
        &self.registry
    }

    /// Underlying clock
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// See [`MockRegistry::create_mock`]
    pub fn create_mock(&self) -> MockHandle {
        self.registry.create_mock()
    }

    /// See [`MockRegistry::create_mock_with`]
    pub fn create_mock_with<F>(&self, f: F) -> MockHandle
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        self.registry.create_mock_with(f)
    }

    /// See [`MockRegistry::spy_on`]
    pub fn spy_on(&self, target: &TargetObject, key: &str) -> SpyResult<MockHandle> {
        self.registry.spy_on(target, key)
    }

    /// See [`MockRegistry::clear_all_mocks`]
    pub fn clear_all_mocks(&self) {
        self.registry.clear_all_mocks();
    }

    /// See [`MockRegistry::reset_all_mocks`]
    pub fn reset_all_mocks(&self) {
        self.registry.reset_all_mocks();
    }

    /// See [`MockRegistry::restore_all_mocks`]
    pub fn restore_all_mocks(&self) {
        self.registry.restore_all_mocks();
    }

    /// Freeze time at the current system time
    pub fn use_fake_timers(&self) -> SpyResult<()> {
        Ok(self.clock.use_fake_timers()?)
    }

    /// Set the fake time
    pub fn set_system_time(&self, at: DateTime<Utc>) -> SpyResult<()> {
        Ok(self.clock.set_system_time(at)?)
    }

    /// Move fake time forward
    pub fn advance_time_by(&self, duration: Duration) -> SpyResult<()> {
        Ok(self.clock.advance_time_by(duration)?)
    }

    /// Go back to system time
    pub fn use_real_timers(&self) {
        self.clock.use_real_timers();
    }

    /// Current time as seen by code under test
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Call between test cases; applies the configured boundary flags
    pub fn before_each(&self) {
        self.registry.apply_test_boundary();
    }

    /// Restore spies, tear the registry down and switch to real time.
    /// Safe to call more than once.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.registry.teardown();
        self.clock.use_real_timers();
        self.finished = true;
        debug!("mock session finished");
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.finish();
    }
}
