//! Mock handles: tracked callables with call history.
//!
//! A [`MockHandle`] is either a standalone mock created by the registry or a
//! spy installed over a [`TargetObject`](crate::TargetObject) slot. Handles
//! are cheap to clone; all clones share the same state.
//!
//! ## Re-entrancy
//!
//! The handle's state is never borrowed while an implementation runs, so an
//! implementation may call other mocks, call itself, or clear its own history.

use crate::config::ResetPolicy;
use crate::function::MockFn;
use crate::object::{Callable, TargetObject, WeakTarget};
use crate::result::{SpyError, SpyResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Arguments exactly as passed
    pub args: Vec<Value>,
    /// Returned value, `None` while the call is still running
    pub result: Option<Value>,
    /// Registry-wide, strictly increasing invocation number
    pub invocation_order: u64,
}

/// Where a spy is installed and what it replaced
#[derive(Debug)]
struct SpyTarget {
    object: WeakTarget,
    key: String,
    original: Callable,
}

struct MockState {
    name: String,
    target: Option<SpyTarget>,
    initial: MockFn,
    current: MockFn,
    once: VecDeque<MockFn>,
    records: Vec<CallRecord>,
    /// Bumped whenever `records` is emptied so in-flight calls do not write
    /// their result into a record that no longer exists.
    epoch: u64,
    active: bool,
    retired: bool,
    reset_policy: ResetPolicy,
    sequence: Rc<Cell<u64>>,
}

impl MockState {
    fn is_stale(&self) -> bool {
        self.retired || (self.target.is_some() && !self.active)
    }

    fn clear_history(&mut self) {
        self.records.clear();
        self.epoch += 1;
    }

    fn reset_implementation(&mut self) {
        self.clear_history();
        self.once.clear();
        self.current = match self.reset_policy {
            ResetPolicy::Initial => self.initial.clone(),
            ResetPolicy::Stub => MockFn::stub(),
        };
    }
}

/// Tracked callable handed out by [`MockRegistry`](crate::MockRegistry)
#[derive(Clone)]
pub struct MockHandle {
    state: Rc<RefCell<MockState>>,
}

impl fmt::Debug for MockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MockHandle")
            .field("name", &state.name)
            .field("key", &state.target.as_ref().map(|t| t.key.as_str()))
            .field("calls", &state.records.len())
            .field("active", &state.active)
            .field("retired", &state.retired)
            .finish()
    }
}

impl MockHandle {
    pub(crate) fn standalone(
        implementation: MockFn,
        reset_policy: ResetPolicy,
        sequence: Rc<Cell<u64>>,
    ) -> Self {
        Self::from_state(MockState {
            name: "mock".to_string(),
            target: None,
            initial: implementation.clone(),
            current: implementation,
            once: VecDeque::new(),
            records: Vec::new(),
            epoch: 0,
            active: true,
            retired: false,
            reset_policy,
            sequence,
        })
    }

    /// Build a spy and install it in `object[key]`.
    pub(crate) fn install_spy(
        object: &TargetObject,
        key: &str,
        reset_policy: ResetPolicy,
        sequence: Rc<Cell<u64>>,
    ) -> SpyResult<Self> {
        let handle = Self::from_state(MockState {
            name: format!("spy::{key}"),
            target: None,
            initial: MockFn::stub(),
            current: MockFn::stub(),
            once: VecDeque::new(),
            records: Vec::new(),
            epoch: 0,
            active: true,
            retired: false,
            reset_policy,
            sequence,
        });

        let original = object.install(key, &handle)?;
        let delegate = original.clone().into_fn();
        {
            let mut state = handle.state.borrow_mut();
            state.initial = delegate.clone();
            state.current = delegate;
            state.target = Some(SpyTarget {
                object: object.downgrade(),
                key: key.to_string(),
                original,
            });
        }
        Ok(handle)
    }

    fn from_state(state: MockState) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Invoke the mock: record the call, then run the next one-shot
    /// implementation or the current implementation.
    pub fn call(&self, args: &[Value]) -> Value {
        let (implementation, index, epoch) = {
            let mut state = self.state.borrow_mut();
            let order = state.sequence.get() + 1;
            state.sequence.set(order);
            state.records.push(CallRecord {
                args: args.to_vec(),
                result: None,
                invocation_order: order,
            });
            let implementation = match state.once.pop_front() {
                Some(once) => once,
                None => state.current.clone(),
            };
            trace!(mock = %state.name, order, "mock called");
            (implementation, state.records.len() - 1, state.epoch)
        };

        let result = implementation.call(args);

        let mut state = self.state.borrow_mut();
        if state.epoch == epoch {
            if let Some(record) = state.records.get_mut(index) {
                record.result = Some(result.clone());
            }
        }
        result
    }

    /// Argument lists of every recorded call, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.state
            .borrow()
            .records
            .iter()
            .map(|r| r.args.clone())
            .collect()
    }

    /// Full call records, oldest first
    #[must_use]
    pub fn call_records(&self) -> Vec<CallRecord> {
        self.state.borrow().records.clone()
    }

    /// Returned values of completed calls, oldest first
    #[must_use]
    pub fn results(&self) -> Vec<Value> {
        self.state
            .borrow()
            .records
            .iter()
            .filter_map(|r| r.result.clone())
            .collect()
    }

    /// Number of recorded calls
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.borrow().records.len()
    }

    /// Arguments of the most recent call
    #[must_use]
    pub fn last_call(&self) -> Option<Vec<Value>> {
        self.state.borrow().records.last().map(|r| r.args.clone())
    }

    /// Invocation order numbers of the recorded calls
    #[must_use]
    pub fn invocation_call_order(&self) -> Vec<u64> {
        self.state
            .borrow()
            .records
            .iter()
            .map(|r| r.invocation_order)
            .collect()
    }

    /// Implementation used for calls without a queued one-shot implementation.
    ///
    /// Still available after the spy has been restored.
    #[must_use]
    pub fn get_mock_implementation(&self) -> MockFn {
        self.state.borrow().current.clone()
    }

    /// Replace the implementation
    pub fn mock_implementation<F>(&self, f: F) -> SpyResult<Self>
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        let mut state = self.live_state()?;
        state.current = MockFn::new(f);
        debug!(mock = %state.name, "implementation replaced");
        Ok(self.clone())
    }

    /// Queue an implementation used for exactly one call
    pub fn mock_implementation_once<F>(&self, f: F) -> SpyResult<Self>
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        self.live_state()?.once.push_back(MockFn::new(f));
        Ok(self.clone())
    }

    /// Always return `value`
    pub fn mock_return_value(&self, value: Value) -> SpyResult<Self> {
        self.live_state()?.current = MockFn::returning(value);
        Ok(self.clone())
    }

    /// Return `value` for exactly one call
    pub fn mock_return_value_once(&self, value: Value) -> SpyResult<Self> {
        self.live_state()?
            .once
            .push_back(MockFn::returning(value));
        Ok(self.clone())
    }

    /// Set the display name
    pub fn mock_name(&self, name: impl Into<String>) -> Self {
        self.state.borrow_mut().name = name.into();
        self.clone()
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    /// Forget recorded calls, keep the implementation
    pub fn mock_clear(&self) -> SpyResult<()> {
        self.live_state()?.clear_history();
        Ok(())
    }

    /// Forget recorded calls and queued one-shots, and fall back to the
    /// default implementation of the configured [`ResetPolicy`]
    pub fn mock_reset(&self) -> SpyResult<()> {
        self.live_state()?.reset_implementation();
        Ok(())
    }

    /// Put the original method back into the spied slot.
    ///
    /// History and implementation are kept. Standalone mocks are unaffected.
    pub fn mock_restore(&self) -> SpyResult<()> {
        drop(self.live_state()?);
        self.detach();
        Ok(())
    }

    /// Whether a spy is installed (always true for live standalone mocks)
    #[must_use]
    pub fn is_active(&self) -> bool {
        let state = self.state.borrow();
        state.active && !state.retired
    }

    /// Whether this handle was created by `spy_on`
    #[must_use]
    pub fn is_spy(&self) -> bool {
        self.state.borrow().target.is_some()
    }

    /// Spied slot key
    #[must_use]
    pub fn key(&self) -> Option<String> {
        self.state.borrow().target.as_ref().map(|t| t.key.clone())
    }

    /// Whether mutations on this handle fail with [`SpyError::StaleHandle`]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.state.borrow().is_stale()
    }

    /// Whether both handles share state
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    fn live_state(&self) -> SpyResult<std::cell::RefMut<'_, MockState>> {
        let state = self.state.borrow_mut();
        if state.is_stale() {
            return Err(SpyError::stale(state.name.clone()));
        }
        Ok(state)
    }

    pub(crate) fn clear_history(&self) {
        self.state.borrow_mut().clear_history();
    }

    pub(crate) fn reset_implementation(&self) {
        self.state.borrow_mut().reset_implementation();
    }

    /// Reinstall the original callable. Returns `true` if this call
    /// deactivated an installed spy.
    pub(crate) fn detach(&self) -> bool {
        let (object, key, original) = {
            let mut state = self.state.borrow_mut();
            if !state.active {
                return false;
            }
            let Some(target) = state.target.as_ref() else {
                return false;
            };
            let parts = (
                target.object.upgrade(),
                target.key.clone(),
                target.original.clone(),
            );
            state.active = false;
            parts
        };

        let original = original.resolve();
        match object {
            Some(object) => {
                if object.reinstate(&key, self, original.clone()) {
                    debug!(object = %object.name(), key = %key, "spy restored");
                } else if self.splice_out(object.get(&key), original) {
                    debug!(object = %object.name(), key = %key, "spy spliced out of layered spies");
                } else {
                    warn!(
                        object = %object.name(),
                        key = %key,
                        "slot no longer holds the spy, leaving it untouched"
                    );
                }
            }
            None => debug!(key = %key, "spied object already dropped"),
        }
        true
    }

    /// What a restored spy replaced. Calls reaching a restored spy through a
    /// slot or a layered spy are passed on to it.
    pub(crate) fn passthrough(&self) -> Option<Callable> {
        let state = self.state.borrow();
        if state.active {
            return None;
        }
        state.target.as_ref().map(|t| t.original.clone())
    }

    /// Walk the spies layered on top of this one, starting at `top`, and point
    /// the one whose original is this spy at `replacement` instead.
    fn splice_out(&self, top: Option<Callable>, replacement: Callable) -> bool {
        let mut current = top;
        while let Some(Callable::Mock(layer)) = current {
            if layer.ptr_eq(self) {
                return false;
            }
            let mut state = layer.state.borrow_mut();
            let Some(target) = state.target.as_mut() else {
                return false;
            };
            if target.original.is_mock(self) {
                target.original = replacement;
                return true;
            }
            current = Some(target.original.clone());
        }
        false
    }

    pub(crate) fn retire(&self) {
        self.state.borrow_mut().retired = true;
    }
}
