//! Mock registry with bulk lifecycle operations.
//!
//! The registry owns every mock and spy created through it and applies the
//! three lifecycle operations in bulk:
//!
//! | operation           | call history | implementation        | installed on target |
//! |---------------------|--------------|-----------------------|---------------------|
//! | `clear_all_mocks`   | emptied      | kept                  | kept                |
//! | `reset_all_mocks`   | emptied      | back to the default   | kept                |
//! | `restore_all_mocks` | kept         | kept                  | original reinstated |
//!
//! The default implementation after a reset is decided by
//! [`ResetPolicy`](crate::ResetPolicy).
//!
//! # Example
//!
//! ```
//! use serde_json::{json, Value};
//! use spyglass::{MockRegistry, TargetObject};
//!
//! let person = TargetObject::new("person").with_method("say_hi", |args: &[Value]| {
//!     json!(format!("Hi {}", args[0].as_str().unwrap_or_default()))
//! });
//! let registry = MockRegistry::new();
//!
//! let spy = registry
//!     .spy_on(&person, "say_hi")?
//!     .mock_implementation(|_| json!("mocked hi"))?;
//! assert_eq!(person.invoke("say_hi", &[json!("Alice")])?, json!("mocked hi"));
//!
//! registry.restore_all_mocks();
//! assert_eq!(person.invoke("say_hi", &[json!("Bob")])?, json!("Hi Bob"));
//! assert_eq!(spy.calls(), vec![vec![json!("Alice")]]);
//! # Ok::<(), spyglass::SpyError>(())
//! ```

use crate::config::MockConfig;
use crate::function::MockFn;
use crate::mock::MockHandle;
use crate::object::{ObjectId, TargetObject};
use crate::result::SpyResult;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

#[derive(Default)]
struct RegistryInner {
    config: MockConfig,
    handles: Vec<MockHandle>,
    spies: HashMap<(ObjectId, String), MockHandle>,
    sequence: Rc<Cell<u64>>,
}

/// Registry of mocks and spies.
///
/// Cloning yields another reference to the same registry. Create one per
/// test (or use [`MockSession`](crate::MockSession)) instead of sharing a
/// global.
#[derive(Clone, Default)]
pub struct MockRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MockRegistry")
            .field("config", &inner.config)
            .field("handles", &inner.handles.len())
            .field("spies", &inner.spies.len())
            .finish()
    }
}

impl MockRegistry {
    /// Create an empty registry with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        let registry = Self::new();
        registry.inner.borrow_mut().config = config;
        registry
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> MockConfig {
        self.inner.borrow().config.clone()
    }

    /// Create a standalone mock returning `Null`
    pub fn create_mock(&self) -> MockHandle {
        self.register_standalone(MockFn::stub())
    }

    /// Create a standalone mock backed by `f`
    pub fn create_mock_with<F>(&self, f: F) -> MockHandle
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        self.register_standalone(MockFn::new(f))
    }

    fn register_standalone(&self, implementation: MockFn) -> MockHandle {
        let mut inner = self.inner.borrow_mut();
        let handle = MockHandle::standalone(
            implementation,
            inner.config.reset_policy,
            inner.sequence.clone(),
        );
        inner.handles.push(handle.clone());
        debug!(handles = inner.handles.len(), "mock created");
        handle
    }

    /// Spy on `target[key]`.
    ///
    /// The spy records every call and delegates to the original method until
    /// an implementation is set. Spying again on a slot that already holds an
    /// active spy from this registry returns that spy.
    ///
    /// # Errors
    ///
    /// [`SpyError::InvalidTarget`](crate::SpyError::InvalidTarget) if the slot
    /// is missing, holds data, or is frozen.
    pub fn spy_on(&self, target: &TargetObject, key: &str) -> SpyResult<MockHandle> {
        let slot = (target.id(), key.to_string());

        let existing = self.inner.borrow().spies.get(&slot).cloned();
        if let Some(existing) = existing {
            if existing.is_active() && target.holds(key, &existing) {
                debug!(object = %target.name(), key, "reusing active spy");
                return Ok(existing);
            }
        }

        let (policy, sequence) = {
            let inner = self.inner.borrow();
            (inner.config.reset_policy, inner.sequence.clone())
        };
        let handle = MockHandle::install_spy(target, key, policy, sequence)?;

        let mut inner = self.inner.borrow_mut();
        inner.handles.push(handle.clone());
        let _ = inner.spies.insert(slot, handle.clone());
        debug!(object = %target.name(), key, "spy installed");
        Ok(handle)
    }

    /// Empty the call history of every live mock
    pub fn clear_all_mocks(&self) {
        let handles = self.live_handles();
        for handle in &handles {
            handle.clear_history();
        }
        debug!(count = handles.len(), "cleared all mocks");
    }

    /// Empty call history and reset the implementation of every live mock
    pub fn reset_all_mocks(&self) {
        let handles = self.live_handles();
        for handle in &handles {
            handle.reset_implementation();
        }
        debug!(count = handles.len(), "reset all mocks");
    }

    /// Reinstall the original method of every active spy.
    ///
    /// Restored spies keep their history and implementation but leave the
    /// registry; later bulk operations no longer touch them.
    pub fn restore_all_mocks(&self) {
        let spies: Vec<MockHandle> = self
            .live_handles()
            .into_iter()
            .filter(MockHandle::is_spy)
            .collect();

        let restored = spies.iter().filter(|spy| spy.detach()).count();
        self.forget_stale();
        debug!(count = restored, "restored all mocks");
    }

    /// End-of-run teardown: restore all spies and retire every handle.
    ///
    /// Retired handles stay queryable but reject mutation.
    pub fn teardown(&self) {
        self.restore_all_mocks();
        let handles = {
            let mut inner = self.inner.borrow_mut();
            inner.spies.clear();
            std::mem::take(&mut inner.handles)
        };
        for handle in &handles {
            handle.retire();
        }
        debug!(count = handles.len(), "registry torn down");
    }

    /// Hook for the host runner between test cases; applies the
    /// `clear_mocks`, `mock_reset` and `restore_mocks` flags in that order.
    pub fn apply_test_boundary(&self) {
        let config = self.config();
        if config.clear_mocks {
            self.clear_all_mocks();
        }
        if config.mock_reset {
            self.reset_all_mocks();
        }
        if config.restore_mocks {
            self.restore_all_mocks();
        }
    }

    /// Number of registered handles
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().handles.len()
    }

    /// Whether no handle is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().handles.is_empty()
    }

    /// Number of spies currently installed
    #[must_use]
    pub fn active_spy_count(&self) -> usize {
        self.inner
            .borrow()
            .spies
            .values()
            .filter(|h| h.is_active())
            .count()
    }

    /// Registered handles in creation order
    #[must_use]
    pub fn handles(&self) -> Vec<MockHandle> {
        self.inner.borrow().handles.clone()
    }

    /// Snapshot taken so no registry borrow is held while handles change
    fn live_handles(&self) -> Vec<MockHandle> {
        self.inner
            .borrow()
            .handles
            .iter()
            .filter(|h| !h.is_stale())
            .cloned()
            .collect()
    }

    fn forget_stale(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.handles.retain(|h| !h.is_stale());
        inner.spies.retain(|_, h| !h.is_stale());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResetPolicy;
    use crate::object::Callable;
    use crate::result::SpyError;
    use proptest::prelude::*;
    use serde_json::json;

    fn person() -> TargetObject {
        TargetObject::new("person")
            .with_method("say_hi", |args: &[Value]| {
                json!(format!("Hi {}", args[0].as_str().unwrap_or_default()))
            })
            .with_method("say_bye", |args: &[Value]| {
                json!(format!("Bye {}", args[0].as_str().unwrap_or_default()))
            })
    }

    /// Spy on both methods of `person` with mocked greetings and call each
    /// once with "Alice".
    fn mocked_person(registry: &MockRegistry) -> (TargetObject, MockHandle, MockHandle) {
        let person = person();
        let hi = registry
            .spy_on(&person, "say_hi")
            .unwrap()
            .mock_implementation(|_| json!("mocked hi"))
            .unwrap();
        let bye = registry
            .spy_on(&person, "say_bye")
            .unwrap()
            .mock_implementation(|_| json!("mocked bye"))
            .unwrap();

        assert_eq!(person.invoke("say_hi", &[json!("Alice")]).unwrap(), json!("mocked hi"));
        assert_eq!(hi.calls(), vec![vec![json!("Alice")]]);
        assert_eq!(person.invoke("say_bye", &[json!("Alice")]).unwrap(), json!("mocked bye"));
        assert_eq!(bye.calls(), vec![vec![json!("Alice")]]);
        (person, hi, bye)
    }

    // =========================================================================
    // Standalone mocks
    // =========================================================================

    #[test]
    fn test_create_mock_returns_null() {
        let registry = MockRegistry::new();
        let mock = registry.create_mock();
        assert_eq!(mock.call(&[json!(1), json!("a")]), Value::Null);
        assert_eq!(mock.calls(), vec![vec![json!(1), json!("a")]]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_mock_with_impl() {
        let registry = MockRegistry::new();
        let mock = registry.create_mock_with(|args| json!(args[0].as_i64().unwrap_or(0) * 2));
        assert_eq!(mock.call(&[json!(5)]), json!(10));
        assert_eq!(mock.call_count(), 1);
    }

    // =========================================================================
    // spy_on
    // =========================================================================

    #[test]
    fn test_spy_delegates_to_original() {
        let registry = MockRegistry::new();
        let obj = TargetObject::new("obj").with_method("add", |args: &[Value]| {
            json!(args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0))
        });
        let spy = registry.spy_on(&obj, "add").unwrap();
        assert_eq!(obj.invoke("add", &[json!(2), json!(3)]).unwrap(), json!(5));
        assert_eq!(spy.calls(), vec![vec![json!(2), json!(3)]]);
        assert!(obj.holds("add", &spy));
        assert!(spy.is_spy());
        assert_eq!(spy.key().as_deref(), Some("add"));
        assert_eq!(spy.name(), "spy::add");
    }

    #[test]
    fn test_spy_missing_key() {
        let registry = MockRegistry::new();
        let err = registry.spy_on(&person(), "say_what").unwrap_err();
        assert!(matches!(err, SpyError::InvalidTarget { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_spy_data_slot() {
        let registry = MockRegistry::new();
        let obj = person();
        obj.define_value("age", json!(30));
        assert!(matches!(
            registry.spy_on(&obj, "age"),
            Err(SpyError::InvalidTarget { .. })
        ));
        assert_eq!(obj.value("age"), Some(json!(30)));
    }

    #[test]
    fn test_spy_frozen_slot() {
        let registry = MockRegistry::new();
        let obj = TargetObject::new("frozen");
        obj.define_frozen_method("run", MockFn::stub());
        let err = registry.spy_on(&obj, "run").unwrap_err();
        assert!(err.to_string().contains("not configurable"));
        assert!(matches!(obj.get("run"), Some(Callable::Function(_))));
    }

    #[test]
    fn test_spy_twice_returns_same_handle() {
        let registry = MockRegistry::new();
        let obj = person();
        let first = registry.spy_on(&obj, "say_hi").unwrap();
        let second = registry.spy_on(&obj, "say_hi").unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_spy_count(), 1);

        registry.restore_all_mocks();
        assert_eq!(obj.invoke("say_hi", &[json!("Eve")]).unwrap(), json!("Hi Eve"));
        assert!(!obj.holds("say_hi", &first));
    }

    #[test]
    fn test_respy_after_restore_creates_new_handle() {
        let registry = MockRegistry::new();
        let obj = person();
        let first = registry.spy_on(&obj, "say_hi").unwrap();
        obj.invoke("say_hi", &[json!("A")]).unwrap();
        registry.restore_all_mocks();

        let second = registry.spy_on(&obj, "say_hi").unwrap();
        assert!(!first.ptr_eq(&second));
        obj.invoke("say_hi", &[json!("B")]).unwrap();
        assert_eq!(first.calls(), vec![vec![json!("A")]]);
        assert_eq!(second.calls(), vec![vec![json!("B")]]);
    }

    #[test]
    fn test_spies_from_two_registries_layer() {
        let outer = MockRegistry::new();
        let inner = MockRegistry::new();
        let obj = person();
        let a = outer.spy_on(&obj, "say_hi").unwrap();
        let b = inner.spy_on(&obj, "say_hi").unwrap();
        assert!(!a.ptr_eq(&b));

        obj.invoke("say_hi", &[json!("X")]).unwrap();
        assert_eq!(a.call_count(), 1);
        assert_eq!(b.call_count(), 1);

        inner.restore_all_mocks();
        assert!(obj.holds("say_hi", &a));
        outer.restore_all_mocks();
        assert_eq!(obj.invoke("say_hi", &[json!("Y")]).unwrap(), json!("Hi Y"));
        assert_eq!(a.call_count(), 1);
    }

    #[test]
    fn test_layered_spies_restored_outer_first() {
        let outer = MockRegistry::new();
        let inner = MockRegistry::new();
        let obj = person();
        let a = outer
            .spy_on(&obj, "say_hi")
            .unwrap()
            .mock_implementation(|_| json!("mocked by a"))
            .unwrap();
        let b = inner.spy_on(&obj, "say_hi").unwrap();
        assert_eq!(obj.invoke("say_hi", &[json!("X")]).unwrap(), json!("mocked by a"));

        outer.restore_all_mocks();
        assert!(obj.holds("say_hi", &b));
        assert_eq!(obj.invoke("say_hi", &[json!("Y")]).unwrap(), json!("Hi Y"));
        assert_eq!(a.calls(), vec![vec![json!("X")]]);
        assert_eq!(b.calls(), vec![vec![json!("X")], vec![json!("Y")]]);

        inner.restore_all_mocks();
        assert!(!obj.holds("say_hi", &a));
        assert!(!obj.holds("say_hi", &b));
        assert_eq!(obj.invoke("say_hi", &[json!("Bob")]).unwrap(), json!("Hi Bob"));
        assert_eq!(a.call_count(), 1);
        assert_eq!(b.call_count(), 2);
    }

    #[test]
    fn test_three_layers_restore_middle_first() {
        let registries = [MockRegistry::new(), MockRegistry::new(), MockRegistry::new()];
        let obj = person();
        let spies: Vec<MockHandle> = registries
            .iter()
            .map(|r| r.spy_on(&obj, "say_hi").unwrap())
            .collect();

        for index in [1, 0, 2] {
            registries[index].restore_all_mocks();
            assert_eq!(obj.invoke("say_hi", &[json!("Z")]).unwrap(), json!("Hi Z"));
        }

        assert!(spies.iter().all(|s| !obj.holds("say_hi", s)));
        assert_eq!(obj.invoke("say_hi", &[json!("Bob")]).unwrap(), json!("Hi Bob"));
        assert_eq!(spies[2].call_count(), 2);
        assert_eq!(spies[1].call_count(), 0);
    }

    // =========================================================================
    // clear_all_mocks
    // =========================================================================

    #[test]
    fn test_clear_all_keeps_implementations() {
        let registry = MockRegistry::new();
        let (person, hi, bye) = mocked_person(&registry);

        registry.clear_all_mocks();

        assert!(hi.calls().is_empty());
        assert!(person.holds("say_hi", &hi));
        assert_eq!(person.invoke("say_hi", &[json!("Bob")]).unwrap(), json!("mocked hi"));
        assert_eq!(hi.calls(), vec![vec![json!("Bob")]]);

        assert!(bye.calls().is_empty());
        assert!(person.holds("say_bye", &bye));
        assert_eq!(person.invoke("say_bye", &[json!("Bob")]).unwrap(), json!("mocked bye"));
        assert_eq!(bye.calls(), vec![vec![json!("Bob")]]);
    }

    #[test]
    fn test_clear_all_is_idempotent() {
        let registry = MockRegistry::new();
        let mock = registry.create_mock();
        mock.call(&[]);
        registry.clear_all_mocks();
        registry.clear_all_mocks();
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_bulk_operations_on_empty_registry() {
        let registry = MockRegistry::new();
        registry.clear_all_mocks();
        registry.reset_all_mocks();
        registry.restore_all_mocks();
        registry.teardown();
        assert!(registry.is_empty());
    }

    // =========================================================================
    // reset_all_mocks
    // =========================================================================

    #[test]
    fn test_reset_all_reverts_spies_to_original() {
        let registry = MockRegistry::new();
        let (person, hi, bye) = mocked_person(&registry);

        registry.reset_all_mocks();

        assert!(hi.calls().is_empty());
        assert!(person.holds("say_hi", &hi));
        assert_eq!(person.invoke("say_hi", &[json!("Bob")]).unwrap(), json!("Hi Bob"));
        assert_eq!(hi.calls(), vec![vec![json!("Bob")]]);

        assert!(bye.calls().is_empty());
        assert!(person.holds("say_bye", &bye));
        assert_eq!(person.invoke("say_bye", &[json!("Bob")]).unwrap(), json!("Bye Bob"));
        assert_eq!(bye.calls(), vec![vec![json!("Bob")]]);
    }

    #[test]
    fn test_reset_all_stub_policy() {
        let registry =
            MockRegistry::with_config(MockConfig::new().with_reset_policy(ResetPolicy::Stub));
        let (person, hi, _bye) = mocked_person(&registry);

        registry.reset_all_mocks();

        assert_eq!(person.invoke("say_hi", &[json!("Bob")]).unwrap(), Value::Null);
        assert_eq!(hi.calls(), vec![vec![json!("Bob")]]);
        assert!(person.holds("say_hi", &hi));
    }

    #[test]
    fn test_reset_all_standalone_with_impl() {
        let registry = MockRegistry::new();
        let mock = registry.create_mock_with(|_| json!("initial"));
        mock.mock_return_value(json!("changed")).unwrap();
        mock.mock_return_value_once(json!("once")).unwrap();
        registry.reset_all_mocks();
        assert_eq!(mock.call(&[]), json!("initial"));
    }

    // =========================================================================
    // restore_all_mocks
    // =========================================================================

    #[test]
    fn test_restore_all_keeps_history_and_implementation() {
        let registry = MockRegistry::new();
        let (person, hi, bye) = mocked_person(&registry);

        registry.restore_all_mocks();

        assert!(!person.holds("say_hi", &hi));
        assert_eq!(person.invoke("say_hi", &[json!("Bob")]).unwrap(), json!("Hi Bob"));
        assert!(!person.holds("say_bye", &bye));
        assert_eq!(person.invoke("say_bye", &[json!("Bob")]).unwrap(), json!("Bye Bob"));

        assert_eq!(hi.calls(), vec![vec![json!("Alice")]]);
        assert_eq!(bye.calls(), vec![vec![json!("Alice")]]);

        assert_eq!(hi.get_mock_implementation().call(&[json!("Test")]), json!("mocked hi"));
        assert_eq!(bye.get_mock_implementation().call(&[json!("Test")]), json!("mocked bye"));
        assert!(!hi.is_active());
        assert_eq!(registry.active_spy_count(), 0);
    }

    #[test]
    fn test_restore_reinstates_identical_function() {
        let registry = MockRegistry::new();
        let original = MockFn::returning(json!("orig"));
        let obj = TargetObject::new("obj");
        obj.define_method("run", original.clone());
        let _spy = registry.spy_on(&obj, "run").unwrap();
        registry.restore_all_mocks();
        match obj.get("run") {
            Some(Callable::Function(f)) => assert!(f.ptr_eq(&original)),
            other => panic!("expected original function, got {other:?}"),
        }
    }

    #[test]
    fn test_restore_all_leaves_standalone_mocks() {
        let registry = MockRegistry::new();
        let mock = registry.create_mock_with(|_| json!(1));
        mock.call(&[]);
        registry.restore_all_mocks();
        assert!(mock.is_active());
        assert_eq!(mock.call_count(), 1);
        mock.mock_return_value(json!(2)).unwrap();
        assert_eq!(mock.call(&[]), json!(2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_restored_spy_is_stale() {
        let registry = MockRegistry::new();
        let (_person, hi, _bye) = mocked_person(&registry);
        registry.restore_all_mocks();

        assert!(matches!(
            hi.mock_implementation(|_| json!("again")),
            Err(SpyError::StaleHandle { .. })
        ));
        assert!(matches!(hi.mock_clear(), Err(SpyError::StaleHandle { .. })));
        assert!(matches!(hi.mock_restore(), Err(SpyError::StaleHandle { .. })));

        // bulk operations skip it
        registry.clear_all_mocks();
        assert_eq!(hi.calls(), vec![vec![json!("Alice")]]);
    }

    #[test]
    fn test_restore_after_object_dropped() {
        let registry = MockRegistry::new();
        let spy = {
            let obj = person();
            registry.spy_on(&obj, "say_hi").unwrap()
        };
        registry.restore_all_mocks();
        assert!(!spy.is_active());
    }

    #[test]
    fn test_restore_skips_redefined_slot() {
        let registry = MockRegistry::new();
        let obj = person();
        let _spy = registry.spy_on(&obj, "say_hi").unwrap();
        let replacement = MockFn::returning(json!("replacement"));
        obj.define_method("say_hi", replacement.clone());
        registry.restore_all_mocks();
        assert_eq!(obj.invoke("say_hi", &[json!("Z")]).unwrap(), json!("replacement"));
    }

    #[test]
    fn test_per_handle_restore() {
        let registry = MockRegistry::new();
        let (person, hi, bye) = mocked_person(&registry);
        hi.mock_restore().unwrap();
        assert_eq!(person.invoke("say_hi", &[json!("Bob")]).unwrap(), json!("Hi Bob"));
        assert_eq!(person.invoke("say_bye", &[json!("Bob")]).unwrap(), json!("mocked bye"));
        assert_eq!(bye.call_count(), 2);

        registry.restore_all_mocks();
        assert_eq!(person.invoke("say_bye", &[json!("Bob")]).unwrap(), json!("Bye Bob"));
        assert_eq!(hi.calls(), vec![vec![json!("Alice")]]);
    }

    // =========================================================================
    // teardown and test boundaries
    // =========================================================================

    #[test]
    fn test_teardown_retires_handles() {
        let registry = MockRegistry::new();
        let mock = registry.create_mock();
        let obj = person();
        let spy = registry.spy_on(&obj, "say_hi").unwrap();
        mock.call(&[json!(1)]);

        registry.teardown();

        assert!(registry.is_empty());
        assert!(mock.is_stale());
        assert!(spy.is_stale());
        assert!(!obj.holds("say_hi", &spy));
        assert_eq!(mock.calls(), vec![vec![json!(1)]]);
        assert!(matches!(
            mock.mock_return_value(json!(0)),
            Err(SpyError::StaleHandle { .. })
        ));
    }

    #[test]
    fn test_test_boundary_clear_only() {
        let registry = MockRegistry::with_config(MockConfig::new().with_clear_mocks(true));
        let (person, hi, _bye) = mocked_person(&registry);
        registry.apply_test_boundary();
        assert!(hi.calls().is_empty());
        assert_eq!(person.invoke("say_hi", &[json!("Bob")]).unwrap(), json!("mocked hi"));
    }

    #[test]
    fn test_test_boundary_restore() {
        let registry = MockRegistry::with_config(MockConfig::new().with_restore_mocks(true));
        let (person, hi, _bye) = mocked_person(&registry);
        registry.apply_test_boundary();
        assert_eq!(hi.call_count(), 1);
        assert_eq!(person.invoke("say_hi", &[json!("Bob")]).unwrap(), json!("Hi Bob"));
    }

    #[test]
    fn test_test_boundary_default_does_nothing() {
        let registry = MockRegistry::new();
        let (_person, hi, _bye) = mocked_person(&registry);
        registry.apply_test_boundary();
        assert_eq!(hi.call_count(), 1);
        assert!(hi.is_active());
    }

    #[test]
    fn test_invocation_order_across_handles() {
        let registry = MockRegistry::new();
        let a = registry.create_mock();
        let b = registry.create_mock();
        b.call(&[]);
        a.call(&[]);
        b.call(&[]);
        assert_eq!(b.invocation_call_order(), vec![1, 3]);
        assert_eq!(a.invocation_call_order(), vec![2]);
    }

    #[test]
    fn test_debug_format() {
        let registry = MockRegistry::new();
        let _ = registry.create_mock();
        let debug = format!("{registry:?}");
        assert!(debug.contains("MockRegistry"));
        assert!(debug.contains("handles: 1"));
    }

    proptest! {
        #[test]
        fn prop_calls_recorded_in_order(values in prop::collection::vec(any::<i64>(), 0..32)) {
            let registry = MockRegistry::new();
            let mock = registry.create_mock();
            for v in &values {
                prop_assert_eq!(mock.call(&[json!(v)]), Value::Null);
            }
            let expected: Vec<Vec<Value>> = values.iter().map(|v| vec![json!(v)]).collect();
            prop_assert_eq!(mock.calls(), expected);
        }

        #[test]
        fn prop_clear_preserves_mocked_output(
            before in 0usize..8,
            after in 1usize..8,
            text in "[a-z]{1,12}",
        ) {
            let registry = MockRegistry::new();
            let obj = person();
            let spy = registry.spy_on(&obj, "say_hi").unwrap();
            let reply = json!(text);
            spy.mock_return_value(reply.clone()).unwrap();
            for _ in 0..before {
                obj.invoke("say_hi", &[json!("x")]).unwrap();
            }
            registry.clear_all_mocks();
            prop_assert_eq!(spy.call_count(), 0);
            for _ in 0..after {
                prop_assert_eq!(obj.invoke("say_hi", &[json!("y")]).unwrap(), reply.clone());
            }
            prop_assert_eq!(spy.call_count(), after);
        }
    }
}
