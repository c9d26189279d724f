//! Target objects with named, swappable method slots.
//!
//! Spying never patches code at runtime. Instead a [`TargetObject`] owns a set
//! of named slots and the registry swaps the callable stored in a slot,
//! keeping the previous callable so the swap can be undone on restore.

use crate::function::MockFn;
use crate::mock::MockHandle;
use crate::result::{SpyError, SpyResult};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a target object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a method slot currently holds
#[derive(Debug, Clone)]
pub enum Callable {
    /// A plain implementation
    Function(MockFn),
    /// An installed mock handle
    Mock(MockHandle),
}

impl Callable {
    /// Invoke the callable.
    ///
    /// A restored spy is skipped and the call goes to what it replaced.
    pub fn call(&self, args: &[Value]) -> Value {
        match self {
            Self::Function(f) => f.call(args),
            Self::Mock(handle) => match handle.passthrough() {
                Some(original) => original.call(args),
                None => handle.call(args),
            },
        }
    }

    /// Strip restored spies off the front of the chain
    pub(crate) fn resolve(self) -> Self {
        let mut current = self;
        while let Some(original) = current.as_mock().and_then(MockHandle::passthrough) {
            current = original;
        }
        current
    }

    /// Whether this callable is the given mock handle
    #[must_use]
    pub fn is_mock(&self, handle: &MockHandle) -> bool {
        matches!(self, Self::Mock(h) if h.ptr_eq(handle))
    }

    /// The installed mock handle, if any
    #[must_use]
    pub fn as_mock(&self) -> Option<&MockHandle> {
        match self {
            Self::Mock(h) => Some(h),
            Self::Function(_) => None,
        }
    }

    /// Convert into a plain implementation.
    ///
    /// A plain function keeps its identity; a mock handle is wrapped so the
    /// resulting function still records on the underlying mock while it is
    /// installed.
    #[must_use]
    pub fn into_fn(self) -> MockFn {
        match self {
            Self::Function(f) => f,
            mock @ Self::Mock(_) => MockFn::new(move |args| mock.call(args)),
        }
    }
}

#[derive(Debug, Clone)]
enum SlotValue {
    Method(Callable),
    Data(Value),
}

#[derive(Debug, Clone)]
struct Slot {
    value: SlotValue,
    configurable: bool,
}

#[derive(Debug)]
struct ObjectInner {
    id: ObjectId,
    name: String,
    slots: BTreeMap<String, Slot>,
}

/// Object whose method slots can be spied on.
///
/// Cloning a `TargetObject` yields another reference to the same object.
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use spyglass::TargetObject;
///
/// let person = TargetObject::new("person").with_method("say_hi", |args: &[Value]| {
///     json!(format!("Hi {}", args[0].as_str().unwrap_or_default()))
/// });
/// assert_eq!(person.invoke("say_hi", &[json!("Alice")]).unwrap(), json!("Hi Alice"));
/// ```
#[derive(Clone)]
pub struct TargetObject {
    inner: Rc<RefCell<ObjectInner>>,
}

impl fmt::Debug for TargetObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TargetObject")
            .field("id", &inner.id)
            .field("name", &inner.name)
            .field("slots", &inner.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TargetObject {
    /// Create an empty object
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectInner {
                id: ObjectId::next(),
                name: name.into(),
                slots: BTreeMap::new(),
            })),
        }
    }

    /// Add a configurable method slot
    #[must_use]
    pub fn with_method<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        self.define_method(key, MockFn::new(f));
        self
    }

    /// Define or replace a configurable method slot
    pub fn define_method(&self, key: impl Into<String>, f: MockFn) {
        self.define(key.into(), SlotValue::Method(Callable::Function(f)), true);
    }

    /// Define or replace a method slot that cannot be spied on
    pub fn define_frozen_method(&self, key: impl Into<String>, f: MockFn) {
        self.define(key.into(), SlotValue::Method(Callable::Function(f)), false);
    }

    /// Define or replace a data slot
    pub fn define_value(&self, key: impl Into<String>, value: Value) {
        self.define(key.into(), SlotValue::Data(value), true);
    }

    fn define(&self, key: String, value: SlotValue, configurable: bool) {
        let _ = self
            .inner
            .borrow_mut()
            .slots
            .insert(key, Slot { value, configurable });
    }

    /// Object identity
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.inner.borrow().id
    }

    /// Object display name
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Whether a slot with this key exists
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.inner.borrow().slots.contains_key(key)
    }

    /// Slot keys in sorted order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().slots.keys().cloned().collect()
    }

    /// Callable currently stored in a method slot
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Callable> {
        match &self.inner.borrow().slots.get(key)?.value {
            SlotValue::Method(callable) => Some(callable.clone()),
            SlotValue::Data(_) => None,
        }
    }

    /// Value stored in a data slot
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Value> {
        match &self.inner.borrow().slots.get(key)?.value {
            SlotValue::Data(value) => Some(value.clone()),
            SlotValue::Method(_) => None,
        }
    }

    /// Whether the slot currently holds the given mock handle
    #[must_use]
    pub fn holds(&self, key: &str, handle: &MockHandle) -> bool {
        self.get(key).is_some_and(|c| c.is_mock(handle))
    }

    /// Call the method stored under `key`.
    ///
    /// No borrow of the object is held while the method runs, so the method
    /// may itself read or modify this object.
    pub fn invoke(&self, key: &str, args: &[Value]) -> SpyResult<Value> {
        let callable = self.method(key)?;
        Ok(callable.call(args))
    }

    fn method(&self, key: &str) -> SpyResult<Callable> {
        let inner = self.inner.borrow();
        match inner.slots.get(key).map(|slot| &slot.value) {
            Some(SlotValue::Method(callable)) => Ok(callable.clone()),
            Some(SlotValue::Data(_)) => Err(SpyError::invalid_target(
                &inner.name,
                key,
                "slot is not a method",
            )),
            None => Err(SpyError::invalid_target(&inner.name, key, "no such slot")),
        }
    }

    /// Replace a configurable method slot with `handle`, returning what was
    /// there before.
    pub(crate) fn install(&self, key: &str, handle: &MockHandle) -> SpyResult<Callable> {
        let mut inner = self.inner.borrow_mut();
        let name = inner.name.clone();
        let slot = inner
            .slots
            .get_mut(key)
            .ok_or_else(|| SpyError::invalid_target(&name, key, "no such slot"))?;

        if !slot.configurable {
            return Err(SpyError::invalid_target(&name, key, "slot is not configurable"));
        }

        match &slot.value {
            SlotValue::Method(previous) => {
                let previous = previous.clone();
                slot.value = SlotValue::Method(Callable::Mock(handle.clone()));
                Ok(previous)
            }
            SlotValue::Data(_) => Err(SpyError::invalid_target(&name, key, "slot is not a method")),
        }
    }

    /// Put `original` back if the slot still holds `handle`.
    ///
    /// Returns `false` when the slot was redefined or removed in the meantime.
    pub(crate) fn reinstate(&self, key: &str, handle: &MockHandle, original: Callable) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.slots.get_mut(key) {
            Some(slot) if matches!(&slot.value, SlotValue::Method(c) if c.is_mock(handle)) => {
                slot.value = SlotValue::Method(original);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn downgrade(&self) -> WeakTarget {
        WeakTarget {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Non-owning reference held by a spy so the object and its slot can drop
/// independently of the handle.
#[derive(Debug, Clone)]
pub(crate) struct WeakTarget {
    inner: Weak<RefCell<ObjectInner>>,
}

impl WeakTarget {
    pub(crate) fn upgrade(&self) -> Option<TargetObject> {
        self.inner.upgrade().map(|inner| TargetObject { inner })
    }
}
