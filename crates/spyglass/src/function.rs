//! Shared callable implementations.
//!
//! A [`MockFn`] is the unit that mocks delegate to and that target object
//! slots hold. Clones share the same closure, so identity can be compared
//! with [`MockFn::ptr_eq`] the way a test would compare function references.

use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Signature of every callable handled by Spyglass
pub type Callback = dyn Fn(&[Value]) -> Value;

/// Reference-counted callable taking positional arguments
#[derive(Clone)]
pub struct MockFn {
    inner: Rc<Callback>,
}

impl MockFn {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    /// Default stub: ignores its arguments and returns `Null`
    #[must_use]
    pub fn stub() -> Self {
        Self::new(|_| Value::Null)
    }

    /// Implementation that always returns a clone of `value`
    #[must_use]
    pub fn returning(value: Value) -> Self {
        Self::new(move |_| value.clone())
    }

    /// Invoke with positional arguments
    pub fn call(&self, args: &[Value]) -> Value {
        (self.inner)(args)
    }

    /// Whether both values share the same closure
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for MockFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockFn")
            .field("ptr", &Rc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}
