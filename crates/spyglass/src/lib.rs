//! Spyglass: Mock Functions, Method Spies and Fake Time for Rust Tests
//!
//! Spyglass tracks callables created during a test, records how they were
//! called, and puts things back afterwards.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        MockSession                           │
//! │   ┌──────────────┐   install/restore   ┌──────────────┐      │
//! │   │ MockRegistry │────────────────────►│ TargetObject │      │
//! │   │  (handles)   │                     │   (slots)    │      │
//! │   └──────┬───────┘                     └──────────────┘      │
//! │          │ create                                            │
//! │   ┌──────▼───────┐     ┌──────────────┐                      │
//! │   │  MockHandle  │────►│    MockFn    │   ┌──────────────┐   │
//! │   │  (records)   │     │  (behavior)  │   │  FakeClock   │   │
//! │   └──────────────┘     └──────────────┘   └──────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use serde_json::{json, Value};
//! use spyglass::prelude::*;
//!
//! let person = TargetObject::new("person").with_method("say_hi", |args: &[Value]| {
//!     json!(format!("Hi {}", args[0].as_str().unwrap_or_default()))
//! });
//!
//! let session = MockSession::new();
//! let spy = session
//!     .spy_on(&person, "say_hi")?
//!     .mock_implementation(|_| json!("mocked hi"))?;
//!
//! assert_eq!(person.invoke("say_hi", &[json!("Alice")])?, json!("mocked hi"));
//! session.reset_all_mocks();
//! assert_eq!(person.invoke("say_hi", &[json!("Bob")])?, json!("Hi Bob"));
//! assert_eq!(spy.calls(), vec![vec![json!("Bob")]]);
//! # Ok::<(), SpyError>(())
//! ```

#![warn(missing_docs)]

/// Fake system time (useFakeTimers / setSystemTime / useRealTimers)
pub mod clock;
mod config;
mod function;
mod mock;
mod object;
mod registry;
mod result;
mod session;

pub use clock::{create_clock, Clock, ClockError, ClockState, FakeClock};
pub use config::{MockConfig, ResetPolicy};
pub use function::{Callback, MockFn};
pub use mock::{CallRecord, MockHandle};
pub use object::{Callable, ObjectId, TargetObject};
pub use registry::MockRegistry;
pub use result::{SpyError, SpyResult};
pub use session::MockSession;

/// Re-exports for `use spyglass::prelude::*`
pub mod prelude {
    pub use crate::{
        Callable, CallRecord, Clock, FakeClock, MockConfig, MockFn, MockHandle, MockRegistry,
        MockSession, ResetPolicy, SpyError, SpyResult, TargetObject,
    };
}
