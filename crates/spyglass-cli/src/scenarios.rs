//! Built-in lifecycle scenarios
//!
//! Each scenario runs against its own [`MockSession`] and checks the
//! observable behavior of one registry operation.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use spyglass::{MockSession, ResetPolicy, SpyError, TargetObject};
use std::fmt::{self, Debug};
use std::time::Duration;
use thiserror::Error;

/// Why a scenario failed
#[derive(Debug, Error)]
pub enum ScenarioFailure {
    /// An observed value did not match
    #[error("{0}")]
    Expectation(String),

    /// The library rejected an operation
    #[error(transparent)]
    Spy(#[from] SpyError),
}

/// Result of a single scenario body
pub type ScenarioResult = Result<(), ScenarioFailure>;

/// A named scenario
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Name used on the command line
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    run: fn(&MockSession) -> ScenarioResult,
}

impl Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// Create a scenario
    #[must_use]
    pub const fn new(
        name: &'static str,
        description: &'static str,
        run: fn(&MockSession) -> ScenarioResult,
    ) -> Self {
        Self {
            name,
            description,
            run,
        }
    }

    /// Run the scenario body against `session`
    pub fn run(&self, session: &MockSession) -> ScenarioResult {
        (self.run)(session)
    }
}

const SCENARIOS: &[Scenario] = &[
    Scenario::new(
        "standalone-mock",
        "create a mock function, call it and inspect its calls",
        standalone_mock,
    ),
    Scenario::new(
        "once-queue",
        "one-shot return values are used before the default",
        once_queue,
    ),
    Scenario::new(
        "spy-delegates",
        "a fresh spy records calls and delegates to the original",
        spy_delegates,
    ),
    Scenario::new(
        "clear-all-mocks",
        "clear_all_mocks empties history and keeps implementations",
        clear_all_mocks,
    ),
    Scenario::new(
        "reset-all-mocks",
        "reset_all_mocks empties history and resets implementations",
        reset_all_mocks,
    ),
    Scenario::new(
        "restore-all-mocks",
        "restore_all_mocks puts the original methods back",
        restore_all_mocks,
    ),
    Scenario::new(
        "respy-same-slot",
        "spying twice reuses the active spy, spying after restore does not",
        respy_same_slot,
    ),
    Scenario::new(
        "test-boundary",
        "before_each applies the configured clear/reset/restore flags",
        test_boundary,
    ),
    Scenario::new(
        "fake-timers",
        "fake timers freeze, set and advance the current time",
        fake_timers,
    ),
];

/// All built-in scenarios in run order
#[must_use]
pub fn all() -> &'static [Scenario] {
    SCENARIOS
}

/// Look up a scenario by name
#[must_use]
pub fn find(name: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.name == name)
}

fn expect_eq<T: PartialEq + Debug>(what: &str, actual: &T, expected: &T) -> ScenarioResult {
    if actual == expected {
        Ok(())
    } else {
        Err(ScenarioFailure::Expectation(format!(
            "{what}: expected {expected:?}, got {actual:?}"
        )))
    }
}

fn expect(what: &str, condition: bool) -> ScenarioResult {
    if condition {
        Ok(())
    } else {
        Err(ScenarioFailure::Expectation(what.to_string()))
    }
}

fn person() -> TargetObject {
    TargetObject::new("person")
        .with_method("say_hi", |args: &[Value]| {
            json!(format!("Hi {}", args.first().and_then(Value::as_str).unwrap_or_default()))
        })
        .with_method("say_bye", |args: &[Value]| {
            json!(format!("Bye {}", args.first().and_then(Value::as_str).unwrap_or_default()))
        })
}

/// Spy on both greetings, mock them and call each once with "Alice"
fn mocked_person(
    session: &MockSession,
) -> Result<(TargetObject, spyglass::MockHandle, spyglass::MockHandle), ScenarioFailure> {
    let person = person();
    let hi = session
        .spy_on(&person, "say_hi")?
        .mock_implementation(|_| json!("mocked hi"))?;
    let bye = session
        .spy_on(&person, "say_bye")?
        .mock_implementation(|_| json!("mocked bye"))?;
    expect_eq(
        "mocked say_hi",
        &person.invoke("say_hi", &[json!("Alice")])?,
        &json!("mocked hi"),
    )?;
    expect_eq(
        "mocked say_bye",
        &person.invoke("say_bye", &[json!("Alice")])?,
        &json!("mocked bye"),
    )?;
    Ok((person, hi, bye))
}

fn standalone_mock(session: &MockSession) -> ScenarioResult {
    let mock = session
        .create_mock_with(|args| json!(args.first().and_then(Value::as_i64).unwrap_or(0) * 2))
        .mock_name("double");
    expect_eq("call result", &mock.call(&[json!(5)]), &json!(10))?;
    expect_eq("call count", &mock.call_count(), &1)?;
    expect_eq("recorded args", &mock.calls(), &vec![vec![json!(5)]])?;
    expect_eq("recorded results", &mock.results(), &vec![json!(10)])?;

    let stub = session.create_mock();
    expect_eq("stub result", &stub.call(&[]), &Value::Null)
}

fn once_queue(session: &MockSession) -> ScenarioResult {
    let mock = session
        .create_mock()
        .mock_return_value(json!("default"))?
        .mock_return_value_once(json!("first"))?
        .mock_return_value_once(json!("second"))?;
    let seen: Vec<Value> = (0..3).map(|_| mock.call(&[])).collect();
    expect_eq(
        "return sequence",
        &seen,
        &vec![json!("first"), json!("second"), json!("default")],
    )
}

fn spy_delegates(session: &MockSession) -> ScenarioResult {
    let person = person();
    let spy = session.spy_on(&person, "say_hi")?;
    expect("slot holds the spy", person.holds("say_hi", &spy))?;
    expect_eq(
        "delegated result",
        &person.invoke("say_hi", &[json!("Carol")])?,
        &json!("Hi Carol"),
    )?;
    expect_eq("last call", &spy.last_call(), &Some(vec![json!("Carol")]))
}

fn clear_all_mocks(session: &MockSession) -> ScenarioResult {
    let (person, hi, bye) = mocked_person(session)?;
    session.clear_all_mocks();

    for (key, spy, mocked) in [("say_hi", &hi, "mocked hi"), ("say_bye", &bye, "mocked bye")] {
        expect(&format!("{key} history cleared"), spy.calls().is_empty())?;
        expect(&format!("{key} still spied"), person.holds(key, spy))?;
        expect_eq(key, &person.invoke(key, &[json!("Bob")])?, &json!(mocked))?;
        expect_eq(&format!("{key} calls"), &spy.calls(), &vec![vec![json!("Bob")]])?;
    }
    Ok(())
}

fn reset_all_mocks(session: &MockSession) -> ScenarioResult {
    let (person, hi, bye) = mocked_person(session)?;
    let policy = session.registry().config().reset_policy;
    session.reset_all_mocks();

    for (key, spy, original) in [("say_hi", &hi, "Hi Bob"), ("say_bye", &bye, "Bye Bob")] {
        let expected = match policy {
            ResetPolicy::Initial => json!(original),
            ResetPolicy::Stub => Value::Null,
        };
        expect(&format!("{key} history cleared"), spy.calls().is_empty())?;
        expect(&format!("{key} still spied"), person.holds(key, spy))?;
        expect_eq(key, &person.invoke(key, &[json!("Bob")])?, &expected)?;
        expect_eq(&format!("{key} calls"), &spy.calls(), &vec![vec![json!("Bob")]])?;
    }
    Ok(())
}

fn restore_all_mocks(session: &MockSession) -> ScenarioResult {
    let (person, hi, bye) = mocked_person(session)?;
    session.restore_all_mocks();

    for (key, spy, original, mocked) in [
        ("say_hi", &hi, "Hi Bob", "mocked hi"),
        ("say_bye", &bye, "Bye Bob", "mocked bye"),
    ] {
        expect(&format!("{key} no longer spied"), !person.holds(key, spy))?;
        expect_eq(key, &person.invoke(key, &[json!("Bob")])?, &json!(original))?;
        expect_eq(&format!("{key} calls"), &spy.calls(), &vec![vec![json!("Alice")]])?;
        expect_eq(
            &format!("{key} implementation"),
            &spy.get_mock_implementation().call(&[json!("Test")]),
            &json!(mocked),
        )?;
        expect(&format!("{key} handle is stale"), spy.is_stale())?;
    }

    match hi.mock_return_value(json!("late")) {
        Err(SpyError::StaleHandle { .. }) => Ok(()),
        Err(other) => Err(other.into()),
        Ok(_) => Err(ScenarioFailure::Expectation(
            "mutating a restored spy should fail".to_string(),
        )),
    }
}

fn respy_same_slot(session: &MockSession) -> ScenarioResult {
    let person = person();
    let first = session.spy_on(&person, "say_hi")?;
    let second = session.spy_on(&person, "say_hi")?;
    expect("second spy_on reuses the active spy", first.ptr_eq(&second))?;

    session.restore_all_mocks();
    let third = session.spy_on(&person, "say_hi")?;
    expect("spy after restore is a new handle", !first.ptr_eq(&third))?;
    expect("new spy is installed", person.holds("say_hi", &third))?;
    expect_eq("active spies", &session.registry().active_spy_count(), &1)
}

fn test_boundary(session: &MockSession) -> ScenarioResult {
    let config = session.registry().config();
    let (person, hi, _bye) = mocked_person(session)?;
    session.before_each();

    let expected = if config.restore_mocks {
        json!("Hi Bob")
    } else if config.mock_reset {
        match config.reset_policy {
            ResetPolicy::Initial => json!("Hi Bob"),
            ResetPolicy::Stub => Value::Null,
        }
    } else {
        json!("mocked hi")
    };
    let history_kept = !(config.clear_mocks || config.mock_reset);

    expect_eq(
        "history after boundary",
        &hi.call_count(),
        &usize::from(history_kept),
    )?;
    expect_eq(
        "say_hi after boundary",
        &person.invoke("say_hi", &[json!("Bob")])?,
        &expected,
    )
}

fn fake_timers(session: &MockSession) -> ScenarioResult {
    let mock_date = Utc
        .with_ymd_and_hms(2022, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ScenarioFailure::Expectation("invalid fixed date".to_string()))?;

    session.use_fake_timers()?;
    session.set_system_time(mock_date)?;
    expect_eq("frozen now", &session.now(), &mock_date)?;
    expect_eq("still frozen", &session.now(), &mock_date)?;

    session.advance_time_by(Duration::from_secs(90))?;
    expect_eq(
        "advanced now",
        &session.now(),
        &(mock_date + chrono::Duration::seconds(90)),
    )?;

    session.use_real_timers();
    expect("real time resumed", session.now() != mock_date)
}
