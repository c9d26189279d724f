//! Scenario runner

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, Reporter};
use crate::scenarios::{self, Scenario};
use chrono::{DateTime, Utc};
use serde::Serialize;
use spyglass::MockSession;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall time in microseconds
    pub duration_us: u64,
}

impl ScenarioOutcome {
    fn new(name: &str, error: Option<String>, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            passed: error.is_none(),
            error,
            duration_us: u64::try_from(duration.as_micros()).unwrap_or(u64::MAX),
        }
    }
}

/// Aggregated run results
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Per-scenario outcomes in run order
    pub outcomes: Vec<ScenarioOutcome>,
    /// Total wall time in microseconds
    pub duration_us: u64,
}

impl RunReport {
    /// Number of passed scenarios
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Number of failed scenarios
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.passed).count()
    }

    /// Number of scenarios run
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }
}

/// Runs scenarios, each in a fresh session built from the CLI config
#[derive(Debug)]
pub struct ScenarioRunner {
    config: CliConfig,
    reporter: Reporter,
}

impl ScenarioRunner {
    /// Create a new runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter = match config.format {
            OutputFormat::Text => {
                Reporter::new(config.color.should_color(), config.verbosity.is_quiet())
            }
            OutputFormat::Json => Reporter::failures_to_stderr(),
        };
        Self { config, reporter }
    }

    /// Resolve scenario names; all scenarios when `names` is empty
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnknownScenario`] for the first unknown name
    pub fn select(names: &[String]) -> CliResult<Vec<&'static Scenario>> {
        if names.is_empty() {
            return Ok(scenarios::all().iter().collect());
        }
        names
            .iter()
            .map(|name| scenarios::find(name).ok_or_else(|| CliError::unknown_scenario(name)))
            .collect()
    }

    /// Run the given scenarios and report each outcome
    #[must_use]
    pub fn run(&self, selected: &[&Scenario]) -> RunReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(selected.len());

        if self.config.format == OutputFormat::Text {
            self.reporter.header("Running scenarios");
        }

        for scenario in selected {
            let outcome = self.run_one(scenario);
            let stop = !outcome.passed && self.config.fail_fast;
            outcomes.push(outcome);
            if stop {
                info!(scenario = scenario.name, "fail-fast: stopping run");
                break;
            }
        }

        let duration = start.elapsed();
        let report = RunReport {
            started_at,
            duration_us: u64::try_from(duration.as_micros()).unwrap_or(u64::MAX),
            outcomes,
        };
        if self.config.format == OutputFormat::Text {
            self.reporter
                .summary(report.passed(), report.failed(), duration);
        }
        report
    }

    fn run_one(&self, scenario: &Scenario) -> ScenarioOutcome {
        debug!(scenario = scenario.name, "starting scenario");
        let start = Instant::now();
        let error = {
            let mut session = MockSession::with_config(self.config.mocks.clone());
            let result = scenario.run(&session);
            session.finish();
            result.err().map(|e| e.to_string())
        };
        let outcome = ScenarioOutcome::new(scenario.name, error, start.elapsed());

        match &outcome.error {
            None => self.reporter.success(scenario.name),
            Some(message) => {
                self.reporter.failure(scenario.name);
                self.reporter.detail(message);
            }
        }
        debug!(
            scenario = scenario.name,
            passed = outcome.passed,
            "scenario finished"
        );
        outcome
    }
}
