//! Spyglass CLI library
//!
//! Runs the built-in mock lifecycle scenarios against fresh sessions and
//! reports the outcome as text or JSON.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;
pub mod scenarios;

pub use commands::{Cli, ColorArg, Commands, FormatArg, RunArgs};
pub use config::{load_mock_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Reporter};
pub use runner::{RunReport, ScenarioOutcome, ScenarioRunner};
pub use scenarios::{Scenario, ScenarioFailure};
