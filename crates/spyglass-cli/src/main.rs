//! Spyglass CLI: run mock lifecycle scenarios
//!
//! ## Usage
//!
//! ```bash
//! spyglass list                            # Show built-in scenarios
//! spyglass run                             # Run all scenarios
//! spyglass run reset-all-mocks -c mocks.yaml
//! spyglass run --format json --fail-fast
//! ```

use clap::Parser;
use spyglass::MockConfig;
use spyglass_cli::{
    load_mock_config, logging, scenarios, Cli, CliConfig, CliError, CliResult, Commands,
    Reporter, RunArgs, ScenarioRunner, Verbosity,
};
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    logging::init(config.verbosity);

    match cli.command {
        Commands::List => {
            run_list(&config);
            Ok(())
        }
        Commands::Run(args) => run_scenarios(config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(cli.color.into())
}

fn run_list(config: &CliConfig) {
    let reporter = Reporter::new(config.color.should_color(), false);
    for scenario in scenarios::all() {
        reporter.entry(scenario.name, scenario.description);
    }
}

fn run_scenarios(config: CliConfig, args: &RunArgs) -> CliResult<()> {
    let mocks = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "loading registry config");
            load_mock_config(path)?
        }
        None => MockConfig::default(),
    };

    let config = config
        .with_mocks(mocks)
        .with_format(args.format.into())
        .with_fail_fast(args.fail_fast);

    let selected = ScenarioRunner::select(&args.scenarios)?;
    let report = ScenarioRunner::new(config.clone()).run(&selected);

    if config.format == spyglass_cli::OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed(),
            total: report.total(),
        })
    }
}
