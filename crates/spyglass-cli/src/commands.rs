//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Spyglass: run mock, spy and fake-time lifecycle scenarios
#[derive(Parser, Debug)]
#[command(name = "spyglass")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the built-in scenarios
    List,

    /// Run scenarios against a fresh mock session each
    Run(RunArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenarios to run (all when omitted)
    pub scenarios: Vec<String>,

    /// Registry configuration file (.yaml, .yml or .json)
    #[arg(short, long, env = "SPYGLASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: FormatArg,

    /// Stop at the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,
}

/// Color output argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorChoice;
    use crate::output::OutputFormat;

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["spyglass", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_parse_run_with_args() {
        let cli = Cli::try_parse_from([
            "spyglass",
            "-vv",
            "run",
            "clear-all-mocks",
            "fake-timers",
            "--format",
            "json",
            "--fail-fast",
            "--config",
            "spyglass.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.scenarios, vec!["clear-all-mocks", "fake-timers"]);
        assert_eq!(args.format, FormatArg::Json);
        assert!(args.fail_fast);
        assert_eq!(args.config, Some(PathBuf::from("spyglass.yaml")));
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["spyglass"]).is_err());
    }

    #[test]
    fn test_invalid_format() {
        assert!(Cli::try_parse_from(["spyglass", "run", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
        assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
        assert_eq!(OutputFormat::from(FormatArg::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(FormatArg::Text), OutputFormat::Text);
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
