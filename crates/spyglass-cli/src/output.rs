//! Output formatting and scenario reporting

use console::{style, Style, Term};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output format for scenario reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document on stdout
    Json,
}

/// Line-oriented reporter for scenario runs
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Whether lines go to stderr instead of stdout
    pub to_stderr: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
            to_stderr: false,
        }
    }

    /// Create a reporter that prints only failures, to stderr, leaving
    /// stdout to a machine-readable report
    #[must_use]
    pub fn failures_to_stderr() -> Self {
        Self {
            term: Term::stderr(),
            use_color: false,
            quiet: true,
            to_stderr: true,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an indented detail line under the previous message
    pub fn detail(&self, message: &str) {
        let styled = if self.use_color {
            style(message).dim().to_string()
        } else {
            message.to_string()
        };

        let _ = self.term.write_line(&format!("    {styled}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line(&styled);
    }

    /// Print a name and description pair
    pub fn entry(&self, name: &str, description: &str) {
        let styled = if self.use_color {
            style(format!("{name:<20}")).cyan().to_string()
        } else {
            format!("{name:<20}")
        };

        let _ = self.term.write_line(&format!("{styled} {description}"));
    }

    /// Print run summary
    pub fn summary(&self, passed: usize, failed: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed;
        let duration_secs = duration.as_secs_f64();

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.3}s ({} passed, {} failed)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.3}s ({passed} passed, {failed} failed)"
            ));
        }
    }
}
