//! Console output for batch runs

use colored::Colorize;
use refract_domain::{BatchRun, BatchSummary};
use serde_json::json;
use std::path::Path;

/// Formats run headers and summaries for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner printed before the run starts
    pub fn banner(inbox: &Path, backends: &[&str], edit_model: &str, dry_run: bool) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Refract"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Inbox:".cyan().bold(), inbox.display()));
        output.push_str(&format!(
            "{} {}\n",
            "Critics:".cyan().bold(),
            backends.join(", ")
        ));
        if dry_run {
            output.push_str(&format!("{} {}\n", "Mode:".cyan().bold(), "dry run".yellow()));
        } else {
            output.push_str(&format!("{} {}\n", "Editor:".cyan().bold(), edit_model));
        }
        output
    }

    /// Final summary, including per-image failures
    pub fn format(run: &BatchRun, summary: &BatchSummary) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header("Summary"));

        output.push_str(&format!(
            "  {:<16}{}\n",
            "Processed:",
            summary.successful.to_string().green().bold()
        ));
        output.push_str(&format!("  {:<16}{}\n", "Failed:", Self::count(summary.failed)));
        output.push_str(&format!("  {:<16}{}\n", "Invalid:", Self::count(summary.invalid)));
        if summary.skipped > 0 {
            output.push_str(&format!(
                "  {:<16}{} (cancelled)\n",
                "Skipped:",
                summary.skipped.to_string().yellow()
            ));
        }
        if summary.dry_run {
            output.push_str(&format!("  {}\n", "Dry run: nothing was archived".yellow()));
        } else {
            output.push_str(&format!("  {:<16}{}\n", "Total entries:", summary.total_entries));
        }
        if let Some(e) = &summary.site_error {
            output.push_str(&format!("  {} {}\n", "Site rebuild failed:".red(), e));
        }

        let failures: Vec<_> = run.outcomes.iter().filter(|o| !o.success).collect();
        if !failures.is_empty() {
            output.push_str(&format!("\n{}\n", "Failures:".red().bold()));
            for outcome in failures {
                output.push_str(&format!(
                    "  * {}: {}\n",
                    Self::file_name(&outcome.path),
                    outcome.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }

        if !run.invalid.is_empty() {
            output.push_str(&format!("\n{}\n", "Invalid images:".yellow().bold()));
            for invalid in &run.invalid {
                output.push_str(&format!(
                    "  * {}: {}\n",
                    Self::file_name(&invalid.path),
                    invalid.error
                ));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(run: &BatchRun, summary: &BatchSummary) -> String {
        serde_json::to_string_pretty(&json!({
            "summary": summary,
            "outcomes": run.outcomes,
            "invalid": run.invalid,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }

    fn count(n: usize) -> String {
        if n == 0 {
            n.to_string()
        } else {
            n.to_string().red().bold().to_string()
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
