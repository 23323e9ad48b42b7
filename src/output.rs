//! Output formatting and styling module.
//!
//! Everything the user sees on a terminal goes through [`OutputFormatter`]:
//! colored status lines, the progress bar shown while files are moved, and the
//! end-of-run summary. Diagnostics go through `tracing` instead.

use crate::selector::{BatchReport, FileOutcome, FileStatus};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use regmove::output::OutputFormatter;
    /// OutputFormatter::success("Moved 3 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for a batch of `total` files.
    ///
    /// ```no_run
    /// use regmove::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(10);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Formats one outcome line, e.g. `a.jpg → /dst/a.jpg`.
    pub fn outcome_line(outcome: &FileOutcome) -> String {
        let target = outcome.destination.display();
        match &outcome.status {
            FileStatus::Moved { .. } => {
                format!("{} {} → {}", "✓".green(), outcome.file_name, target)
            }
            FileStatus::WouldMove => {
                format!("  {} → Would move to {}", outcome.file_name, target)
            }
            FileStatus::Failed { message, .. } => {
                format!("{} {}: {}", "✗".red(), outcome.file_name, message)
            }
        }
    }

    /// Prints the end-of-run summary for a report.
    pub fn summary(report: &BatchReport) {
        if report.is_empty() {
            Self::info("No matching files found.");
            return;
        }

        Self::header("SUMMARY");
        let total = report.outcomes.len();
        if report.dry_run {
            println!(
                "{} {} would be moved",
                total.to_string().green().bold(),
                if total == 1 { "file" } else { "files" }
            );
            Self::dry_run_notice("No files were modified.");
            return;
        }

        let moved = report.moved();
        println!(
            "Moved  | {} {}",
            moved.to_string().green(),
            if moved == 1 { "file" } else { "files" }
        );
        let failed = report.failed();
        if failed > 0 {
            println!(
                "Failed | {} {}",
                failed.to_string().red(),
                if failed == 1 { "file" } else { "files" }
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mover::{MoveErrorKind, MoveMethod};
    use std::path::PathBuf;

    fn outcome(status: FileStatus) -> FileOutcome {
        FileOutcome {
            file_name: "a.jpg".to_string(),
            source: PathBuf::from("/src/a.jpg"),
            destination: PathBuf::from("/dst/a.jpg"),
            status,
        }
    }

    #[test]
    fn test_outcome_line_contents() {
        colored::control::set_override(false);

        let moved = OutputFormatter::outcome_line(&outcome(FileStatus::Moved {
            method: MoveMethod::Copied,
        }));
        assert_eq!(moved, "✓ a.jpg → /dst/a.jpg");

        let dry = OutputFormatter::outcome_line(&outcome(FileStatus::WouldMove));
        assert!(dry.contains("Would move to /dst/a.jpg"));

        let failed = OutputFormatter::outcome_line(&outcome(FileStatus::Failed {
            kind: MoveErrorKind::Copy,
            message: "disk full".to_string(),
        }));
        assert_eq!(failed, "✗ a.jpg: disk full");
    }
}
