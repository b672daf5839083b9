//! Output formatting for unrx
//!
//! Supports text (colored terminal), JSON, and unified-diff output formats.

use colored::*;
use serde::Serialize;
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// Information about a single rewrite
#[derive(Debug, Clone, Serialize)]
pub struct EditInfo {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<EditInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn success(path: &Path, edits: Vec<EditInfo>) -> Self {
        Self {
            path: path.display().to_string(),
            edits,
            error: None,
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            edits: Vec::new(),
            error: Some(error),
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_changes: usize,
    pub total_edits: usize,
    pub errors: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report a file with changes (in check mode - showing what would change)
    pub fn report_check(
        &mut self,
        path: &Path,
        edits: Vec<EditInfo>,
        old_source: &str,
        new_source: &str,
    ) {
        self.summary.files_processed += 1;

        if edits.is_empty() {
            if self.verbose && self.format == OutputFormat::Text {
                println!("{}: No changes needed", path.display());
            }
            self.results.push(FileResult::success(path, vec![]));
            return;
        }

        self.summary.files_with_changes += 1;
        self.summary.total_edits += edits.len();

        match self.format {
            OutputFormat::Text => {
                println!("{}", path.display().to_string().bold());
                print_diff(old_source, new_source);
                println!();
                for edit in &edits {
                    println!(
                        "  {} {}:{} {}",
                        "->".green(),
                        edit.line,
                        edit.column,
                        edit.message
                    );
                }
                println!();
            }
            OutputFormat::Diff => {
                print_unified_diff(path, old_source, new_source);
            }
            OutputFormat::Json => {
                // JSON output is handled in finish()
            }
        }

        self.results.push(FileResult::success(path, edits));
    }

    /// Report a file after applying rewrites
    pub fn report_fix(&mut self, path: &Path, edits: Vec<EditInfo>) {
        self.summary.files_processed += 1;

        if edits.is_empty() {
            if self.verbose && self.format == OutputFormat::Text {
                println!("{}: No changes needed", path.display());
            }
            self.results.push(FileResult::success(path, vec![]));
            return;
        }

        self.summary.files_with_changes += 1;
        self.summary.total_edits += edits.len();

        if self.format == OutputFormat::Text {
            println!("{}", path.display().to_string().bold());
            println!("  {} Applied {} rewrite(s)", "OK".green(), edits.len());
            println!();
        }

        self.results.push(FileResult::success(path, edits));
    }

    /// Report a file that was skipped (no changes, not verbose)
    pub fn report_skipped(&mut self, path: &Path) {
        self.summary.files_processed += 1;
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: No changes needed", path.display());
        }
        self.results.push(FileResult::success(path, vec![]));
    }

    /// Report an error processing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }

        self.results.push(FileResult::error(path, error.to_string()));
    }

    /// Print final summary/output
    pub fn finish(self, check_mode: bool) {
        match self.format {
            OutputFormat::Text => {
                println!();
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                println!("  Files with changes: {}", self.summary.files_with_changes);
                println!("  Total rewrites: {}", self.summary.total_edits);
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }

                if check_mode && self.summary.total_edits > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply changes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    summary: self.summary,
                    files: self.results,
                };
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            }
            OutputFormat::Diff => {
                // Diff format outputs each file's diff as it's processed
                // No summary needed for patch-compatible output
            }
        }
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Print a colored diff between old and new content
fn print_diff(old: &str, new: &str) {
    for diff_result in diff::lines(old, new) {
        match diff_result {
            diff::Result::Left(l) => {
                println!("  {}", format!("- {}", l).red());
            }
            diff::Result::Right(r) => {
                println!("  {}", format!("+ {}", r).green());
            }
            diff::Result::Both(_, _) => {
                // Skip unchanged lines for cleaner output
            }
        }
    }
}

/// Print unified diff format (standard diff -u compatible)
fn print_unified_diff(path: &Path, old: &str, new: &str) {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();

    // Print unified diff header
    println!("--- a/{}", path_str);
    println!("+++ b/{}", path_str);

    // Print hunks with context
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            print!("{}{}", sign, change);
            if change.missing_newline() {
                println!();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("TEXT"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("diff"), Some(OutputFormat::Diff));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn test_summary_counts() {
        let mut reporter = Reporter::new(OutputFormat::Json, false);
        reporter.report_skipped(Path::new("a.ts"));
        reporter.report_fix(
            Path::new("b.ts"),
            vec![EditInfo {
                line: 1,
                column: 1,
                message: "rewrite".to_string(),
            }],
        );
        reporter.report_error(Path::new("c.ts"), "boom");

        let summary = reporter.summary();
        assert_eq!(summary.files_processed, 3);
        assert_eq!(summary.files_with_changes, 1);
        assert_eq!(summary.total_edits, 1);
        assert_eq!(summary.errors, 1);
    }
}
