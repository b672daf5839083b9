//! unrx CLI - rewrite RxJS-style subscribe callsites into awaited form
//!
//! Finds whole-statement `.subscribe(...)` calls in JavaScript/TypeScript
//! sources and rewrites them in place to `await firstValueFrom(...)`, with
//! the former handler bodies inlined behind a try/catch.

mod config;
mod output;
mod process;

use anyhow::Result;
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

use config::Config;
use output::{EditInfo, OutputFormat, Reporter};
use process::{process_file, write_file};
use unrx_transform::RewriteOptions;

/// Extensions picked up when walking a directory argument.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

#[derive(Parser)]
#[command(name = "unrx")]
#[command(version = "0.1.0")]
#[command(about = "Rewrite .subscribe(...) callsites to await firstValueFrom(...)")]
#[command(author = "unrx contributors")]
struct Cli {
    /// Files, directories, or glob patterns to process
    #[arg(required = true)]
    paths: Vec<String>,

    /// Check for rewrites without applying them (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Apply rewrites to files
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Show changes without applying them (alias for --check)
    #[arg(long, short = 'n', hide = true, conflicts_with = "fix")]
    dry_run: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .unrx.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load config file
    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        let cfg = Config::load_path(config_path)?;
        if cli.verbose {
            println!("{}: {}", "Using config".bold(), config_path.display());
        }
        cfg
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                if cli.verbose {
                    println!("{}: {}", "Using config".bold(), path.display());
                }
                cfg
            }
            None => Config::default(),
        }
    };

    // Determine output format: CLI flag wins, then config, then text
    let format_name = if cli.json {
        "json".to_string()
    } else {
        cli.format
            .clone()
            .or_else(|| config.output.format.clone())
            .unwrap_or_else(|| "text".to_string())
    };
    let output_format = OutputFormat::from_str(&format_name).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid output format '{}'. Valid options: text, json, diff",
            format_name
        )
    })?;

    let options = config.rewrite_options();

    // Determine mode: fix or check (check is default)
    let fix_mode = cli.fix;
    let check_mode = !fix_mode; // --check, --dry-run, or default

    if cli.verbose && output_format == OutputFormat::Text {
        println!(
            "{}: {}",
            "Mode".bold(),
            if fix_mode { "fix" } else { "check" }
        );
        println!(
            "{}: await {}() / {}",
            "Rewrite".bold(),
            options.first_value_fn,
            options.empty_error
        );
        println!();
    }

    // Collect all file paths first
    let mut file_paths: Vec<PathBuf> = Vec::new();
    let mut missing_paths: Vec<String> = Vec::new();

    for arg in &cli.paths {
        let path = PathBuf::from(arg);
        if path.is_file() {
            file_paths.push(path);
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(&path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| has_source_extension(e.path()))
            {
                let file_path = entry.path();
                if !config.should_exclude(file_path) {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            // Not an existing path: try it as a glob pattern
            match glob::glob(arg) {
                Ok(entries) => {
                    let mut matched = false;
                    for entry in entries.filter_map(|e| e.ok()) {
                        if entry.is_file() && !config.should_exclude(&entry) {
                            file_paths.push(entry);
                            matched = true;
                        }
                    }
                    if !matched {
                        missing_paths.push(arg.clone());
                    }
                }
                Err(_) => missing_paths.push(arg.clone()),
            }
        }
    }

    // Process files in parallel
    let results: Vec<FileResult> = file_paths
        .par_iter()
        .map(|path| process_file_to_result(path, &options))
        .collect();

    // Sort results by path for deterministic output
    let mut sorted_results: Vec<_> = results.into_iter().zip(file_paths.iter()).collect();
    sorted_results.sort_by(|a, b| a.1.cmp(b.1));

    // Create reporter and process results sequentially
    let mut reporter = Reporter::new(output_format, cli.verbose);

    // Report missing paths
    for pattern in &missing_paths {
        if output_format == OutputFormat::Text {
            eprintln!(
                "{}: No files matched: {}",
                "Warning".yellow(),
                pattern
            );
        }
    }

    // Report file results
    for (result, path) in sorted_results {
        report_result(path, result, fix_mode, &mut reporter)?;
    }

    // Determine exit code
    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if check_mode && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    // Print final output
    reporter.finish(check_mode);

    Ok(exit_code)
}

fn has_source_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Result of processing a single file (for parallel processing)
enum FileResult {
    /// File had no changes
    NoChanges,
    /// File has changes to report/apply
    HasChanges {
        edits: Vec<EditInfo>,
        old_source: String,
        new_source: String,
    },
    /// Parse error occurred
    ParseError,
    /// Other error occurred
    Error(String),
}

/// Process a file and return a result (no I/O beyond the read, suitable for
/// parallel execution)
fn process_file_to_result(path: &PathBuf, options: &RewriteOptions) -> FileResult {
    match process_file(path, options) {
        Ok(Some(result)) => {
            if result.edits.is_empty() {
                FileResult::NoChanges
            } else {
                FileResult::HasChanges {
                    edits: result.edits,
                    old_source: result.old_source,
                    new_source: result.new_source.unwrap_or_default(),
                }
            }
        }
        Ok(None) => FileResult::ParseError,
        Err(e) => FileResult::Error(format!("{:#}", e)),
    }
}

/// Report a file result and optionally apply rewrites
fn report_result(
    path: &PathBuf,
    result: FileResult,
    fix_mode: bool,
    reporter: &mut Reporter,
) -> Result<()> {
    match result {
        FileResult::NoChanges => {
            reporter.report_skipped(path);
        }
        FileResult::HasChanges {
            edits,
            old_source,
            new_source,
        } => {
            if fix_mode {
                write_file(path, &new_source)?;
                reporter.report_fix(path, edits);
            } else {
                reporter.report_check(path, edits, &old_source, &new_source);
            }
        }
        FileResult::ParseError => {
            reporter.report_error(path, "Parse error, skipping");
        }
        FileResult::Error(msg) => {
            reporter.report_error(path, &msg);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_source_extension() {
        assert!(has_source_extension(std::path::Path::new("a/app.ts")));
        assert!(has_source_extension(std::path::Path::new("view.tsx")));
        assert!(has_source_extension(std::path::Path::new("lib.mjs")));
        assert!(!has_source_extension(std::path::Path::new("styles.css")));
        assert!(!has_source_extension(std::path::Path::new("Makefile")));
    }
}
