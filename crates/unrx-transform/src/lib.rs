//! unrx-transform: rewrite push-based `.subscribe(...)` statements into
//! sequential `await firstValueFrom(...)` form
//!
//! This crate provides:
//! - `rewrite()`: Transform one source text, returning the rewritten text
//!   together with the span edits that produced it
//! - `rewrite_file()`: Transform a file on disk (no write-back)
//! - `rewrite_all()`: Transform every file matching a set of glob patterns,
//!   writing results back in place
//! - `RewriteOptions`: Identifier names used in synthesized code
//!
//! The transform is purely syntactic. Handler bodies are spliced into the
//! surrounding function as reproduced source text, so free-variable capture,
//! `this`-binding, and control flow inside a handler can change meaning once
//! inlined. That risk is inherent to the migration aid and is not papered
//! over here.

mod matcher;
mod parse;
mod rewrite;
mod synth;

use std::path::PathBuf;

use thiserror::Error;

pub use rewrite::{rewrite, rewrite_all, rewrite_file, rewrite_source, Rewrite};
pub use unrx_core::{Edit, EditError};

/// Errors produced while transforming a single source text or file.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("failed to resolve source text for a span: {message}")]
    Snippet { message: String },

    #[error("synthesized fragment did not parse to a plain statement sequence")]
    FragmentShape,

    #[error("invalid glob pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error(transparent)]
    Edit(#[from] unrx_core::EditError),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Identifier names spliced into rewritten statements.
///
/// The defaults are the rxjs names the rewrite targets; projects that
/// re-export the helpers under an alias can override them.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Function awaited in place of the subscription. Resolves with the
    /// sequence's first emitted value and throws when the sequence completes
    /// without emitting.
    pub first_value_fn: String,
    /// Error class thrown by `first_value_fn` on completion without a value.
    pub empty_error: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            first_value_fn: "firstValueFrom".to_string(),
            empty_error: "EmptyError".to_string(),
        }
    }
}
