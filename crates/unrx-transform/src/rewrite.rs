//! Traversal integration and transform entry points
//!
//! Rewriting happens on the leave of every node owning a statement-list
//! body: block bodies via `visit_mut_block_stmt`, the program body via
//! `visit_mut_module_items`. Children are visited first, so a subscribe
//! statement nested inside another's handler body is rewritten before the
//! outer statement reproduces that body, and the synthesized outer text
//! never contains an unrewritten pattern.
//!
//! Each match produces one fragment parse (spliced into the tree) and one
//! `Edit` over the matched statement's original span. An outer match whose
//! replacement already incorporates inner rewrites drops the inner edits it
//! subsumes, keeping the edit set non-overlapping.

use std::path::Path;

use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, Span};
use swc_ecma_ast::{BlockStmt, ModuleItem, Stmt};
use swc_ecma_parser::Syntax;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use unrx_core::{apply_edits, Edit};

use crate::matcher::match_subscribe;
use crate::parse::{parse_module, syntax_for};
use crate::synth::synthesize;
use crate::{RewriteOptions, TransformError};

/// Outcome of rewriting one source text.
pub struct Rewrite {
    /// The rewritten text. Byte-identical to the input when `edits` is empty.
    pub text: String,
    /// The applied edits, in ascending source order.
    pub edits: Vec<Edit>,
}

struct Rewriter<'a> {
    cm: Lrc<SourceMap>,
    syntax: Syntax,
    options: &'a RewriteOptions,
    /// Start of the original file within the source map's position space;
    /// edits are recorded relative to it.
    base: BytePos,
    edits: Vec<Edit>,
    fragments: usize,
    /// First fatal failure observed during the walk. Visitor callbacks
    /// cannot return errors, so it is surfaced after traversal.
    error: Option<TransformError>,
}

impl Rewriter<'_> {
    /// Match and rewrite a single statement. `Ok(None)` means the statement
    /// is not a whole-statement subscribe call and passes through unchanged.
    fn rewrite_stmt(&mut self, stmt: &Stmt) -> Result<Option<Vec<Stmt>>, TransformError> {
        let call = match match_subscribe(stmt) {
            Some(call) => call,
            None => return Ok(None),
        };

        let content = synthesize(&call, &self.cm, self.options)?;
        let span = call.span;
        let replacement = self.parse_fragment(&content)?;
        self.record_edit(span, content);
        Ok(Some(replacement))
    }

    fn rewrite_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        if self.error.is_some() {
            return;
        }

        let old = std::mem::take(stmts);
        let mut rewritten = Vec::with_capacity(old.len());
        for stmt in old {
            match self.rewrite_stmt(&stmt) {
                Ok(Some(replacement)) => rewritten.extend(replacement),
                Ok(None) => rewritten.push(stmt),
                Err(error) => {
                    self.error = Some(error);
                    rewritten.push(stmt);
                }
            }
        }
        *stmts = rewritten;
    }

    /// Parse a synthesized fragment as its own source file and return its
    /// statements. Fresh parser per fragment, no state reuse.
    fn parse_fragment(&mut self, content: &str) -> Result<Vec<Stmt>, TransformError> {
        self.fragments += 1;
        let name = format!("<fragment-{}>", self.fragments);
        let fm = self
            .cm
            .new_source_file(FileName::Custom(name).into(), content.to_string());
        let module = parse_module(&fm, self.syntax)?;

        module
            .body
            .into_iter()
            .map(|item| match item {
                ModuleItem::Stmt(stmt) => Ok(stmt),
                ModuleItem::ModuleDecl(_) => Err(TransformError::FragmentShape),
            })
            .collect()
    }

    fn record_edit(&mut self, span: Span, content: String) {
        let start = (span.lo - self.base).0 as usize;
        let end = (span.hi - self.base).0 as usize;

        // An outer rewrite subsumes edits recorded for statements nested
        // inside it; their text already appears in the outer replacement.
        self.edits
            .retain(|edit| !(start <= edit.start && edit.end <= end));

        let message = format!(
            "Rewrite .subscribe() to await {}()",
            self.options.first_value_fn
        );
        self.edits.push(Edit::new(start, end, content, message));
    }
}

impl VisitMut for Rewriter<'_> {
    fn visit_mut_block_stmt(&mut self, block: &mut BlockStmt) {
        block.visit_mut_children_with(self);
        self.rewrite_stmts(&mut block.stmts);
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        items.visit_mut_children_with(self);
        if self.error.is_some() {
            return;
        }

        let old = std::mem::take(items);
        let mut rewritten = Vec::with_capacity(old.len());
        for item in old {
            let stmt = match item {
                ModuleItem::Stmt(stmt) => stmt,
                decl => {
                    rewritten.push(decl);
                    continue;
                }
            };
            match self.rewrite_stmt(&stmt) {
                Ok(Some(replacement)) => {
                    rewritten.extend(replacement.into_iter().map(ModuleItem::Stmt))
                }
                Ok(None) => rewritten.push(ModuleItem::Stmt(stmt)),
                Err(error) => {
                    self.error = Some(error);
                    rewritten.push(ModuleItem::Stmt(stmt));
                }
            }
        }
        *items = rewritten;
    }
}

/// Rewrite one source text, returning the rewritten text and the edit list.
///
/// `filename` selects the parser syntax by extension and labels parse
/// errors; nothing is read from disk.
pub fn rewrite(
    filename: &str,
    source: &str,
    options: &RewriteOptions,
) -> Result<Rewrite, TransformError> {
    let cm: Lrc<SourceMap> = Default::default();
    let syntax = syntax_for(filename);
    let fm = cm.new_source_file(
        FileName::Custom(filename.to_string()).into(),
        source.to_string(),
    );
    let mut module = parse_module(&fm, syntax)?;

    let mut rewriter = Rewriter {
        cm: cm.clone(),
        syntax,
        options,
        base: fm.start_pos,
        edits: Vec::new(),
        fragments: 0,
        error: None,
    };
    module.visit_mut_with(&mut rewriter);

    if let Some(error) = rewriter.error {
        return Err(error);
    }

    let mut edits = rewriter.edits;
    edits.sort_by_key(|edit| edit.start);
    let text = apply_edits(source, &edits)?;
    Ok(Rewrite { text, edits })
}

/// Rewrite one source text, returning only the rewritten text.
pub fn rewrite_source(
    filename: &str,
    source: &str,
    options: &RewriteOptions,
) -> Result<String, TransformError> {
    Ok(rewrite(filename, source, options)?.text)
}

/// Rewrite a file, returning the rewritten text without writing anything.
///
/// When `source` is supplied the path is not read; it only names the file
/// for syntax detection and error reporting.
pub fn rewrite_file(
    path: &Path,
    source: Option<&str>,
    options: &RewriteOptions,
) -> Result<String, TransformError> {
    let owned;
    let source = match source {
        Some(text) => text,
        None => {
            owned = std::fs::read_to_string(path).map_err(|source| TransformError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            &owned
        }
    };
    rewrite_source(&path.to_string_lossy(), source, options)
}

/// Rewrite every file matching the given glob patterns, writing results
/// back in place. Returns the number of files whose contents changed.
pub fn rewrite_all<S: AsRef<str>>(
    patterns: &[S],
    options: &RewriteOptions,
) -> Result<usize, TransformError> {
    let mut changed = 0;

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let entries = glob::glob(pattern).map_err(|error| TransformError::Pattern {
            pattern: pattern.to_string(),
            message: error.to_string(),
        })?;

        for entry in entries {
            let path = entry.map_err(|error| TransformError::Io {
                path: error.path().to_path_buf(),
                source: error.into_error(),
            })?;
            if !path.is_file() {
                continue;
            }

            let original = std::fs::read_to_string(&path).map_err(|source| TransformError::Io {
                path: path.clone(),
                source,
            })?;
            let result = rewrite_source(&path.to_string_lossy(), &original, options)?;
            std::fs::write(&path, &result).map_err(|source| TransformError::Io {
                path: path.clone(),
                source,
            })?;

            if result != original {
                changed += 1;
            }
        }
    }

    Ok(changed)
}
