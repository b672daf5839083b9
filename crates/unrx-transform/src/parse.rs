//! Syntax tree provider binding: parsing and span-to-text resolution
//!
//! All source texts involved in one transform (the input file plus every
//! synthesized fragment) are registered in a single `SourceMap`, so any
//! node's span resolves to the text it was actually parsed from. That is
//! what lets an outer rewrite reproduce handler-body statements that were
//! themselves spliced in from a fragment.

use std::path::Path;

use swc_common::{SourceFile, SourceMap, SourceMapper, Span};
use swc_ecma_ast::{EsVersion, Module};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::TransformError;

/// Pick a parser syntax from the file name's extension.
pub(crate) fn syntax_for(filename: &str) -> Syntax {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match ext {
        "ts" | "mts" | "cts" => Syntax::Typescript(TsSyntax::default()),
        "tsx" => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        "jsx" => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax::default()),
    }
}

/// Parse one registered source file as a module.
///
/// Recoverable parser diagnostics are promoted to hard failures: a file we
/// cannot parse cleanly is never rewritten.
pub(crate) fn parse_module(fm: &SourceFile, syntax: Syntax) -> Result<Module, TransformError> {
    let lexer = Lexer::new(syntax, EsVersion::Es2022, StringInput::from(fm), None);
    let mut parser = Parser::new_from(lexer);

    let module = parser.parse_module().map_err(|error| TransformError::Parse {
        file: fm.name.to_string(),
        message: error.kind().msg().to_string(),
    })?;

    if let Some(error) = parser.take_errors().into_iter().next() {
        return Err(TransformError::Parse {
            file: fm.name.to_string(),
            message: error.kind().msg().to_string(),
        });
    }

    Ok(module)
}

/// Resolve a span back to the text of whichever source file it came from.
pub(crate) fn snippet(cm: &SourceMap, span: Span) -> Result<String, TransformError> {
    cm.span_to_snippet(span).map_err(|error| TransformError::Snippet {
        message: format!("{error:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_for_extension() {
        assert!(matches!(syntax_for("a/b/app.ts"), Syntax::Typescript(s) if !s.tsx));
        assert!(matches!(syntax_for("view.tsx"), Syntax::Typescript(s) if s.tsx));
        assert!(matches!(syntax_for("legacy.jsx"), Syntax::Es(s) if s.jsx));
        assert!(matches!(syntax_for("util.js"), Syntax::Es(s) if !s.jsx));
        assert!(matches!(syntax_for("no-extension"), Syntax::Es(_)));
    }
}
