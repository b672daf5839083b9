//! Text synthesizer: builds the replacement source for a matched statement
//!
//! The replacement reproduces handler bodies as raw source text sliced by
//! span, so untouched formatting inside the bodies survives verbatim. The
//! accumulated statement sequence is wrapped in try/catch only when an
//! `error` or `complete` handler exists.

use swc_common::{SourceMap, Spanned};
use swc_ecma_ast::{BlockStmtOrExpr, Stmt};

use crate::matcher::{param_ident_name, unwrap_param, HandlerFn, SubscribeCall};
use crate::parse::snippet;
use crate::{RewriteOptions, TransformError};

/// Fallback catch binding when the `error` handler declares no usable
/// identifier parameter.
const DEFAULT_CATCH_PARAM: &str = "err";

/// Build the statement-sequence replacement for one matched subscription.
pub(crate) fn synthesize(
    call: &SubscribeCall<'_>,
    cm: &SourceMap,
    options: &RewriteOptions,
) -> Result<String, TransformError> {
    let subject = snippet(cm, call.subject_span)?;
    let mut content = format!("await {}({});", options.first_value_fn, subject);

    if let Some(next) = &call.handlers.next {
        if let Some(param) = next.first_param() {
            let pattern = snippet(cm, unwrap_param(param).span())?;
            content = format!("const {} = {}", pattern, content);
        }
        content.push_str(&body_text(next, cm)?);
    }

    if call.handlers.error.is_some() || call.handlers.complete.is_some() {
        let catch_param = call
            .handlers
            .error
            .as_ref()
            .and_then(|handler| handler.first_param())
            .and_then(param_ident_name)
            .unwrap_or(DEFAULT_CATCH_PARAM);

        let mut catch_body = String::new();
        if let Some(error) = &call.handlers.error {
            catch_body.push_str(&body_text(error, cm)?);
        }

        if let Some(complete) = &call.handlers.complete {
            // Completion without a value surfaces as the distinguished error
            // class; the complete body runs only on that signal. With no
            // error handler alongside it, any other error is swallowed here,
            // exactly as the subscription form swallowed it.
            let complete_arm = format!(
                "if ({} instanceof {}) {{ {} }}",
                catch_param,
                options.empty_error,
                body_text(complete, cm)?
            );
            catch_body = if catch_body.is_empty() {
                complete_arm
            } else {
                format!("{} else {{ {} }}", complete_arm, catch_body)
            };
        }

        content = format!("try {{ {} }} catch ({}) {{ {} }}", content, catch_param, catch_body);
    }

    Ok(content)
}

/// Reproduce a handler body as a statement sequence: block bodies become
/// their statements in original order, expression bodies become a single
/// terminated statement.
fn body_text(handler: &HandlerFn<'_>, cm: &SourceMap) -> Result<String, TransformError> {
    match handler {
        HandlerFn::Arrow(arrow) => match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => stmts_text(&block.stmts, cm),
            BlockStmtOrExpr::Expr(expr) => Ok(format!("{};", snippet(cm, expr.span())?)),
        },
        HandlerFn::Func(func) => match &func.body {
            Some(block) => stmts_text(&block.stmts, cm),
            None => Ok(String::new()),
        },
    }
}

fn stmts_text(stmts: &[Stmt], cm: &SourceMap) -> Result<String, TransformError> {
    let mut pieces = Vec::with_capacity(stmts.len());
    for stmt in stmts {
        pieces.push(snippet(cm, stmt.span())?);
    }
    Ok(pieces.join("\n"))
}
