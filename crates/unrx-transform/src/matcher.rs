//! Pattern matcher for whole-statement `.subscribe(...)` calls
//!
//! Matching is a pure inspection of one statement: no edits, no new nodes.
//! Anything that is not an expression statement calling `subscribe` through
//! a non-computed member access is a no-match, never an error.

use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, Callee, Expr, ExprOrSpread, Function, MemberProp, Pat, Prop, PropName,
    PropOrSpread, Stmt,
};

/// A function-like handler argument: arrow function, function expression, or
/// object-literal method shorthand.
pub(crate) enum HandlerFn<'a> {
    Arrow(&'a ArrowExpr),
    Func(&'a Function),
}

impl<'a> HandlerFn<'a> {
    /// The handler's first declared parameter, if any.
    pub(crate) fn first_param(&self) -> Option<&'a Pat> {
        match self {
            HandlerFn::Arrow(arrow) => arrow.params.first(),
            HandlerFn::Func(func) => func.params.first().map(|param| &param.pat),
        }
    }
}

/// The `next`/`error`/`complete` triple attached to a subscription. Each
/// slot may independently be empty.
#[derive(Default)]
pub(crate) struct Handlers<'a> {
    pub next: Option<HandlerFn<'a>>,
    pub error: Option<HandlerFn<'a>>,
    pub complete: Option<HandlerFn<'a>>,
}

/// A matched subscribe statement.
pub(crate) struct SubscribeCall<'a> {
    /// Span of the whole expression statement, including its terminator.
    pub span: Span,
    /// Span of the receiver expression the subscription is taken from.
    pub subject_span: Span,
    pub handlers: Handlers<'a>,
}

/// Recognize `<subject>.subscribe(<args>)` at statement granularity.
///
/// The member access must be non-computed and literally named `subscribe`.
/// A statement that qualifies always matches, even with no recognizable
/// handler arguments: the bare subscription degenerates to a plain awaited
/// call during synthesis.
pub(crate) fn match_subscribe(stmt: &Stmt) -> Option<SubscribeCall<'_>> {
    let expr_stmt = match stmt {
        Stmt::Expr(expr_stmt) => expr_stmt,
        _ => return None,
    };

    let call = match &*expr_stmt.expr {
        Expr::Call(call) => call,
        _ => return None,
    };

    let callee = match &call.callee {
        Callee::Expr(callee) => callee,
        _ => return None,
    };

    let member = match &**callee {
        Expr::Member(member) => member,
        _ => return None,
    };

    match &member.prop {
        MemberProp::Ident(name) if name.sym.as_ref() == "subscribe" => {}
        _ => return None,
    }

    Some(SubscribeCall {
        span: expr_stmt.span,
        subject_span: member.obj.span(),
        handlers: extract_handlers(&call.args),
    })
}

/// Populate the handler triple from the call's arguments.
///
/// An object-literal first argument wins and is inspected by property name;
/// otherwise arguments fill the slots positionally. Non-function values
/// leave their slot empty without shifting later positions, and arguments
/// beyond the third are ignored.
fn extract_handlers(args: &[ExprOrSpread]) -> Handlers<'_> {
    let mut handlers = Handlers::default();

    if let Some(first) = args.first() {
        if first.spread.is_none() {
            if let Expr::Object(object) = &*first.expr {
                for prop in &object.props {
                    let prop = match prop {
                        PropOrSpread::Prop(prop) => prop,
                        PropOrSpread::Spread(_) => continue,
                    };

                    let (key, handler) = match &**prop {
                        Prop::KeyValue(kv) => match (&kv.key, as_handler(&kv.value)) {
                            (PropName::Ident(key), Some(handler)) => (key, handler),
                            _ => continue,
                        },
                        Prop::Method(method) => match &method.key {
                            PropName::Ident(key) => (key, HandlerFn::Func(&method.function)),
                            _ => continue,
                        },
                        _ => continue,
                    };

                    match key.sym.as_ref() {
                        "next" => handlers.next = Some(handler),
                        "error" => handlers.error = Some(handler),
                        "complete" => handlers.complete = Some(handler),
                        _ => {}
                    }
                }

                return handlers;
            }
        }
    }

    let mut positional = args.iter().map(|arg| {
        if arg.spread.is_some() {
            None
        } else {
            as_handler(&arg.expr)
        }
    });

    handlers.next = positional.next().flatten();
    handlers.error = positional.next().flatten();
    handlers.complete = positional.next().flatten();
    handlers
}

fn as_handler(expr: &Expr) -> Option<HandlerFn<'_>> {
    match expr {
        Expr::Arrow(arrow) => Some(HandlerFn::Arrow(arrow)),
        Expr::Fn(func) => Some(HandlerFn::Func(&func.function)),
        _ => None,
    }
}

/// Strip a rest wrapper from a parameter, yielding its binding pattern.
pub(crate) fn unwrap_param(pat: &Pat) -> &Pat {
    match pat {
        Pat::Rest(rest) => &rest.arg,
        _ => pat,
    }
}

/// Identifier name of a parameter, after unwrapping. `None` for
/// destructuring patterns.
pub(crate) fn param_ident_name(pat: &Pat) -> Option<&str> {
    match unwrap_param(pat) {
        Pat::Ident(binding) => Some(binding.id.sym.as_ref()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::{sync::Lrc, FileName, SourceMap};
    use swc_ecma_ast::{Module, ModuleItem};

    use crate::parse::{parse_module, syntax_for};

    fn parse(source: &str) -> Module {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            FileName::Custom("match.ts".to_string()).into(),
            source.to_string(),
        );
        parse_module(&fm, syntax_for("match.ts")).unwrap()
    }

    fn first_stmt(module: &Module) -> &Stmt {
        match &module.body[0] {
            ModuleItem::Stmt(stmt) => stmt,
            other => panic!("expected a statement, got {other:?}"),
        }
    }

    fn slots(handlers: &Handlers<'_>) -> (bool, bool, bool) {
        (
            handlers.next.is_some(),
            handlers.error.is_some(),
            handlers.complete.is_some(),
        )
    }

    #[test]
    fn test_matches_bare_subscription() {
        let module = parse("source.subscribe();");
        let matched = match_subscribe(first_stmt(&module)).unwrap();
        assert_eq!(slots(&matched.handlers), (false, false, false));
    }

    #[test]
    fn test_matches_positional_handlers() {
        let module = parse("source.subscribe(v => v, function (e) { log(e); }, () => done());");
        let matched = match_subscribe(first_stmt(&module)).unwrap();
        assert_eq!(slots(&matched.handlers), (true, true, true));
    }

    #[test]
    fn test_positional_non_function_keeps_position() {
        let module = parse("source.subscribe(observer, e => log(e));");
        let matched = match_subscribe(first_stmt(&module)).unwrap();
        assert_eq!(slots(&matched.handlers), (false, true, false));
    }

    #[test]
    fn test_matches_object_literal_handlers() {
        let module = parse("source.subscribe({ error: e => log(e), complete() { done(); } });");
        let matched = match_subscribe(first_stmt(&module)).unwrap();
        assert_eq!(slots(&matched.handlers), (false, true, true));
    }

    #[test]
    fn test_object_literal_ignores_unknown_and_non_function_props() {
        let module = parse("source.subscribe({ next: observer, finalize: () => {}, error: e => log(e) });");
        let matched = match_subscribe(first_stmt(&module)).unwrap();
        assert_eq!(slots(&matched.handlers), (false, true, false));
    }

    #[test]
    fn test_rejects_computed_member_access() {
        let module = parse("source[\"subscribe\"](v => v);");
        assert!(match_subscribe(first_stmt(&module)).is_none());
    }

    #[test]
    fn test_rejects_other_method_names() {
        let module = parse("source.unsubscribe();");
        assert!(match_subscribe(first_stmt(&module)).is_none());
    }

    #[test]
    fn test_rejects_non_statement_subscription() {
        let module = parse("const sub = source.subscribe(v => v);");
        assert!(match_subscribe(first_stmt(&module)).is_none());
    }

    #[test]
    fn test_param_ident_name_unwraps_rest() {
        let module = parse("source.subscribe((...values) => values);");
        let matched = match_subscribe(first_stmt(&module)).unwrap();
        let param = matched.handlers.next.as_ref().unwrap().first_param().unwrap();
        assert_eq!(param_ident_name(param), Some("values"));
    }

    #[test]
    fn test_param_ident_name_none_for_destructuring() {
        let module = parse("source.subscribe(({ id }) => id);");
        let matched = match_subscribe(first_stmt(&module)).unwrap();
        let param = matched.handlers.next.as_ref().unwrap().first_param().unwrap();
        assert_eq!(param_ident_name(param), None);
    }
}
