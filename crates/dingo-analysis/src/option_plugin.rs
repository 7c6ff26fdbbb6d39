//! Resolves `__INFER__` placeholder types left by the text-level
//! type-annotation normalizer, lowers the null-coalesce placeholder call
//! the safe-navigation/null-coalescing processor emits, and resolves the
//! `__INFER__`-returning IIFEs that same processor builds for `?.` chains.

use crate::ast_build as b;
use crate::context::{TransformContext, TransformError, TransformErrorKind};
use dingo_goast::ast::{Field, NodeData, TypeExpr};
use dingo_goast::typeinfo::option_inner_type;
use dingo_goast::NodeId;

const NULL_COALESCE_CALL: &str = "__NULL_COALESCE__";
const UNWRAP_CALL: &str = "__UNWRAP__";
const INFER_SOME_CALL: &str = "__INFER___Some";
const INFER_NONE_CALL: &str = "__INFER___None";

fn enum_name_from_constructor_call(ast: &dingo_goast::Ast, value: NodeId) -> Option<String> {
    let NodeData::CallExpr { func, .. } = ast.get(value) else {
        return None;
    };
    let NodeData::Ident { name } = ast.get(*func) else {
        return None;
    };
    if let Some(rest) = name.strip_prefix("Option_") {
        let _ = rest;
        return Some("Option".to_string());
    }
    if let Some(rest) = name.strip_prefix("Result_") {
        let _ = rest;
        return Some("Result".to_string());
    }
    None
}

const OPTION_METHODS: &[&str] = &["IsSome", "IsNone"];
const RESULT_METHODS: &[&str] = &["IsOk", "IsErr"];
const SHARED_METHODS: &[&str] = &["Unwrap"];

/// Scans the whole file for `<name>.<Method>()` calls that unambiguously
/// identify which built-in enum a variable holds, used as the second-choice
/// signal for `__INFER__` resolution once direct-constructor inference
/// fails.
fn enum_name_from_usage(ast: &dingo_goast::Ast, var_name: &str) -> Option<String> {
    let mut weak_hit = None;
    for i in 0..ast.node_count() {
        let id = NodeId(i as u32);
        let NodeData::SelectorExpr { expr, field } = ast.get(id) else {
            continue;
        };
        let NodeData::Ident { name } = ast.get(*expr) else {
            continue;
        };
        if name != var_name {
            continue;
        }
        if OPTION_METHODS.contains(&field.as_str()) {
            return Some("Option".to_string());
        }
        if RESULT_METHODS.contains(&field.as_str()) {
            return Some("Result".to_string());
        }
        if SHARED_METHODS.contains(&field.as_str()) {
            weak_hit = Some("Option".to_string());
        }
    }
    weak_hit
}

/// Resolves every `var <name> __INFER__ = <value>` declaration's type,
/// trying (in order) the value's constructor call, method-usage evidence
/// elsewhere in the file, then the host type-checker's recorded type for
/// the value expression.
pub fn resolve_infer_types(ctx: &mut TransformContext) {
    let mut rewrites: Vec<(NodeId, String)> = Vec::new();

    for i in 0..ctx.ast.node_count() {
        let id = NodeId(i as u32);
        let NodeData::VarDecl {
            names,
            ty: Some(TypeExpr::Infer),
            values,
            ..
        } = ctx.ast.get(id).clone()
        else {
            continue;
        };
        let Some(var_name) = names.first() else {
            continue;
        };
        let value = values.first().copied();

        let resolved = value
            .and_then(|v| enum_name_from_constructor_call(ctx.ast, v))
            .or_else(|| enum_name_from_usage(ctx.ast, var_name))
            .or_else(|| {
                value.and_then(|v| {
                    ctx.type_info
                        .and_then(|info| info.get(v))
                        .map(dingo_goast::ast::render_type)
                })
            });

        match resolved {
            Some(name) => rewrites.push((id, name)),
            None => ctx.push_error(
                TransformError::new(TransformErrorKind::Internal(format!(
                    "could not infer a type for {}",
                    var_name
                )))
                .at(ctx.ast.position(id)),
            ),
        }
    }

    for (id, type_name) in rewrites {
        let NodeData::VarDecl {
            names,
            values,
            is_const,
            ..
        } = ctx.ast.get(id).clone()
        else {
            continue;
        };
        ctx.ast.set(
            id,
            NodeData::VarDecl {
                names,
                ty: Some(TypeExpr::Named(type_name)),
                values,
                is_const,
            },
        );
    }
}

/// Declared type of the first `name`/param named `var_name` found anywhere
/// in the file, mirroring the lightweight whole-file scan already used for
/// enum-kind inference rather than a strict parent-chain walk to the
/// nearest enclosing scope.
fn declared_type_of(ast: &dingo_goast::Ast, var_name: &str) -> Option<TypeExpr> {
    for i in 0..ast.node_count() {
        let id = NodeId(i as u32);
        match ast.get(id) {
            NodeData::VarDecl {
                names, ty: Some(t), ..
            } if names.iter().any(|n| n == var_name) => return Some(t.clone()),
            NodeData::FuncDecl { params, .. } => {
                if let Some(p) = params.iter().find(|p| p.name.as_deref() == Some(var_name)) {
                    return Some(p.ty.clone());
                }
            }
            _ => {}
        }
    }
    None
}

/// True if `id` is `root` or a descendant of it, per the parent map.
fn is_descendant(ast: &dingo_goast::Ast, id: NodeId, root: NodeId) -> bool {
    if id == root {
        return true;
    }
    let mut current = ast.parent(id);
    while let Some(p) = current {
        if p == root {
            return true;
        }
        current = ast.parent(p);
    }
    false
}

/// First identifier invoked as `<name>.IsNone()` or `<name>.IsSome()`
/// anywhere under `root`, used to find the chain's root variable.
fn root_option_ident(ast: &dingo_goast::Ast, root: NodeId) -> Option<String> {
    for i in 0..ast.node_count() {
        let id = NodeId(i as u32);
        if !is_descendant(ast, id, root) {
            continue;
        }
        let NodeData::CallExpr { func, .. } = ast.get(id) else {
            continue;
        };
        let NodeData::SelectorExpr { expr, field } = ast.get(*func) else {
            continue;
        };
        if field != "IsNone" && field != "IsSome" {
            continue;
        }
        if let NodeData::Ident { name } = ast.get(*expr) {
            return Some(name.clone());
        }
    }
    None
}

/// Explicit (non-placeholder) `Option_<T>_Some`/`Option_<T>_None` call
/// already present under `root`, if any: the most direct evidence of the
/// chain's element type.
fn explicit_option_t(ast: &dingo_goast::Ast, root: NodeId) -> Option<String> {
    for i in 0..ast.node_count() {
        let id = NodeId(i as u32);
        if !is_descendant(ast, id, root) {
            continue;
        }
        let NodeData::CallExpr { func, .. } = ast.get(id) else {
            continue;
        };
        let NodeData::Ident { name } = ast.get(*func) else {
            continue;
        };
        if let Some(t) = option_inner_type(name.trim_end_matches("_Some").trim_end_matches("_None"))
        {
            if name != INFER_SOME_CALL && name != INFER_NONE_CALL {
                return Some(t);
            }
        }
    }
    None
}

/// Resolves every safe-navigation IIFE (a `FuncLit` whose declared return
/// type is the `__INFER__` placeholder): determines the chain's `Option_T`
/// from an explicit constructor call, else from the root variable's own
/// declared `Option_*` type, rewrites the function's return type, and
/// rewrites the `__INFER___Some`/`__INFER___None`/`__UNWRAP__` placeholder
/// calls inside its body to the resolved, concrete forms.
///
/// The root-variable fallback is exact for a single-hop chain; beyond that
/// it is an approximation, since nothing in this tree maintains a
/// struct-field-type table to walk the chain hop by hop. A chain whose
/// resolved type is wrong produces Go that fails to compile rather than a
/// silently wrong program.
pub fn resolve_safe_nav_iifes(ctx: &mut TransformContext) {
    let mut targets: Vec<(NodeId, NodeId)> = Vec::new();
    for i in 0..ctx.ast.node_count() {
        let id = NodeId(i as u32);
        let NodeData::FuncLit { results, body, .. } = ctx.ast.get(id) else {
            continue;
        };
        if matches!(results.as_slice(), [Field { ty: TypeExpr::Infer, .. }]) {
            targets.push((id, *body));
        }
    }

    for (func_id, body) in targets {
        let resolved = explicit_option_t(ctx.ast, body).or_else(|| {
            root_option_ident(ctx.ast, body)
                .and_then(|var| declared_type_of(ctx.ast, &var))
                .and_then(|t| option_inner_type(&dingo_goast::ast::render_type(&t)))
        });

        let Some(elem_type) = resolved else {
            ctx.push_error(
                TransformError::new(TransformErrorKind::UnresolvedSafeNav)
                    .at(ctx.ast.position(func_id)),
            );
            continue;
        };

        let some_name = format!("Option_{}_Some", elem_type);
        let none_name = format!("Option_{}_None", elem_type);

        rewrite_calls_in(ctx.ast, body, |ast, call_id, func_id, args| {
            let NodeData::Ident { name } = ast.get(func_id).clone() else {
                return None;
            };
            if name == INFER_SOME_CALL {
                Some((some_name.clone(), args.clone()))
            } else if name == INFER_NONE_CALL {
                Some((none_name.clone(), args.clone()))
            } else {
                let _ = call_id;
                None
            }
        });

        let mut unwraps = Vec::new();
        for i in 0..ctx.ast.node_count() {
            let id = NodeId(i as u32);
            if !is_descendant(ctx.ast, id, body) {
                continue;
            }
            let NodeData::CallExpr { func, args } = ctx.ast.get(id) else {
                continue;
            };
            let NodeData::Ident { name } = ctx.ast.get(*func) else {
                continue;
            };
            if name == UNWRAP_CALL && args.len() == 1 {
                unwraps.push((id, args[0]));
            }
        }
        for (call_id, arg) in unwraps {
            let sel = b::selector(ctx.ast, arg, "Unwrap");
            ctx.ast.set(call_id, NodeData::CallExpr { func: sel, args: Vec::new() });
        }

        let NodeData::FuncLit { params, body, .. } = ctx.ast.get(func_id).clone() else {
            continue;
        };
        ctx.ast.set(
            func_id,
            NodeData::FuncLit {
                params,
                results: vec![Field {
                    name: None,
                    ty: TypeExpr::Named(format!("Option_{}", elem_type)),
                }],
                body,
            },
        );
    }
}

/// Rewrites every `CallExpr` under `root` whose callee and args satisfy
/// `f` into a plain identifier call with the returned name and args.
fn rewrite_calls_in(
    ast: &mut dingo_goast::Ast,
    root: NodeId,
    f: impl Fn(&dingo_goast::Ast, NodeId, NodeId, &Vec<NodeId>) -> Option<(String, Vec<NodeId>)>,
) {
    let mut rewrites = Vec::new();
    for i in 0..ast.node_count() {
        let id = NodeId(i as u32);
        if !is_descendant(ast, id, root) {
            continue;
        }
        let NodeData::CallExpr { func, args } = ast.get(id).clone() else {
            continue;
        };
        if let Some((name, new_args)) = f(ast, id, func, &args) {
            rewrites.push((id, name, new_args));
        }
    }
    for (id, name, args) in rewrites {
        let ident = b::ident(ast, &name);
        ast.set(id, NodeData::CallExpr { func: ident, args });
    }
}

/// The payload type a null-coalesce's left-hand side resolves to, read off
/// the `Option_<T>` result type [`resolve_safe_nav_iifes`] already attached
/// to `lhs`'s call when `lhs` is itself a safe-navigation IIFE call (the
/// common case, `a?.b ?? c`). Falls back to `rhs`'s inferred type so a
/// coalesce over an already-concrete `Option_<T>` value still gets a real
/// result type instead of leaking `TypeExpr::Infer` into the printed output.
fn coalesce_result_type(ctx: &TransformContext, lhs: NodeId, rhs: NodeId) -> Option<TypeExpr> {
    if let NodeData::CallExpr { func, .. } = ctx.ast.get(lhs) {
        if let NodeData::FuncLit { results, .. } = ctx.ast.get(*func) {
            if let [Field { ty: TypeExpr::Named(name), .. }] = results.as_slice() {
                if let Some(elem) = option_inner_type(name) {
                    return Some(TypeExpr::Named(elem));
                }
            }
        }
    }
    ctx.type_info.and_then(|info| info.get(rhs)).map(dingo_goast::ast::render_type).map(TypeExpr::Named)
}

/// Lowers every `__NULL_COALESCE__(a, b)` placeholder call into an
/// immediately-invoked function literal returning `a`'s payload when
/// present and `b` otherwise, flagging a type mismatch first when both
/// operand types are known and structurally incompatible.
pub fn lower_null_coalesce(ctx: &mut TransformContext) {
    let mut rewrites = Vec::new();
    for i in 0..ctx.ast.node_count() {
        let id = NodeId(i as u32);
        let NodeData::CallExpr { func, args } = ctx.ast.get(id).clone() else {
            continue;
        };
        let NodeData::Ident { name } = ctx.ast.get(func) else {
            continue;
        };
        if name != NULL_COALESCE_CALL || args.len() != 2 {
            continue;
        }
        rewrites.push((id, args[0], args[1]));
    }

    for (id, lhs, rhs) in rewrites {
        if let Some(info) = ctx.type_info {
            if let (Some(lty), Some(rty)) = (info.get(lhs), info.get(rhs)) {
                let categories_conflict = (lty.is_numeric() && rty.is_string())
                    || (lty.is_string() && rty.is_numeric())
                    || (lty.is_bool() != rty.is_bool() && (lty.is_bool() || rty.is_bool()));
                if categories_conflict {
                    ctx.push_error(
                        TransformError::new(TransformErrorKind::NullCoalesceMismatch(format!(
                            "{} vs {}",
                            dingo_goast::ast::render_type(lty),
                            dingo_goast::ast::render_type(rty)
                        )))
                        .at(ctx.ast.position(id)),
                    );
                }
            }
        }

        let result_ty = coalesce_result_type(ctx, lhs, rhs).unwrap_or(TypeExpr::Infer);

        let is_some = {
            let lhs_ident = lhs;
            let sel = b::selector(ctx.ast, lhs_ident, "IsSome");
            b::call(ctx.ast, sel, Vec::new())
        };
        let payload = {
            let sel = b::selector(ctx.ast, lhs, "Some_0");
            b::unary(ctx.ast, "*", sel)
        };
        let then_ret = b::return_stmt(ctx.ast, vec![payload]);
        let then_block = b::block(ctx.ast, vec![then_ret]);
        let if_node = b::if_stmt(ctx.ast, is_some, then_block);
        let else_ret = b::return_stmt(ctx.ast, vec![rhs]);
        let body = b::block(ctx.ast, vec![if_node, else_ret]);

        let func_lit = ctx.ast.alloc(
            NodeData::FuncLit {
                params: Vec::new(),
                results: vec![Field {
                    name: None,
                    ty: result_ty,
                }],
                body,
            },
            ctx.ast.position(id),
            Vec::new(),
        );
        ctx.ast.set(
            id,
            NodeData::CallExpr {
                func: func_lit,
                args: Vec::new(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_goast::parse;
    use dingo_goast::printer::print;

    #[test]
    fn infers_option_type_from_constructor_call() {
        let src = concat!(
            "package main\n",
            "func f() {\n",
            "var x __INFER__ = Option_Some(1)\n",
            "use(x)\n",
            "}\n",
        );
        let mut ast = parse(src).unwrap();
        let mut ctx = TransformContext::new(&mut ast, None);
        resolve_infer_types(&mut ctx);
        assert!(!ctx.has_errors());
        let out = print(&ast);
        assert!(out.contains("var x Option = Option_Some(1)"));
    }

    #[test]
    fn infers_result_type_from_method_usage() {
        let src = concat!(
            "package main\n",
            "func f() {\n",
            "var x __INFER__ = g()\n",
            "if x.IsErr() {\n",
            "return\n",
            "}\n",
            "}\n",
        );
        let mut ast = parse(src).unwrap();
        let mut ctx = TransformContext::new(&mut ast, None);
        resolve_infer_types(&mut ctx);
        assert!(!ctx.has_errors());
        let out = print(&ast);
        assert!(out.contains("var x Result = g()"));
    }

    #[test]
    fn reports_error_when_type_cannot_be_inferred() {
        let src = concat!(
            "package main\n",
            "func f() {\n",
            "var x __INFER__ = g()\n",
            "}\n",
        );
        let mut ast = parse(src).unwrap();
        let mut ctx = TransformContext::new(&mut ast, None);
        resolve_infer_types(&mut ctx);
        assert!(ctx.has_errors());
    }

    #[test]
    fn resolves_safe_nav_iife_from_root_variable_declared_type() {
        let src = concat!(
            "package main\n",
            "func f(user Option_User) {\n",
            "name := func() __INFER__ { if user.IsNone() { return __INFER___None() }; return __INFER___Some(__UNWRAP__(user).Name) }()\n",
            "use(name)\n",
            "}\n",
        );
        let mut ast = parse(src).unwrap();
        let mut ctx = TransformContext::new(&mut ast, None);
        resolve_safe_nav_iifes(&mut ctx);
        assert!(!ctx.has_errors());
        let out = print(&ast);
        assert!(out.contains("func() Option_User"));
        assert!(out.contains("Option_User_None()"));
        assert!(out.contains("Option_User_Some(user.Unwrap().Name)"));
    }

    #[test]
    fn null_coalesce_over_a_resolved_safe_nav_iife_gets_a_concrete_result_type() {
        let src = concat!(
            "package main\n",
            "func f(user Option_User) {\n",
            "name := __NULL_COALESCE__(func() __INFER__ { if user.IsNone() { return __INFER___None() }; return __INFER___Some(__UNWRAP__(user).Name) }(), \"anon\")\n",
            "use(name)\n",
            "}\n",
        );
        let mut ast = parse(src).unwrap();
        let mut ctx = TransformContext::new(&mut ast, None);
        resolve_safe_nav_iifes(&mut ctx);
        lower_null_coalesce(&mut ctx);
        assert!(!ctx.has_errors());
        let out = print(&ast);
        assert!(!out.contains("__INFER__"));
        assert!(out.contains("func() User"));
    }

    #[test]
    fn reports_unresolved_safe_nav_when_no_evidence_of_the_element_type_exists() {
        let src = concat!(
            "package main\n",
            "func f() {\n",
            "name := func() __INFER__ { if g().IsNone() { return __INFER___None() }; return __INFER___Some(__UNWRAP__(g()).Name) }()\n",
            "use(name)\n",
            "}\n",
        );
        let mut ast = parse(src).unwrap();
        let mut ctx = TransformContext::new(&mut ast, None);
        resolve_safe_nav_iifes(&mut ctx);
        assert!(ctx.has_errors());
    }
}
