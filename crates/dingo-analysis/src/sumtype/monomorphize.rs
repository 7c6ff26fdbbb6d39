//! Discovers every `Option_<T>`/`Result_<T>_<E>` name referenced in a
//! file's type positions and synthesizes its struct/constructor/helper
//! declarations, the way `SumTypeRegistry::with_builtins` pre-registers the
//! shared, type-erased `Option`/`Result` but per concrete instantiation:
//! a file that declares `func greet(user Option_User) string` never writes
//! a `DINGO_ENUM` marker for `Option_User` itself, since the name alone is
//! enough to recover its shape.

use crate::context::TransformContext;
use crate::sumtype::lowering::synthesize_instantiation;
use crate::sumtype::registry::{EnumDef, SumTypeRegistry, Variant, VariantKind};
use dingo_goast::ast::{NodeData, TypeExpr};
use dingo_goast::NodeId;
use std::collections::BTreeSet;

fn collect_named(ty: &TypeExpr, out: &mut Vec<String>) {
    match ty {
        TypeExpr::Named(name) => out.push(name.clone()),
        TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) | TypeExpr::Array(_, inner) | TypeExpr::Chan(inner) => {
            collect_named(inner, out)
        }
        TypeExpr::MapType(key, value) => {
            collect_named(key, out);
            collect_named(value, out);
        }
        TypeExpr::Struct(fields) => {
            for field in fields {
                collect_named(&field.ty, out);
            }
        }
        TypeExpr::Func(params, results) => {
            for t in params.iter().chain(results.iter()) {
                collect_named(t, out);
            }
        }
        TypeExpr::Interface | TypeExpr::Any | TypeExpr::Infer => {}
    }
}

/// Every named type mentioned in a function signature, variable
/// declaration, type declaration's underlying type, or composite literal's
/// type, anywhere in the file.
fn referenced_type_names(ast: &dingo_goast::Ast) -> Vec<String> {
    let mut names = Vec::new();
    for i in 0..ast.node_count() {
        let id = NodeId(i as u32);
        match ast.get(id) {
            NodeData::FuncDecl { params, results, .. } | NodeData::FuncLit { params, results, .. } => {
                for field in params.iter().chain(results.iter()) {
                    collect_named(&field.ty, &mut names);
                }
            }
            NodeData::VarDecl { ty: Some(t), .. } => collect_named(t, &mut names),
            NodeData::TypeDecl { ty, .. } => collect_named(ty, &mut names),
            NodeData::CompositeLit { ty: Some(t), .. } => collect_named(t, &mut names),
            _ => {}
        }
    }
    names
}

fn instantiation_from_name(name: &str) -> Option<EnumDef> {
    if let Some(t) = name.strip_prefix("Option_") {
        if t.is_empty() {
            return None;
        }
        return Some(EnumDef {
            name: name.to_string(),
            variants: vec![
                Variant {
                    name: "Some".to_string(),
                    kind: VariantKind::Tuple(vec![TypeExpr::Named(t.to_string())]),
                },
                Variant {
                    name: "None".to_string(),
                    kind: VariantKind::Unit,
                },
            ],
            decl_node: NodeId(0),
        });
    }
    let rest = name.strip_prefix("Result_")?;
    let (t, e) = rest.split_once('_')?;
    if t.is_empty() || e.is_empty() {
        return None;
    }
    Some(EnumDef {
        name: name.to_string(),
        variants: vec![
            Variant {
                name: "Ok".to_string(),
                kind: VariantKind::Tuple(vec![TypeExpr::Named(t.to_string())]),
            },
            Variant {
                name: "Err".to_string(),
                kind: VariantKind::Tuple(vec![TypeExpr::Named(e.to_string())]),
            },
        ],
        decl_node: NodeId(0),
    })
}

/// Registers and queues the declarations for every distinct `Option_<T>`/
/// `Result_<T>_<E>` name referenced in the file, skipping any name a
/// `DINGO_ENUM` marker already declared.
pub fn run(ctx: &mut TransformContext, registry: &mut SumTypeRegistry) {
    let mut seen = BTreeSet::new();
    for name in referenced_type_names(ctx.ast) {
        if registry.get(&name).is_some() || !seen.insert(name.clone()) {
            continue;
        }
        let Some(def) = instantiation_from_name(&name) else {
            continue;
        };
        synthesize_instantiation(ctx, &def);
        registry.insert(def);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_goast::parse;
    use dingo_goast::printer::print;

    #[test]
    fn synthesizes_an_option_instantiation_from_a_function_signature() {
        let src = "package main\nfunc greet(user Option_User) string {\nreturn \"\"\n}\n";
        let mut ast = parse(src).unwrap();
        let mut registry = SumTypeRegistry::with_builtins();
        let mut ctx = TransformContext::new(&mut ast, None);
        run(&mut ctx, &mut registry);
        ctx.flush_pending_decls();
        assert!(registry.get("Option_User").is_some());
        let out = print(&ast);
        assert!(out.contains("type Option_User struct"));
        assert!(out.contains("func Option_User_Some(v0 User) Option_User"));
        assert!(out.contains("func (v Option_User) Unwrap() User"));
    }

    #[test]
    fn synthesizes_a_result_instantiation_from_a_var_declaration() {
        let src = "package main\nfunc f() {\nvar r Result_int_error\nuse(r)\n}\n";
        let mut ast = parse(src).unwrap();
        let mut registry = SumTypeRegistry::with_builtins();
        let mut ctx = TransformContext::new(&mut ast, None);
        run(&mut ctx, &mut registry);
        ctx.flush_pending_decls();
        let out = print(&ast);
        assert!(out.contains("type Result_int_error struct"));
        assert!(out.contains("func Result_int_error_Ok(v0 int) Result_int_error"));
        assert!(out.contains("func (v Result_int_error) UnwrapErr() error"));
    }

    #[test]
    fn does_not_redeclare_an_instantiation_already_covered_by_a_dingo_enum_marker() {
        let src = "package main\nfunc f(x Option_User) {}\n";
        let mut ast = parse(src).unwrap();
        let mut registry = SumTypeRegistry::with_builtins();
        registry.insert(EnumDef {
            name: "Option_User".to_string(),
            variants: Vec::new(),
            decl_node: NodeId(0),
        });
        let mut ctx = TransformContext::new(&mut ast, None);
        run(&mut ctx, &mut registry);
        ctx.flush_pending_decls();
        assert!(!print(&ast).contains("type Option_User struct"));
    }
}
