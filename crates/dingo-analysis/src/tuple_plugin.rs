//! Tuple synthesis: every `__TUPLE_<N>__LITERAL__<hash>(...)` placeholder
//! call the preprocessor's tuple processor left behind is resolved to a
//! concrete generated struct type, deduplicated by its canonical shape,
//! then rewritten into a composite literal of that type.

use crate::ast_build as b;
use crate::context::{DeclOrder, TransformContext};
use dingo_goast::ast::{Field, NodeData, TypeExpr};
use dingo_goast::NodeId;
use std::collections::HashMap;

const PLACEHOLDER_PREFIX: &str = "__TUPLE_";
const PLACEHOLDER_MARKER: &str = "__LITERAL__";

fn parse_arity(name: &str) -> Option<usize> {
    let rest = name.strip_prefix(PLACEHOLDER_PREFIX)?;
    let (arity, rest) = rest.split_once("__")?;
    if !rest.starts_with(&PLACEHOLDER_MARKER[2..]) {
        return None;
    }
    arity.parse().ok()
}

/// Pascal-case fragment for one tuple element's type, used to build a
/// canonical generated struct name. Falls back to `Any` for anything the
/// inferencer could not resolve, matching the universal-interface sentinel.
fn type_name_fragment(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Named(n) => pascal_case(n),
        TypeExpr::Pointer(inner) => format!("Ptr{}", type_name_fragment(inner)),
        TypeExpr::Slice(inner) => format!("Slice{}", type_name_fragment(inner)),
        TypeExpr::Array(n, inner) => format!("Array{}{}", n, type_name_fragment(inner)),
        TypeExpr::MapType(k, v) => {
            format!("Map{}{}", type_name_fragment(k), type_name_fragment(v))
        }
        TypeExpr::Chan(inner) => format!("Chan{}", type_name_fragment(inner)),
        TypeExpr::Interface | TypeExpr::Any | TypeExpr::Infer => "Any".to_string(),
        TypeExpr::Struct(_) => "Struct".to_string(),
        TypeExpr::Func(_, _) => "Func".to_string(),
    }
}

fn pascal_case(name: &str) -> String {
    let mut out = String::new();
    let mut capitalize = true;
    for c in name.chars() {
        if c == '_' {
            capitalize = true;
            continue;
        }
        if capitalize {
            out.extend(c.to_uppercase());
            capitalize = false;
        } else {
            out.push(c);
        }
    }
    out
}

struct TupleShape {
    element_types: Vec<TypeExpr>,
    struct_name: String,
}

fn canonical_name(arity: usize, element_types: &[TypeExpr]) -> String {
    let mut name = format!("Tuple{}", arity);
    for ty in element_types {
        name.push_str(&type_name_fragment(ty));
    }
    name
}

fn infer_element_type(ctx: &TransformContext, arg: NodeId) -> TypeExpr {
    if let Some(info) = ctx.type_info {
        if let Some(ty) = info.get(arg) {
            return ty.clone();
        }
    }
    TypeExpr::Any
}

/// Finds every tuple-literal placeholder call, synthesizes (once per
/// distinct shape) the backing struct, queues it for insertion, and
/// rewrites each call site into a composite literal of that struct.
pub fn run(ctx: &mut TransformContext) {
    let mut shapes: HashMap<String, TupleShape> = HashMap::new();
    let mut rewrites: Vec<(NodeId, String, Vec<NodeId>)> = Vec::new();

    for i in 0..ctx.ast.node_count() {
        let id = NodeId(i as u32);
        let NodeData::CallExpr { func, args } = ctx.ast.get(id).clone() else {
            continue;
        };
        let NodeData::Ident { name } = ctx.ast.get(func) else {
            continue;
        };
        let Some(arity) = parse_arity(name) else {
            continue;
        };
        if arity != args.len() {
            continue;
        }
        let element_types: Vec<TypeExpr> = args.iter().map(|a| infer_element_type(ctx, *a)).collect();
        let struct_name = canonical_name(arity, &element_types);
        shapes.entry(struct_name.clone()).or_insert_with(|| TupleShape {
            element_types: element_types.clone(),
            struct_name: struct_name.clone(),
        });
        rewrites.push((id, struct_name, args));
    }

    for shape in shapes.values() {
        let fields: Vec<Field> = shape
            .element_types
            .iter()
            .enumerate()
            .map(|(i, ty)| Field {
                name: Some(format!("_{}", i)),
                ty: ty.clone(),
            })
            .collect();
        let decl = b::type_decl(ctx.ast, &shape.struct_name, TypeExpr::Struct(fields));
        ctx.queue_decl(DeclOrder::UnionStruct, decl);
    }

    for (call_id, struct_name, args) in rewrites {
        let elements: Vec<(Option<String>, NodeId)> = args
            .into_iter()
            .enumerate()
            .map(|(i, arg)| (Some(format!("_{}", i)), arg))
            .collect();
        let composite = NodeData::CompositeLit {
            ty: Some(TypeExpr::Named(struct_name)),
            elements,
        };
        ctx.ast.set(call_id, composite);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_goast::parse;
    use dingo_goast::printer::print;

    #[test]
    fn rewrites_placeholder_call_into_composite_literal() {
        let src = concat!(
            "package main\n",
            "func f() {\n",
            "t := __TUPLE_2__LITERAL__ab12(10, \"hi\")\n",
            "use(t)\n",
            "}\n",
        );
        let mut ast = parse(src).unwrap();
        let mut ctx = TransformContext::new(&mut ast, None);
        run(&mut ctx);
        ctx.flush_pending_decls();
        let out = print(&ast);
        assert!(out.contains("type Tuple2AnyAny struct"));
        assert!(out.contains("Tuple2AnyAny{_0: 10, _1: \"hi\"}"));
    }

    #[test]
    fn dedupes_identical_shapes_into_one_struct() {
        let src = concat!(
            "package main\n",
            "func f() {\n",
            "a := __TUPLE_2__LITERAL__a1(1, 2)\n",
            "b := __TUPLE_2__LITERAL__b2(3, 4)\n",
            "use(a, b)\n",
            "}\n",
        );
        let mut ast = parse(src).unwrap();
        let mut ctx = TransformContext::new(&mut ast, None);
        run(&mut ctx);
        ctx.flush_pending_decls();
        let out = print(&ast);
        assert_eq!(out.matches("type Tuple2AnyAny struct").count(), 1);
    }

    #[test]
    fn pascal_cases_named_types_in_the_generated_struct_name() {
        assert_eq!(type_name_fragment(&TypeExpr::Named("int".to_string())), "Int");
        assert_eq!(
            type_name_fragment(&TypeExpr::Named("string".to_string())),
            "String"
        );
        assert_eq!(canonical_name(2, &[TypeExpr::Named("int".to_string()), TypeExpr::Named("string".to_string())]), "Tuple2IntString");
    }
}
