//! Sum-type lowering: turns a discovered enum into a tag type, a union
//! struct, constructor functions and `IsVariant()` helpers, then rewrites
//! matches on that enum into tag-switches with destructuring prelude
//! statements and (depending on configuration) nil-safety guards.

use crate::ast_build as b;
use crate::context::{DeclOrder, TransformContext, TransformError, TransformErrorKind};
use crate::sumtype::exhaustive::{missing_single, missing_tuple_patterns};
use crate::sumtype::registry::{EnumDef, SumTypeRegistry, Variant, VariantKind};
use dingo_annotations::NilSafetyMode;
use dingo_goast::ast::{Field, NodeData, Receiver, TypeExpr};
use dingo_goast::NodeId;

/// A parsed `// DINGO_PATTERN: <Variant>(<binding>, ...)` marker, with an
/// optional trailing `// DINGO_GUARD: <expr-source>` sibling comment.
struct ParsedPattern {
    variant: String,
    bindings: Vec<String>,
}

fn parse_pattern_marker(comment: &str) -> Option<ParsedPattern> {
    let rest = comment.strip_prefix("// DINGO_PATTERN:")?.trim();
    if rest == "_" {
        return Some(ParsedPattern {
            variant: "_".to_string(),
            bindings: Vec::new(),
        });
    }
    match rest.split_once('(') {
        Some((variant, tail)) => {
            let body = tail.strip_suffix(')').unwrap_or(tail);
            let bindings = if body.trim().is_empty() {
                Vec::new()
            } else {
                body.split(',').map(|s| s.trim().to_string()).collect()
            };
            Some(ParsedPattern {
                variant: variant.trim().to_string(),
                bindings,
            })
        }
        None => Some(ParsedPattern {
            variant: rest.to_string(),
            bindings: Vec::new(),
        }),
    }
}

/// Synthesizes the tag type, union struct, constructors and helpers for one
/// enum, queuing them on `ctx` for insertion at file scope.
pub fn synthesize_enum(ctx: &mut TransformContext, def: &EnumDef) {
    let tag_type_name = format!("{}Tag", def.name);

    let tag_ty = b::type_decl(ctx.ast, &tag_type_name, TypeExpr::Named("int".to_string()));
    ctx.queue_decl(DeclOrder::TagType, tag_ty);

    for (i, variant) in def.variants.iter().enumerate() {
        let value = b::int_lit(ctx.ast, i as i64);
        let decl = b::const_decl(
            ctx.ast,
            &variant.tag_name(&def.name),
            Some(TypeExpr::Named(tag_type_name.clone())),
            value,
        );
        ctx.queue_decl(DeclOrder::TagType, decl);
    }

    let mut struct_fields = vec![Field {
        name: Some("tag".to_string()),
        ty: TypeExpr::Named(tag_type_name.clone()),
    }];
    for variant in &def.variants {
        struct_fields.extend(variant_fields(def, variant));
    }
    let union_ty = b::type_decl(
        ctx.ast,
        &def.name,
        TypeExpr::Struct(struct_fields.clone()),
    );
    ctx.queue_decl(DeclOrder::UnionStruct, union_ty);

    for variant in &def.variants {
        let ctor = build_constructor(ctx.ast, def, variant);
        ctx.queue_decl(DeclOrder::Constructor, ctor);
        let helper = build_is_variant(ctx.ast, def, variant);
        ctx.queue_decl(DeclOrder::Helper, helper);
    }
    for unwrap in build_unwrap_helpers(ctx.ast, def) {
        ctx.queue_decl(DeclOrder::Helper, unwrap);
    }
}

/// Synthesizes one `Option_<T>`/`Result_<T>_<E>` instantiation discovered by
/// name in a file's type positions: same struct/constructor/helper shape as
/// [`synthesize_enum`], but sharing the builtin's `OptionTag`/`ResultTag`
/// type and tag constants instead of declaring a fresh `<Name>Tag` per `T`,
/// since [`SumTypeRegistry::with_builtins`] already queues those
/// unconditionally for every file.
pub fn synthesize_instantiation(ctx: &mut TransformContext, def: &EnumDef) {
    let tag_type_name = if def.name == "Option" || def.name.starts_with("Option_") {
        "OptionTag"
    } else {
        "ResultTag"
    };

    let mut struct_fields = vec![Field {
        name: Some("tag".to_string()),
        ty: TypeExpr::Named(tag_type_name.to_string()),
    }];
    for variant in &def.variants {
        struct_fields.extend(variant_fields(def, variant));
    }
    let union_ty = b::type_decl(ctx.ast, &def.name, TypeExpr::Struct(struct_fields));
    ctx.queue_decl(DeclOrder::UnionStruct, union_ty);

    for variant in &def.variants {
        let ctor = build_constructor(ctx.ast, def, variant);
        ctx.queue_decl(DeclOrder::Constructor, ctor);
        let helper = build_is_variant(ctx.ast, def, variant);
        ctx.queue_decl(DeclOrder::Helper, helper);
    }
    for unwrap in build_unwrap_helpers(ctx.ast, def) {
        ctx.queue_decl(DeclOrder::Helper, unwrap);
    }
}

/// `Unwrap()`/`UnwrapErr()` methods for an Option/Result-family enum,
/// dereferencing the single-field `Some`/`Ok`/`Err` payload pointer
/// `variant_fields` already names `<Variant>_0`. Empty for any enum outside
/// the Option/Result family: a user sum type's payload is accessed through
/// its declared pattern-match bindings instead.
fn build_unwrap_helpers(ast: &mut dingo_goast::Ast, def: &EnumDef) -> Vec<NodeId> {
    let is_option = def.name == "Option" || def.name.starts_with("Option_");
    let is_result = def.name == "Result" || def.name.starts_with("Result_");
    if !is_option && !is_result {
        return Vec::new();
    }
    let payload_variant = if is_option { "Some" } else { "Ok" };
    let mut helpers = Vec::new();
    if let Some(unwrap) = build_payload_accessor(ast, def, payload_variant, "Unwrap") {
        helpers.push(unwrap);
    }
    if is_result {
        if let Some(unwrap_err) = build_payload_accessor(ast, def, "Err", "UnwrapErr") {
            helpers.push(unwrap_err);
        }
    }
    helpers
}

fn build_payload_accessor(
    ast: &mut dingo_goast::Ast,
    def: &EnumDef,
    variant_name: &str,
    method_name: &str,
) -> Option<NodeId> {
    let variant = def.variants.iter().find(|v| v.name == variant_name)?;
    let VariantKind::Tuple(types) = &variant.kind else {
        return None;
    };
    let payload_ty = types.first()?.clone();
    let receiver = Receiver {
        name: "v".to_string(),
        type_name: def.name.clone(),
    };
    let field = format!("{}_0", variant_name);
    let field_sel = {
        let recv_ident = b::ident(ast, "v");
        b::selector(ast, recv_ident, &field)
    };
    let deref = b::unary(ast, "*", field_sel);
    let ret = b::return_stmt(ast, vec![deref]);
    let body = b::block(ast, vec![ret]);
    Some(b::func_decl(
        ast,
        method_name,
        Some(receiver),
        Vec::new(),
        vec![Field {
            name: None,
            ty: payload_ty,
        }],
        body,
    ))
}

/// The union struct's per-variant payload fields: one pointer field per
/// struct/tuple field, named `<variant>_<field>` or `<variant>_<index>`.
fn variant_fields(_def: &EnumDef, variant: &Variant) -> Vec<Field> {
    match &variant.kind {
        VariantKind::Unit => Vec::new(),
        VariantKind::Struct(fields) => fields
            .iter()
            .map(|(name, ty)| Field {
                name: Some(format!("{}_{}", variant.name, name)),
                ty: TypeExpr::Pointer(Box::new(ty.clone())),
            })
            .collect(),
        VariantKind::Tuple(types) => types
            .iter()
            .enumerate()
            .map(|(i, ty)| Field {
                name: Some(format!("{}_{}", variant.name, i)),
                ty: TypeExpr::Pointer(Box::new(ty.clone())),
            })
            .collect(),
    }
}

fn build_constructor(ast: &mut dingo_goast::Ast, def: &EnumDef, variant: &Variant) -> NodeId {
    let params: Vec<Field> = match &variant.kind {
        VariantKind::Unit => Vec::new(),
        VariantKind::Struct(fields) => fields
            .iter()
            .map(|(name, ty)| Field {
                name: Some(name.clone()),
                ty: ty.clone(),
            })
            .collect(),
        VariantKind::Tuple(types) => types
            .iter()
            .enumerate()
            .map(|(i, ty)| Field {
                name: Some(format!("v{}", i)),
                ty: ty.clone(),
            })
            .collect(),
    };

    let mut elements = vec![(
        Some("tag".to_string()),
        {
            let tag_ident = b::ident(ast, &variant.tag_name(&def.name));
            tag_ident
        },
    )];
    for param in &params {
        let field_name = match &variant.kind {
            VariantKind::Struct(_) => format!("{}_{}", variant.name, param.name.as_ref().unwrap()),
            _ => format!(
                "{}_{}",
                variant.name,
                param.name.as_ref().unwrap().trim_start_matches('v')
            ),
        };
        let param_ident = b::ident(ast, param.name.as_ref().unwrap());
        let addr = b::unary(ast, "&", param_ident);
        elements.push((Some(field_name), addr));
    }

    let composite = b::composite(ast, TypeExpr::Named(def.name.clone()), elements);
    let ret = b::return_stmt(ast, vec![composite]);
    let body = b::block(ast, vec![ret]);

    b::func_decl(
        ast,
        &format!("{}_{}", def.name, variant.name),
        None,
        params,
        vec![Field {
            name: None,
            ty: TypeExpr::Named(def.name.clone()),
        }],
        body,
    )
}

fn build_is_variant(ast: &mut dingo_goast::Ast, def: &EnumDef, variant: &Variant) -> NodeId {
    let receiver = Receiver {
        name: "v".to_string(),
        type_name: def.name.clone(),
    };
    let recv_tag = {
        let recv_ident = b::ident(ast, "v");
        b::selector(ast, recv_ident, "tag")
    };
    let tag_const = b::ident(ast, &variant.tag_name(&def.name));
    let cmp = b::binary(ast, "==", recv_tag, tag_const);
    let ret = b::return_stmt(ast, vec![cmp]);
    let body = b::block(ast, vec![ret]);
    b::func_decl(
        ast,
        &format!("Is{}", variant.name),
        Some(receiver),
        Vec::new(),
        vec![Field {
            name: None,
            ty: TypeExpr::Named("bool".to_string()),
        }],
        body,
    )
}

/// Rewrites a single match's case list: injects destructuring statements
/// (and nil-safety guards) ahead of each arm's body, and checks
/// exhaustiveness.
pub fn lower_match(
    ctx: &mut TransformContext,
    registry: &SumTypeRegistry,
    switch_id: NodeId,
    scrutinee_name: &str,
    enum_name: &str,
    nil_safety: NilSafetyMode,
) {
    let Some(def) = registry.get(enum_name).cloned() else {
        return;
    };
    let switch_pos = ctx.ast.position(switch_id);

    let NodeData::SwitchStmt { cases, .. } = ctx.ast.get(switch_id).clone() else {
        return;
    };

    let mut covered = Vec::new();
    let mut new_cases = Vec::with_capacity(cases.len());

    for mut case in cases {
        let Some(marker) = case
            .leading_comments
            .iter()
            .find_map(|c| parse_pattern_marker(c))
        else {
            new_cases.push(case);
            continue;
        };
        covered.push(marker.variant.clone());

        if marker.variant == "_" {
            new_cases.push(case);
            continue;
        }

        let Some(variant) = def.variants.iter().find(|v| v.name == marker.variant) else {
            ctx.push_error(
                TransformError::new(TransformErrorKind::PatternTypeMismatch(format!(
                    "{} has no variant {}",
                    enum_name, marker.variant
                )))
                .at(switch_pos),
            );
            new_cases.push(case);
            continue;
        };

        let field_names = variant_field_names(variant);
        if marker.bindings.len() > field_names.len() {
            ctx.push_error(
                TransformError::new(TransformErrorKind::PatternTypeMismatch(format!(
                    "{} binds {} names but variant {} has {} field(s)",
                    enum_name,
                    marker.bindings.len(),
                    marker.variant,
                    field_names.len()
                )))
                .at(switch_pos),
            );
        }

        let mut prelude = Vec::new();
        for (binding, field) in marker.bindings.iter().zip(field_names.iter()) {
            if binding == "_" {
                continue;
            }
            let field_expr = {
                let scrutinee = b::ident(ctx.ast, scrutinee_name);
                b::selector(ctx.ast, scrutinee, field)
            };
            if let Some(guard) = nil_guard(ctx, nil_safety, field_expr, field) {
                prelude.push(guard);
            }
            let field_expr = {
                let scrutinee = b::ident(ctx.ast, scrutinee_name);
                b::selector(ctx.ast, scrutinee, field)
            };
            let deref = b::unary(ctx.ast, "*", field_expr);
            let binding_ident = b::ident(ctx.ast, binding);
            let assign = b::assign(ctx.ast, vec![binding_ident], true, vec![deref]);
            prelude.push(assign);
        }

        let mut body = prelude;
        body.extend(case.body.drain(..));
        case.body = body;
        new_cases.push(case);
    }

    let scrutinee = b::ident(ctx.ast, scrutinee_name);
    let tag = b::selector(ctx.ast, scrutinee, "tag");
    ctx.ast.set(
        switch_id,
        NodeData::SwitchStmt {
            tag: Some(tag),
            cases: new_cases,
        },
    );

    let missing = missing_single(&def, &covered);
    if !missing.is_empty() {
        ctx.push_error(
            TransformError::new(TransformErrorKind::NonExhaustiveMatch(missing)).at(switch_pos),
        );
    }
}

fn variant_field_names(variant: &Variant) -> Vec<String> {
    match &variant.kind {
        VariantKind::Unit => Vec::new(),
        VariantKind::Struct(fields) => fields
            .iter()
            .map(|(name, _)| format!("{}_{}", variant.name, name))
            .collect(),
        VariantKind::Tuple(types) => (0..types.len())
            .map(|i| format!("{}_{}", variant.name, i))
            .collect(),
    }
}

/// Builds the nil-safety guard statement ahead of a destructuring
/// dereference, per the three-tier mode: off emits nothing, on emits an
/// unconditional panic-on-nil check, debug gates the same check behind a
/// package-level `dingoDebug` flag emitted once per file.
fn nil_guard(
    ctx: &mut TransformContext,
    mode: NilSafetyMode,
    field_expr: NodeId,
    field_name: &str,
) -> Option<NodeId> {
    match mode {
        NilSafetyMode::Off => None,
        NilSafetyMode::On => Some(build_guard(ctx.ast, field_expr, field_name, None)),
        NilSafetyMode::Debug => {
            if ctx.take_debug_var_flag() {
                let debug_var = build_debug_var(ctx.ast);
                ctx.queue_decl(DeclOrder::Helper, debug_var);
            }
            let debug_flag = b::ident(ctx.ast, "dingoDebug");
            Some(build_guard(ctx.ast, field_expr, field_name, Some(debug_flag)))
        }
    }
}

fn build_guard(
    ast: &mut dingo_goast::Ast,
    field_expr: NodeId,
    field_name: &str,
    gate: Option<NodeId>,
) -> NodeId {
    let nil = b::nil_lit(ast);
    let is_nil = b::binary(ast, "==", field_expr, nil);
    let cond = match gate {
        Some(gate) => b::binary(ast, "&&", gate, is_nil),
        None => is_nil,
    };
    let msg = b::string_lit(ast, &format!("dingo: nil field access: {}", field_name));
    let panic_ident = b::ident(ast, "panic");
    let panic_call = b::call(ast, panic_ident, vec![msg]);
    let panic_stmt = b::expr_stmt(ast, panic_call);
    let then_block = b::block(ast, vec![panic_stmt]);
    b::if_stmt(ast, cond, then_block)
}

fn build_debug_var(ast: &mut dingo_goast::Ast) -> NodeId {
    let getenv_pkg = b::ident(ast, "os");
    let getenv = b::selector(ast, getenv_pkg, "Getenv");
    let arg = b::string_lit(ast, "DINGO_DEBUG");
    let call = b::call(ast, getenv, vec![arg]);
    let empty = b::string_lit(ast, "");
    let neq = b::binary(ast, "!=", call, empty);
    b::var_decl(ast, "dingoDebug", None, Some(neq))
}

/// Builds the missing-combination error for a tuple-scrutinee match, given
/// the per-position enum definitions and the covered pattern rows.
pub fn check_tuple_exhaustiveness(
    ctx: &mut TransformContext,
    position_enums: &[&EnumDef],
    rows: &[Vec<String>],
    at: dingo_goast::Position,
) {
    let missing = missing_tuple_patterns(position_enums, rows);
    if !missing.is_empty() {
        let rendered = missing
            .iter()
            .map(|row| format!("({})", row.join(", ")))
            .collect();
        ctx.push_error(
            TransformError::new(TransformErrorKind::NonExhaustiveMatch(rendered)).at(at),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dingo_goast::parse;
    use dingo_goast::printer::print;

    fn option_enum() -> EnumDef {
        EnumDef {
            name: "Option".to_string(),
            variants: vec![
                Variant {
                    name: "Some".into(),
                    kind: VariantKind::Tuple(vec![TypeExpr::Named("int".to_string())]),
                },
                Variant {
                    name: "None".into(),
                    kind: VariantKind::Unit,
                },
            ],
            decl_node: NodeId(0),
        }
    }

    #[test]
    fn synthesizes_tag_struct_and_helpers() {
        let mut ast = parse("package main\n").unwrap();
        let def = option_enum();
        let mut ctx = TransformContext::new(&mut ast, None);
        synthesize_enum(&mut ctx, &def);
        ctx.flush_pending_decls();
        let out = print(&ast);
        assert!(out.contains("type OptionTag int"));
        assert!(out.contains("OptionTagSome OptionTag = 0"));
        assert!(out.contains("type Option struct"));
        assert!(out.contains("func Option_Some(v0 int) Option"));
        assert!(out.contains("func (v Option) IsSome() bool"));
        assert!(out.contains("func (v Option) Unwrap() int"));
        assert!(out.contains("return *v.Some_0"));
    }

    #[test]
    fn synthesizes_a_per_type_option_instantiation_sharing_the_builtin_tag() {
        let mut ast = parse("package main\n").unwrap();
        let def = EnumDef {
            name: "Option_User".to_string(),
            variants: vec![
                Variant {
                    name: "Some".into(),
                    kind: VariantKind::Tuple(vec![TypeExpr::Named("User".to_string())]),
                },
                Variant {
                    name: "None".into(),
                    kind: VariantKind::Unit,
                },
            ],
            decl_node: NodeId(0),
        };
        let mut ctx = TransformContext::new(&mut ast, None);
        synthesize_instantiation(&mut ctx, &def);
        ctx.flush_pending_decls();
        let out = print(&ast);
        assert!(out.contains("type Option_User struct"));
        assert!(out.contains("tag OptionTag"));
        assert!(!out.contains("Option_UserTag"));
        assert!(out.contains("func Option_User_Some(v0 User) Option_User"));
        assert!(out.contains("func Option_User_None() Option_User"));
        assert!(out.contains("func (v Option_User) IsSome() bool"));
        assert!(out.contains("func (v Option_User) Unwrap() User"));
    }

    #[test]
    fn lower_match_injects_destructure_and_flags_non_exhaustive() {
        let src = concat!(
            "package main\n",
            "func f() {\n",
            "switch __match_1.tag {\n",
            "// DINGO_PATTERN: Some(x)\n",
            "case OptionTagSome:\n",
            "use(x)\n",
            "}\n",
            "}\n",
        );
        let mut ast = parse(src).unwrap();
        let def = option_enum();
        let mut registry = SumTypeRegistry::default();
        registry.insert(def);

        let switch_id = find_switch(&ast);
        let mut ctx = TransformContext::new(&mut ast, None);
        lower_match(
            &mut ctx,
            &registry,
            switch_id,
            "__match_1",
            "Option",
            NilSafetyMode::Off,
        );
        assert!(ctx
            .errors
            .iter()
            .any(|e| matches!(e.kind, TransformErrorKind::NonExhaustiveMatch(_))));
        let out = print(&ast);
        assert!(out.contains("x := *__match_1.Some_0"));
    }

    fn find_switch(ast: &dingo_goast::Ast) -> NodeId {
        for i in 0..ast.node_count() {
            let id = NodeId(i as u32);
            if matches!(ast.get(id), NodeData::SwitchStmt { .. }) {
                return id;
            }
        }
        panic!("no switch found");
    }
}
