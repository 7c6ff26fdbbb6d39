//! Sum-type lowering: discovery, synthesis and match-rewriting for
//! declared enums, wired together behind a single entry point.

pub mod exhaustive;
pub mod lowering;
pub mod monomorphize;
pub mod registry;

use crate::context::TransformContext;
use dingo_annotations::NilSafetyMode;
use dingo_goast::ast::NodeData;
use dingo_goast::NodeId;
use registry::SumTypeRegistry;

/// Runs the full sum-type pass over one file: discovers every declared
/// enum, synthesizes its tag/union/constructor/helper declarations,
/// synthesizes every `Option_<T>`/`Result_<T>_<E>` instantiation the file
/// references by name, then rewrites every tag-switch the preprocessor
/// chain produced.
pub fn run(ctx: &mut TransformContext, nil_safety: NilSafetyMode) -> SumTypeRegistry {
    let mut registry = SumTypeRegistry::discover(ctx.ast);
    let defs: Vec<registry::EnumDef> = registry.iter().cloned().collect();
    for def in &defs {
        lowering::synthesize_enum(ctx, def);
    }
    monomorphize::run(ctx, &mut registry);
    for (switch_id, scrutinee, enum_name) in find_tag_switches(ctx.ast, &registry) {
        lowering::lower_match(ctx, &registry, switch_id, &scrutinee, &enum_name, nil_safety);
    }
    registry
}

/// Finds every `switch <scrutinee>.tag { ... }` the text-level pattern-match
/// processor emitted, pairing each with the enum its scrutinee carries. The
/// enum is recovered by matching a case's tag constant against the fixed
/// `<Variant><Enum>Tag`-style name every declared enum's variants produce.
fn find_tag_switches(
    ast: &dingo_goast::Ast,
    registry: &SumTypeRegistry,
) -> Vec<(NodeId, String, String)> {
    let mut found = Vec::new();
    for i in 0..ast.node_count() {
        let id = NodeId(i as u32);
        let NodeData::SwitchStmt { tag: Some(tag), .. } = ast.get(id) else {
            continue;
        };
        let NodeData::SelectorExpr { expr, field } = ast.get(*tag) else {
            continue;
        };
        if field != "tag" {
            continue;
        }
        let NodeData::Ident { name: scrutinee } = ast.get(*expr) else {
            continue;
        };
        let Some(enum_name) = enum_for_switch(ast, id, registry) else {
            continue;
        };
        found.push((id, scrutinee.clone(), enum_name));
    }
    found
}

fn enum_for_switch(
    ast: &dingo_goast::Ast,
    switch_id: NodeId,
    registry: &SumTypeRegistry,
) -> Option<String> {
    let NodeData::SwitchStmt { cases, .. } = ast.get(switch_id) else {
        return None;
    };
    for case in cases {
        for value in &case.values {
            let NodeData::Ident { name } = ast.get(*value) else {
                continue;
            };
            for candidate in registry.names() {
                if let Some(def) = registry.get(candidate) {
                    if def.variants.iter().any(|v| &v.tag_name(candidate) == name) {
                        return Some(candidate.to_string());
                    }
                }
            }
        }
    }
    None
}
