//! Stand-in for a host type-checker's type table: a map from expression
//! nodes to inferred types, which may be partial or absent.

use crate::ast::{Ast, LitKind, NodeData, NodeId, TypeExpr};
use std::collections::HashMap;

/// Maps expression nodes to their inferred [`TypeExpr`]. Absence of an
/// entry is tolerated everywhere it is consulted.
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    types: HashMap<NodeId, TypeExpr>,
}

impl TypeInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: NodeId, ty: TypeExpr) {
        self.types.insert(id, ty);
    }

    pub fn get(&self, id: NodeId) -> Option<&TypeExpr> {
        self.types.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Minimal type inference: walks every node and records the obvious type of
/// a basic literal. This is the partial information a real host
/// type-checker would contribute for free; plugins that need more (a
/// variable's declared type, a call's return type) fall back to their own
/// heuristics when a node has no entry here.
pub fn infer_basic(ast: &Ast) -> TypeInfo {
    let mut info = TypeInfo::new();
    for i in 0..ast.node_count() {
        let id = NodeId(i as u32);
        if let NodeData::BasicLit { kind, .. } = ast.get(id) {
            let ty = match kind {
                LitKind::Int => TypeExpr::Named("int".to_string()),
                LitKind::Float => TypeExpr::Named("float64".to_string()),
                LitKind::String => TypeExpr::Named("string".to_string()),
                LitKind::Bool => TypeExpr::Named("bool".to_string()),
                LitKind::Nil => TypeExpr::Any,
            };
            info.set(id, ty);
        }
    }
    info
}

/// Recognizes an `Option_T`/`Result_T_E`-shaped named struct by its
/// canonical name prefix: a named struct whose underlying type carries a
/// `tag` field of named type `OptionTag` is an `Option`, distinguished
/// from `Result`, which uses `ResultTag`.
pub fn option_inner_type(named: &str) -> Option<String> {
    named.strip_prefix("Option_").map(|s| s.to_string())
}

pub fn result_inner_types(named: &str) -> Option<(String, String)> {
    let rest = named.strip_prefix("Result_")?;
    let (t, e) = rest.split_once('_')?;
    Some((t.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn infers_int_and_string_literals() {
        let ast = parse("package main\nfunc f() {\nx := 10\ny := \"hi\"\nuse(x, y)\n}\n").unwrap();
        let info = infer_basic(&ast);
        let kinds: Vec<&TypeExpr> = (0..ast.node_count())
            .map(|i| NodeId(i as u32))
            .filter_map(|id| info.get(id))
            .collect();
        assert!(kinds.contains(&&TypeExpr::Named("int".to_string())));
        assert!(kinds.contains(&&TypeExpr::Named("string".to_string())));
    }

    #[test]
    fn recognizes_option_type_name() {
        assert_eq!(option_inner_type("Option_string"), Some("string".to_string()));
        assert_eq!(option_inner_type("Result_int_error"), None);
    }

    #[test]
    fn recognizes_result_type_name() {
        assert_eq!(
            result_inner_types("Result_int_error"),
            Some(("int".to_string(), "error".to_string()))
        );
    }
}
