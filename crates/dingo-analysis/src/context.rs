//! `TransformContext`: the per-file bag of state shared among plugins.

use dingo_goast::{Ast, NodeId, Position, TypeInfo};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformErrorKind {
    #[error("non-exhaustive match, missing: {0:?}")]
    NonExhaustiveMatch(Vec<String>),
    #[error("pattern type mismatch: {0}")]
    PatternTypeMismatch(String),
    #[error("wildcard used in binding position")]
    WildcardInBindingPosition,
    #[error("guard is not a valid boolean expression: {0}")]
    InvalidGuard(String),
    #[error("safe-navigation chain type could not be inferred")]
    UnresolvedSafeNav,
    #[error("null-coalesce operand type mismatch: {0}")]
    NullCoalesceMismatch(String),
    #[error("ambiguous stdlib call '{name}': candidates {candidates:?}")]
    AmbiguousCall {
        name: String,
        candidates: Vec<String>,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformError {
    pub kind: TransformErrorKind,
    pub position: Option<Position>,
}

impl TransformError {
    pub fn new(kind: TransformErrorKind) -> Self {
        Self {
            kind,
            position: None,
        }
    }

    pub fn at(mut self, pos: Position) -> Self {
        self.position = Some(pos);
        self
    }
}

/// A declaration a plugin wants inserted at package scope, ordered so tag
/// types precede union structs precede constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeclOrder {
    TagType,
    UnionStruct,
    Constructor,
    Helper,
}

pub struct PendingDecl {
    pub order: DeclOrder,
    pub node: NodeId,
}

/// Per-file state shared among all AST-level plugins.
pub struct TransformContext<'a> {
    pub ast: &'a mut Ast,
    pub type_info: Option<&'a TypeInfo>,
    temp_counters: HashMap<NodeId, u32>,
    pub errors: Vec<TransformError>,
    pending_decls: Vec<PendingDecl>,
    debug_var_emitted: bool,
}

impl<'a> TransformContext<'a> {
    pub fn new(ast: &'a mut Ast, type_info: Option<&'a TypeInfo>) -> Self {
        Self {
            ast,
            type_info,
            temp_counters: HashMap::new(),
            errors: Vec::new(),
            pending_decls: Vec::new(),
            debug_var_emitted: false,
        }
    }

    /// Next temp name for expansions scoped to `function`, following the
    /// "no-number-first" rule: `tmp`, then `tmp1`, `tmp2`, ... Counters
    /// reset at every function boundary.
    pub fn next_temp(&mut self, function: NodeId) -> String {
        let counter = self.temp_counters.entry(function).or_insert(0);
        let name = if *counter == 0 {
            "tmp".to_string()
        } else {
            format!("tmp{}", counter)
        };
        *counter += 1;
        name
    }

    pub fn push_error(&mut self, error: TransformError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn queue_decl(&mut self, order: DeclOrder, node: NodeId) {
        self.pending_decls.push(PendingDecl { order, node });
    }

    /// Tracks the one-shot flag gating the nil-safety `dingoDebug` variable
    /// so it is emitted at most once per file.
    pub fn take_debug_var_flag(&mut self) -> bool {
        if self.debug_var_emitted {
            false
        } else {
            self.debug_var_emitted = true;
            true
        }
    }

    /// Drains and sorts the pending declaration queue (tag types, then
    /// union structs, then constructors/helpers), then splices them at the
    /// front of the file.
    pub fn flush_pending_decls(self) {
        let TransformContext {
            ast,
            mut pending_decls,
            ..
        } = self;
        pending_decls.sort_by_key(|d| d.order);
        let nodes: Vec<NodeId> = pending_decls.into_iter().map(|d| d.node).collect();
        ast.insert_decls(nodes, Vec::new());
        ast.rebuild_parent_map();
    }
}
