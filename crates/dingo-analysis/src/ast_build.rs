//! Small helpers for allocating synthetic (plugin-generated) nodes. These
//! nodes have no original-source counterpart, so they use a zero position:
//! declarations a plugin inserts purely at the AST level never need an
//! entry in the source map.

use dingo_goast::ast::{CaseClause, Field, LitKind, NodeData, TypeExpr};
use dingo_goast::{Ast, NodeId, Position};

fn zero() -> Position {
    Position::new(0, 0)
}

pub fn ident(ast: &mut Ast, name: &str) -> NodeId {
    ast.alloc(
        NodeData::Ident {
            name: name.to_string(),
        },
        zero(),
        Vec::new(),
    )
}

pub fn int_lit(ast: &mut Ast, value: i64) -> NodeId {
    ast.alloc(
        NodeData::BasicLit {
            kind: LitKind::Int,
            value: value.to_string(),
        },
        zero(),
        Vec::new(),
    )
}

pub fn string_lit(ast: &mut Ast, value: &str) -> NodeId {
    ast.alloc(
        NodeData::BasicLit {
            kind: LitKind::String,
            value: value.to_string(),
        },
        zero(),
        Vec::new(),
    )
}

pub fn nil_lit(ast: &mut Ast) -> NodeId {
    ast.alloc(
        NodeData::BasicLit {
            kind: LitKind::Nil,
            value: "nil".to_string(),
        },
        zero(),
        Vec::new(),
    )
}

pub fn selector(ast: &mut Ast, expr: NodeId, field: &str) -> NodeId {
    ast.alloc(
        NodeData::SelectorExpr {
            expr,
            field: field.to_string(),
        },
        zero(),
        Vec::new(),
    )
}

pub fn call(ast: &mut Ast, func: NodeId, args: Vec<NodeId>) -> NodeId {
    ast.alloc(NodeData::CallExpr { func, args }, zero(), Vec::new())
}

pub fn unary(ast: &mut Ast, op: &str, x: NodeId) -> NodeId {
    ast.alloc(
        NodeData::UnaryExpr {
            op: op.to_string(),
            x,
        },
        zero(),
        Vec::new(),
    )
}

pub fn binary(ast: &mut Ast, op: &str, x: NodeId, y: NodeId) -> NodeId {
    ast.alloc(
        NodeData::BinaryExpr {
            op: op.to_string(),
            x,
            y,
        },
        zero(),
        Vec::new(),
    )
}

pub fn composite(ast: &mut Ast, ty: TypeExpr, elements: Vec<(Option<String>, NodeId)>) -> NodeId {
    ast.alloc(
        NodeData::CompositeLit {
            ty: Some(ty),
            elements,
        },
        zero(),
        Vec::new(),
    )
}

pub fn block(ast: &mut Ast, stmts: Vec<NodeId>) -> NodeId {
    ast.alloc(NodeData::Block { stmts }, zero(), Vec::new())
}

pub fn return_stmt(ast: &mut Ast, results: Vec<NodeId>) -> NodeId {
    ast.alloc(NodeData::ReturnStmt { results }, zero(), Vec::new())
}

pub fn expr_stmt(ast: &mut Ast, expr: NodeId) -> NodeId {
    ast.alloc(NodeData::ExprStmt { expr }, zero(), Vec::new())
}

pub fn assign(ast: &mut Ast, lhs: Vec<NodeId>, define: bool, rhs: Vec<NodeId>) -> NodeId {
    ast.alloc(
        NodeData::AssignStmt { lhs, define, rhs },
        zero(),
        Vec::new(),
    )
}

pub fn if_stmt(ast: &mut Ast, cond: NodeId, then_block: NodeId) -> NodeId {
    ast.alloc(
        NodeData::IfStmt {
            cond,
            then_block,
            else_block: None,
        },
        zero(),
        Vec::new(),
    )
}

#[allow(clippy::too_many_arguments)]
pub fn func_decl(
    ast: &mut Ast,
    name: &str,
    receiver: Option<dingo_goast::ast::Receiver>,
    params: Vec<Field>,
    results: Vec<Field>,
    body: NodeId,
) -> NodeId {
    ast.alloc(
        NodeData::FuncDecl {
            name: name.to_string(),
            receiver,
            params,
            results,
            body,
        },
        zero(),
        Vec::new(),
    )
}

pub fn type_decl(ast: &mut Ast, name: &str, ty: TypeExpr) -> NodeId {
    ast.alloc(
        NodeData::TypeDecl {
            name: name.to_string(),
            ty,
        },
        zero(),
        Vec::new(),
    )
}

pub fn const_decl(ast: &mut Ast, name: &str, ty: Option<TypeExpr>, value: NodeId) -> NodeId {
    ast.alloc(
        NodeData::VarDecl {
            names: vec![name.to_string()],
            ty,
            values: vec![value],
            is_const: true,
        },
        zero(),
        Vec::new(),
    )
}

pub fn var_decl(ast: &mut Ast, name: &str, ty: Option<TypeExpr>, value: Option<NodeId>) -> NodeId {
    ast.alloc(
        NodeData::VarDecl {
            names: vec![name.to_string()],
            ty,
            values: value.into_iter().collect(),
            is_const: false,
        },
        zero(),
        Vec::new(),
    )
}

pub fn with_comments(ast: &mut Ast, id: NodeId, _comments: Vec<String>) -> NodeId {
    // Leading comments are assigned at allocation time; this helper exists
    // so callers that build a node before knowing its comments can signal
    // intent. Currently a no-op passthrough kept for call-site clarity.
    id
}

pub fn case_clause(
    values: Vec<NodeId>,
    is_default: bool,
    body: Vec<NodeId>,
    leading_comments: Vec<String>,
) -> CaseClause {
    CaseClause {
        values,
        is_default,
        body,
        leading_comments,
    }
}
