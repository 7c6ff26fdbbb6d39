//! Arena-backed AST for the Go-subset grammar.
//!
//! Nodes live in a flat `Vec` indexed by [`NodeId`] rather than behind
//! `Box`/`Rc`, so the parent map the plugin engine needs is a second
//! parallel `Vec<Option<NodeId>>` built in one pass, giving `O(1)` parent
//! lookup without threading a visitor stack through every pass.

use crate::position::Position;
use fnv::FnvHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub path: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

/// Target-language type syntax. Values of this type also populate
/// `TypeInfo`, standing in for a host type-checker's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array(usize, Box<TypeExpr>),
    MapType(Box<TypeExpr>, Box<TypeExpr>),
    Chan(Box<TypeExpr>),
    Interface,
    Any,
    Struct(Vec<Field>),
    Func(Vec<TypeExpr>, Vec<TypeExpr>),
    /// The `__INFER__` placeholder pseudo-type, resolved by a later pass.
    Infer,
}

impl TypeExpr {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeExpr::Named(n)
                if matches!(
                    n.as_str(),
                    "int" | "int8" | "int16" | "int32" | "int64"
                        | "uint" | "uint8" | "uint16" | "uint32" | "uint64"
                        | "float32" | "float64" | "byte" | "rune"
                )
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypeExpr::Named(n) if n == "string")
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, TypeExpr::Named(n) if n == "bool")
    }

    /// Zero-value literal text for this type, used when synthesizing an
    /// early-return value for an error-propagation point.
    pub fn zero_value(&self) -> String {
        match self {
            TypeExpr::Named(n) if self.is_numeric() => {
                let _ = n;
                "0".to_string()
            }
            TypeExpr::Named(n) if n == "string" => "\"\"".to_string(),
            TypeExpr::Named(n) if n == "bool" => "false".to_string(),
            TypeExpr::Pointer(_)
            | TypeExpr::Slice(_)
            | TypeExpr::MapType(_, _)
            | TypeExpr::Chan(_)
            | TypeExpr::Interface
            | TypeExpr::Any
            | TypeExpr::Func(_, _) => "nil".to_string(),
            TypeExpr::Named(n) if n.len() == 1 && n.chars().all(|c| c.is_ascii_uppercase()) => {
                "nil".to_string()
            }
            TypeExpr::Array(n, elem) => format!("[{}]{}{{}}", n, render_type(elem)),
            TypeExpr::Named(n) => format!("{}{{}}", n),
            TypeExpr::Struct(_) => "nil".to_string(),
            TypeExpr::Infer => "nil".to_string(),
        }
    }
}

/// Renders a `TypeExpr` back to Go-subset source syntax. Exposed for the
/// zero-value formatter above and reused by the pretty-printer.
pub fn render_type(ty: &TypeExpr) -> String {
    match ty {
        TypeExpr::Named(n) => n.clone(),
        TypeExpr::Pointer(inner) => format!("*{}", render_type(inner)),
        TypeExpr::Slice(inner) => format!("[]{}", render_type(inner)),
        TypeExpr::Array(n, inner) => format!("[{}]{}", n, render_type(inner)),
        TypeExpr::MapType(k, v) => format!("map[{}]{}", render_type(k), render_type(v)),
        TypeExpr::Chan(inner) => format!("chan {}", render_type(inner)),
        TypeExpr::Interface => "interface{}".to_string(),
        TypeExpr::Any => "any".to_string(),
        TypeExpr::Struct(fields) => {
            let body = fields
                .iter()
                .map(|f| match &f.name {
                    Some(name) => format!("{} {}", name, render_type(&f.ty)),
                    None => render_type(&f.ty),
                })
                .collect::<Vec<_>>()
                .join("; ");
            format!("struct {{ {} }}", body)
        }
        TypeExpr::Func(params, results) => {
            let p = params.iter().map(render_type).collect::<Vec<_>>().join(", ");
            let r = results.iter().map(render_type).collect::<Vec<_>>().join(", ");
            if results.is_empty() {
                format!("func({})", p)
            } else {
                format!("func({}) ({})", p, r)
            }
        }
        TypeExpr::Infer => "__INFER__".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    pub values: Vec<NodeId>,
    pub is_default: bool,
    pub body: Vec<NodeId>,
    pub leading_comments: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    String,
    Bool,
    Nil,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    File {
        package: String,
        imports: Vec<ImportSpec>,
        decls: Vec<NodeId>,
    },
    FuncDecl {
        name: String,
        receiver: Option<Receiver>,
        params: Vec<Field>,
        results: Vec<Field>,
        body: NodeId,
    },
    TypeDecl {
        name: String,
        ty: TypeExpr,
    },
    VarDecl {
        names: Vec<String>,
        ty: Option<TypeExpr>,
        values: Vec<NodeId>,
        is_const: bool,
    },
    Block {
        stmts: Vec<NodeId>,
    },
    ExprStmt {
        expr: NodeId,
    },
    AssignStmt {
        lhs: Vec<NodeId>,
        define: bool,
        rhs: Vec<NodeId>,
    },
    ReturnStmt {
        results: Vec<NodeId>,
    },
    IfStmt {
        cond: NodeId,
        then_block: NodeId,
        else_block: Option<NodeId>,
    },
    SwitchStmt {
        tag: Option<NodeId>,
        cases: Vec<CaseClause>,
    },
    Ident {
        name: String,
    },
    BasicLit {
        kind: LitKind,
        value: String,
    },
    CallExpr {
        func: NodeId,
        args: Vec<NodeId>,
    },
    SelectorExpr {
        expr: NodeId,
        field: String,
    },
    IndexExpr {
        expr: NodeId,
        index: NodeId,
    },
    BinaryExpr {
        op: String,
        x: NodeId,
        y: NodeId,
    },
    UnaryExpr {
        op: String,
        x: NodeId,
    },
    ParenExpr {
        x: NodeId,
    },
    CompositeLit {
        ty: Option<TypeExpr>,
        elements: Vec<(Option<String>, NodeId)>,
    },
    FuncLit {
        params: Vec<Field>,
        results: Vec<Field>,
        body: NodeId,
    },
}

/// An arena of AST nodes for one file, plus position and comment tables.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<NodeData>,
    positions: Vec<Position>,
    /// Comments lexically preceding a node, attached at parse time.
    leading_comments: Vec<Vec<String>>,
    parent: Vec<Option<NodeId>>,
    pub root: NodeId,
}

impl Ast {
    pub fn builder() -> AstBuilder {
        AstBuilder::default()
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0 as usize]
    }

    pub fn position(&self, id: NodeId) -> Position {
        self.positions[id.0 as usize]
    }

    pub fn leading_comments(&self, id: NodeId) -> &[String] {
        &self.leading_comments[id.0 as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up a node's parent in the map built by one whole-tree walk.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent[id.0 as usize]
    }

    /// Walks the ancestor chain of `id`, calling `visit` on each parent from
    /// nearest to root.
    pub fn walk_parents(&self, id: NodeId, mut visit: impl FnMut(NodeId)) {
        let mut current = self.parent(id);
        while let Some(p) = current {
            visit(p);
            current = self.parent(p);
        }
    }

    /// Allocates a brand-new node into the arena, e.g. a tag type or union
    /// struct a plugin synthesizes. The new node starts parentless; call
    /// [`Ast::rebuild_parent_map`] once a plugin pass finishes wiring it
    /// into the tree.
    pub fn alloc(&mut self, data: NodeData, pos: Position, comments: Vec<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        self.positions.push(pos);
        self.leading_comments.push(comments);
        self.parent.push(None);
        id
    }

    /// Replaces the payload of an existing node in place, preserving its
    /// identity (and hence anything that already points at it by `NodeId`).
    pub fn set(&mut self, id: NodeId, data: NodeData) {
        self.nodes[id.0 as usize] = data;
    }

    /// Splices plugin-synthesized declarations into the file's top-level
    /// declaration list.
    pub fn insert_decls(&mut self, at_front: Vec<NodeId>, at_back: Vec<NodeId>) {
        if let NodeData::File { decls, .. } = &mut self.nodes[self.root.0 as usize] {
            let mut new_decls = at_front;
            new_decls.extend(decls.iter().copied());
            new_decls.extend(at_back);
            *decls = new_decls;
        }
    }

    /// Recomputes the parent map after a plugin pass has mutated the tree.
    pub fn rebuild_parent_map(&mut self) {
        let mut parent = vec![None; self.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            for child in self.children(id) {
                if (child.0 as usize) < parent.len() {
                    parent[child.0 as usize] = Some(id);
                }
                stack.push(child);
            }
        }
        self.parent = parent;
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.get(id) {
            NodeData::File { decls, .. } => decls.clone(),
            NodeData::FuncDecl { body, .. } => vec![*body],
            NodeData::TypeDecl { .. } => vec![],
            NodeData::VarDecl { values, .. } => values.clone(),
            NodeData::Block { stmts } => stmts.clone(),
            NodeData::ExprStmt { expr } => vec![*expr],
            NodeData::AssignStmt { lhs, rhs, .. } => {
                let mut v = lhs.clone();
                v.extend(rhs.clone());
                v
            }
            NodeData::ReturnStmt { results } => results.clone(),
            NodeData::IfStmt {
                cond,
                then_block,
                else_block,
            } => {
                let mut v = vec![*cond, *then_block];
                if let Some(e) = else_block {
                    v.push(*e);
                }
                v
            }
            NodeData::SwitchStmt { tag, cases } => {
                let mut v = Vec::new();
                if let Some(t) = tag {
                    v.push(*t);
                }
                for case in cases {
                    v.extend(case.values.clone());
                    v.extend(case.body.clone());
                }
                v
            }
            NodeData::Ident { .. } | NodeData::BasicLit { .. } => vec![],
            NodeData::CallExpr { func, args } => {
                let mut v = vec![*func];
                v.extend(args.clone());
                v
            }
            NodeData::SelectorExpr { expr, .. } => vec![*expr],
            NodeData::IndexExpr { expr, index } => vec![*expr, *index],
            NodeData::BinaryExpr { x, y, .. } => vec![*x, *y],
            NodeData::UnaryExpr { x, .. } => vec![*x],
            NodeData::ParenExpr { x } => vec![*x],
            NodeData::CompositeLit { elements, .. } => {
                elements.iter().map(|(_, v)| *v).collect()
            }
            NodeData::FuncLit { body, .. } => vec![*body],
        }
    }
}

#[derive(Default)]
pub struct AstBuilder {
    nodes: Vec<NodeData>,
    positions: Vec<Position>,
    leading_comments: Vec<Vec<String>>,
}

impl AstBuilder {
    pub fn push(&mut self, data: NodeData, pos: Position, comments: Vec<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        self.positions.push(pos);
        self.leading_comments.push(comments);
        id
    }

    pub fn finish(self, root: NodeId) -> Ast {
        let mut parent = vec![None; self.nodes.len()];
        // Two-pass: build a throwaway Ast to reuse `children()`, then fill
        // the parent table by walking from the root.
        let ast = Ast {
            nodes: self.nodes,
            positions: self.positions,
            leading_comments: self.leading_comments,
            parent: vec![None; parent.len()],
            root,
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in ast.children(id) {
                parent[child.0 as usize] = Some(id);
                stack.push(child);
            }
        }
        Ast { parent, ..ast }
    }
}

/// Per-package set of locally defined symbol names, consulted before
/// rewriting an unqualified call as a standard-library reference.
#[derive(Debug, Clone, Default)]
pub struct FunctionExclusionCache {
    names: FnvHashMap<String, ()>,
}

impl FunctionExclusionCache {
    pub fn from_ast(ast: &Ast) -> Self {
        let mut names = FnvHashMap::default();
        if let NodeData::File { decls, .. } = ast.get(ast.root) {
            for decl in decls {
                if let NodeData::FuncDecl { name, receiver, .. } = ast.get(*decl) {
                    if receiver.is_none() {
                        names.insert(name.clone(), ());
                    }
                }
            }
        }
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into(), ());
    }
}
