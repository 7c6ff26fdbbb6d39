//! Pretty-printer. Walks the arena and emits Go-subset source text,
//! preserving every node's leading comments verbatim so marker comments
//! injected by earlier passes survive to the final output.

use crate::ast::{render_type, Ast, Field, NodeData, NodeId};

pub fn print(ast: &Ast) -> String {
    let mut out = String::new();
    print_file(ast, ast.root, &mut out);
    out
}

fn print_file(ast: &Ast, id: NodeId, out: &mut String) {
    let NodeData::File {
        package,
        imports,
        decls,
    } = ast.get(id)
    else {
        panic!("root is not a File node")
    };
    out.push_str(&format!("package {}\n\n", package));
    if !imports.is_empty() {
        if imports.len() == 1 {
            out.push_str(&format!("import \"{}\"\n\n", imports[0].path));
        } else {
            out.push_str("import (\n");
            for spec in imports {
                match &spec.alias {
                    Some(alias) => out.push_str(&format!("\t{} \"{}\"\n", alias, spec.path)),
                    None => out.push_str(&format!("\t\"{}\"\n", spec.path)),
                }
            }
            out.push_str(")\n\n");
        }
    }
    for decl in decls {
        print_comments(ast, *decl, out, "");
        print_decl(ast, *decl, out);
        out.push('\n');
    }
}

fn print_comments(ast: &Ast, id: NodeId, out: &mut String, indent: &str) {
    for comment in ast.leading_comments(id) {
        out.push_str(indent);
        out.push_str(comment);
        out.push('\n');
    }
}

fn print_decl(ast: &Ast, id: NodeId, out: &mut String) {
    match ast.get(id) {
        NodeData::FuncDecl {
            name,
            receiver,
            params,
            results,
            body,
        } => {
            out.push_str("func ");
            if let Some(r) = receiver {
                out.push_str(&format!("({} {}) ", r.name, r.type_name));
            }
            out.push_str(name);
            out.push('(');
            out.push_str(&fields_str(params));
            out.push(')');
            if !results.is_empty() {
                out.push(' ');
                out.push_str(&results_str(results));
            }
            out.push(' ');
            print_block(ast, *body, out, "");
            out.push('\n');
        }
        NodeData::TypeDecl { name, ty } => {
            out.push_str(&format!("type {} {}\n", name, render_type(ty)));
        }
        NodeData::VarDecl {
            names,
            ty,
            values,
            is_const,
        } => {
            let kw = if *is_const { "const" } else { "var" };
            out.push_str(kw);
            out.push(' ');
            out.push_str(&names.join(", "));
            if let Some(t) = ty {
                out.push(' ');
                out.push_str(&render_type(t));
            }
            if !values.is_empty() {
                out.push_str(" = ");
                out.push_str(
                    &values
                        .iter()
                        .map(|v| print_expr(ast, *v))
                        .collect::<Vec<_>>()
                        .join(", "),
                );
            }
            out.push('\n');
        }
        _ => unreachable!("not a top-level decl"),
    }
}

fn fields_str(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| match &f.name {
            Some(n) => format!("{} {}", n, render_type(&f.ty)),
            None => render_type(&f.ty),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn results_str(results: &[Field]) -> String {
    if results.len() == 1 && results[0].name.is_none() {
        render_type(&results[0].ty)
    } else {
        format!("({})", fields_str(results))
    }
}

fn print_block(ast: &Ast, id: NodeId, out: &mut String, indent: &str) {
    let NodeData::Block { stmts } = ast.get(id) else {
        panic!("expected block")
    };
    out.push_str("{\n");
    let inner = format!("{}\t", indent);
    for stmt in stmts {
        print_comments(ast, *stmt, out, &inner);
        out.push_str(&inner);
        print_stmt(ast, *stmt, out, &inner);
        out.push('\n');
    }
    out.push_str(indent);
    out.push('}');
}

fn print_stmt(ast: &Ast, id: NodeId, out: &mut String, indent: &str) {
    match ast.get(id) {
        NodeData::ExprStmt { expr } => out.push_str(&print_expr(ast, *expr)),
        NodeData::AssignStmt { lhs, define, rhs } => {
            out.push_str(
                &lhs.iter()
                    .map(|e| print_expr(ast, *e))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            out.push_str(if *define { " := " } else { " = " });
            out.push_str(
                &rhs.iter()
                    .map(|e| print_expr(ast, *e))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        NodeData::VarDecl {
            names,
            ty,
            values,
            is_const,
        } => {
            let kw = if *is_const { "const" } else { "var" };
            out.push_str(kw);
            out.push(' ');
            out.push_str(&names.join(", "));
            if let Some(t) = ty {
                out.push(' ');
                out.push_str(&render_type(t));
            }
            if !values.is_empty() {
                out.push_str(" = ");
                out.push_str(
                    &values
                        .iter()
                        .map(|v| print_expr(ast, *v))
                        .collect::<Vec<_>>()
                        .join(", "),
                );
            }
        }
        NodeData::ReturnStmt { results } => {
            out.push_str("return");
            if !results.is_empty() {
                out.push(' ');
                out.push_str(
                    &results
                        .iter()
                        .map(|e| print_expr(ast, *e))
                        .collect::<Vec<_>>()
                        .join(", "),
                );
            }
        }
        NodeData::IfStmt {
            cond,
            then_block,
            else_block,
        } => {
            out.push_str("if ");
            out.push_str(&print_expr(ast, *cond));
            out.push(' ');
            print_block(ast, *then_block, out, indent);
            if let Some(e) = else_block {
                out.push_str(" else ");
                match ast.get(*e) {
                    NodeData::IfStmt { .. } => print_stmt(ast, *e, out, indent),
                    _ => print_block(ast, *e, out, indent),
                }
            }
        }
        NodeData::SwitchStmt { tag, cases } => {
            out.push_str("switch ");
            if let Some(t) = tag {
                out.push_str(&print_expr(ast, *t));
                out.push(' ');
            }
            out.push_str("{\n");
            for case in cases {
                for comment in &case.leading_comments {
                    out.push_str(indent);
                    out.push_str(comment);
                    out.push('\n');
                }
                out.push_str(indent);
                if case.is_default {
                    out.push_str("default:\n");
                } else {
                    out.push_str("case ");
                    out.push_str(
                        &case
                            .values
                            .iter()
                            .map(|v| print_expr(ast, *v))
                            .collect::<Vec<_>>()
                            .join(", "),
                    );
                    out.push_str(":\n");
                }
                let inner = format!("{}\t", indent);
                for stmt in &case.body {
                    print_comments(ast, *stmt, out, &inner);
                    out.push_str(&inner);
                    print_stmt(ast, *stmt, out, &inner);
                    out.push('\n');
                }
            }
            out.push_str(indent);
            out.push('}');
        }
        NodeData::Block { .. } => print_block(ast, id, out, indent),
        _ => unreachable!("not a statement"),
    }
}

fn print_expr(ast: &Ast, id: NodeId) -> String {
    match ast.get(id) {
        NodeData::Ident { name } => name.clone(),
        NodeData::BasicLit { value, kind } => match kind {
            crate::ast::LitKind::String => format!("\"{}\"", value.replace('"', "\\\"")),
            _ => value.clone(),
        },
        NodeData::CallExpr { func, args } => format!(
            "{}({})",
            print_expr(ast, *func),
            args.iter().map(|a| print_expr(ast, *a)).collect::<Vec<_>>().join(", ")
        ),
        NodeData::SelectorExpr { expr, field } => format!("{}.{}", print_expr(ast, *expr), field),
        NodeData::IndexExpr { expr, index } => {
            format!("{}[{}]", print_expr(ast, *expr), print_expr(ast, *index))
        }
        NodeData::BinaryExpr { op, x, y } => {
            format!("{} {} {}", print_expr(ast, *x), op, print_expr(ast, *y))
        }
        NodeData::UnaryExpr { op, x } => format!("{}{}", op, print_expr(ast, *x)),
        NodeData::ParenExpr { x } => format!("({})", print_expr(ast, *x)),
        NodeData::CompositeLit { ty, elements } => {
            let ty_str = ty.as_ref().map(render_type).unwrap_or_default();
            let body = elements
                .iter()
                .map(|(k, v)| match k {
                    Some(key) => format!("{}: {}", key, print_expr(ast, *v)),
                    None => print_expr(ast, *v),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}{{{}}}", ty_str, body)
        }
        NodeData::FuncLit {
            params,
            results,
            body,
        } => {
            let mut s = format!("func({})", fields_str(params));
            if !results.is_empty() {
                s.push(' ');
                s.push_str(&results_str(results));
            }
            s.push(' ');
            print_block(ast, *body, &mut s, "");
            s
        }
        _ => unreachable!("not an expression"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn roundtrips_through_reparse() {
        let src = "package main\n\nfunc add(a int, b int) int {\n\treturn a + b\n}\n";
        let ast = parse(src).unwrap();
        let printed = print(&ast);
        let reparsed = parse(&printed).unwrap();
        assert_eq!(print(&reparsed), printed);
    }

    #[test]
    fn preserves_marker_comments() {
        let src = "package main\nfunc f() {\n\tswitch x.tag {\n\t// DINGO_PATTERN: Ok(v)\n\tcase ResultTagOk:\n\t\treturn\n\tdefault:\n\t\treturn\n\t}\n}\n";
        let ast = parse(src).unwrap();
        let printed = print(&ast);
        assert!(printed.contains("DINGO_PATTERN"));
    }
}
