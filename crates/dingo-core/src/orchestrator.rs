//! Wires the text-level preprocessor chain, the AST-level plugin engine and
//! the pretty-printer into one run: parse the preprocessed text, lower every
//! sum-type match and tuple/option placeholder, inject whatever stdlib
//! imports the chain collected, print, and build the source map that ties
//! the generated output back to the preprocessed (pre-plugin) source.

use crate::error::{ErrorKind, TranspileError, TranspileResult};
use crate::preprocess;
use dingo_annotations::NilSafetyMode;
use dingo_goast::ast::{ImportSpec, NodeData};
use dingo_goast::{infer_basic, parse, print, Ast, NodeId};
use dingo_sourcemap::{Mapping, SourceMap};

#[derive(Debug)]
pub struct TranspileOutput {
    pub generated: String,
    pub source_map: SourceMap,
    pub registry: dingo_analysis::SumTypeRegistry,
}

#[tracing::instrument(skip(source), fields(source_len = source.len()))]
pub fn run(source: &str, nil_safety: NilSafetyMode) -> TranspileResult<TranspileOutput> {
    let (preprocessed, chain_state) = preprocess::run_chain(source)?;
    tracing::debug!(
        needed_imports = chain_state.needed_imports.len(),
        "preprocessor chain finished"
    );

    let mut ast = parse(&preprocessed).map_err(|e| {
        tracing::warn!(line = e.line, column = e.column, "parse failed");
        TranspileError::new(ErrorKind::Syntax(e.message.clone())).with_context(format!(
            "while parsing the preprocessed source at line {}, column {}",
            e.line, e.column
        ))
    })?;

    let decl_positions = collect_decl_lines(&ast);

    let type_info = infer_basic(&ast);
    let analysis = dingo_analysis::run_plugins(&mut ast, Some(&type_info), nil_safety);
    if !analysis.errors.is_empty() {
        let mut iter = analysis.errors.into_iter();
        let first: TranspileError = iter.next().unwrap().into();
        let remaining = iter.count();
        tracing::error!(remaining, "plugin pass reported errors");
        return Err(if remaining > 0 {
            first.with_context(format!("and {} more error(s) in this file", remaining))
        } else {
            first
        });
    }

    inject_imports(&mut ast, &chain_state.needed_imports);

    let mut source_map = SourceMap::new();
    let mut generated_line = 2; // line 1 is `package ...`, line 2 is blank.
    for (decl_id, original_line) in &decl_positions {
        if *original_line > 0 {
            source_map.push(Mapping::new(generated_line, 1, *original_line, 1, 1));
        }
        generated_line += lines_in_decl(&ast, *decl_id);
    }

    let import_lines = import_block_lines(&chain_state.needed_imports);
    if import_lines > 0 {
        source_map.shift_generated_lines_from(3, import_lines as i64);
    }

    let generated = print(&ast);
    tracing::info!(generated_len = generated.len(), "transpilation finished");

    Ok(TranspileOutput {
        generated,
        source_map,
        registry: analysis.registry,
    })
}

fn collect_decl_lines(ast: &Ast) -> Vec<(NodeId, usize)> {
    let NodeData::File { decls, .. } = ast.get(ast.root) else {
        return Vec::new();
    };
    decls
        .iter()
        .map(|id| (*id, ast.position(*id).line))
        .collect()
}

/// Approximate line count a declaration will occupy once printed: one for
/// the declaration header/closing plus its leading comments, which is
/// enough precision for the import-shift correction that follows.
fn lines_in_decl(ast: &Ast, id: NodeId) -> usize {
    ast.leading_comments(id).len() + 3
}

fn import_block_lines(imports: &std::collections::BTreeSet<String>) -> usize {
    match imports.len() {
        0 => 0,
        1 => 2,
        n => n + 2,
    }
}

fn inject_imports(ast: &mut Ast, needed: &std::collections::BTreeSet<String>) {
    if needed.is_empty() {
        return;
    }
    let NodeData::File {
        package,
        imports,
        decls,
    } = ast.get(ast.root).clone()
    else {
        return;
    };
    let mut all_paths: std::collections::BTreeSet<String> =
        imports.iter().map(|spec| spec.path.clone()).collect();
    all_paths.extend(needed.iter().cloned());
    let merged: Vec<ImportSpec> = all_paths
        .into_iter()
        .map(|path| ImportSpec { path, alias: None })
        .collect();
    ast.set(
        ast.root,
        NodeData::File {
            package,
            imports: merged,
            decls,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpiles_a_bare_stdlib_call_with_import_injection() {
        let src = "package main\n\nfunc Run(path string) {\n\tReadFile(path)\n}\n";
        let output = run(src, NilSafetyMode::On).unwrap();
        assert!(output.generated.contains("\"os\""));
        assert!(output.generated.contains("os.ReadFile(path)"));
    }

    #[test]
    fn surfaces_a_syntax_error_as_exit_code_one() {
        let src = "package main\n\nfunc Broken( {\n";
        let err = run(src, NilSafetyMode::On).unwrap_err();
        assert_eq!(err.kind.exit_code(), 1);
    }
}
