//! Tuple literal and tuple destructure rewriting.
//!
//! Two syntactic forms are unambiguous at the text level and handled here:
//! a parenthesized comma list used as a value (`(a, b)`) always denotes a
//! tuple literal, and a line whose entire left-hand side of `:=` is wrapped
//! in one balanced pair of parens (`(p1, ..., pN) := expr`, the form the
//! keyword normalizer produces from `let (p1, ..., pN) = expr`) always
//! denotes an explicit tuple destructure. A flat `a, b := f()` with no
//! wrapping parens is left alone: when `f()` is a call this is
//! indistinguishable from Go's native multi-value return without the host
//! type-checker's output, so that case is resolved later once type
//! information is available.

use super::ChainState;
use crate::error::{ErrorKind, TranspileError, TranspileResult};
use crate::placeholder::tuple_literal_name;
use regex::Regex;
use std::sync::OnceLock;

const MAX_ARITY: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Name(String),
    Tuple(Vec<Pattern>),
}

fn validate_arity(n: usize) -> TranspileResult<()> {
    if n == 0 {
        return Err(TranspileError::new(ErrorKind::TupleArity(
            "empty tuples not supported".to_string(),
        )));
    }
    if n == 1 {
        return Err(TranspileError::new(ErrorKind::TupleArity(
            "single-element tuples not supported; parenthesize the expression instead"
                .to_string(),
        )));
    }
    if n > MAX_ARITY {
        return Err(TranspileError::new(ErrorKind::TupleArity(format!(
            "maximum {} elements, found {}",
            MAX_ARITY, n
        ))));
    }
    Ok(())
}

fn validate_pattern_arity(pattern: &Pattern) -> TranspileResult<()> {
    if let Pattern::Tuple(elems) = pattern {
        validate_arity(elems.len())?;
        for elem in elems {
            validate_pattern_arity(elem)?;
        }
    }
    Ok(())
}

fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in s.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            c if c == sep && depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            c => current.push(c),
        }
    }
    if !current.trim().is_empty() || !parts.is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn parse_pattern(s: &str) -> Option<Pattern> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        let parts = split_top_level(inner, ',');
        let patterns: Option<Vec<Pattern>> = parts.iter().map(|p| parse_pattern(p)).collect();
        return Some(Pattern::Tuple(patterns?));
    }
    if s.chars().next()?.is_alphabetic() || s.starts_with('_') {
        if s.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Some(Pattern::Name(s.to_string()));
        }
    }
    None
}

/// Byte offset of the `)` balancing the `(` at `s[0]`.
fn find_matching_close(s: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn emit_destructure(
    pattern_elems: &[Pattern],
    accessor: &str,
    state: &mut ChainState,
    indent: &str,
    out: &mut Vec<String>,
) {
    if pattern_elems.iter().all(|p| matches!(p, Pattern::Name(_))) {
        let names: Vec<&str> = pattern_elems
            .iter()
            .map(|p| match p {
                Pattern::Name(n) => n.as_str(),
                Pattern::Tuple(_) => unreachable!(),
            })
            .collect();
        let accessors: Vec<String> = (0..pattern_elems.len())
            .map(|i| format!("{}._{}", accessor, i))
            .collect();
        out.push(format!(
            "{}{} := {}",
            indent,
            names.join(", "),
            accessors.join(", ")
        ));
        return;
    }
    for (i, elem) in pattern_elems.iter().enumerate() {
        let sub_accessor = format!("{}._{}", accessor, i);
        match elem {
            Pattern::Name(n) => out.push(format!("{}{} := {}", indent, n, sub_accessor)),
            Pattern::Tuple(sub) => {
                let temp = state.next_tuple_temp();
                out.push(format!("{}{} := {}", indent, temp, sub_accessor));
                emit_destructure(sub, &temp, state, indent, out);
            }
        }
    }
}

/// Recognizes the canonical destructure form `(p1, ..., pN) := expr`: the
/// entire left-hand side is one balanced-paren group immediately followed
/// by `:=`. Returns the pattern list (already split on top-level commas
/// inside that group) and the right-hand expression.
fn try_split_destructure(line: &str) -> Option<(&str, Vec<String>, &str)> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    if !trimmed.starts_with('(') {
        return None;
    }
    let close = find_matching_close(trimmed)?;
    let after = trimmed[close + 1..].trim_start();
    let expr = after.strip_prefix(":=")?.trim();
    if expr.is_empty() {
        return None;
    }
    let inner = &trimmed[1..close];
    Some((indent, split_top_level(inner, ','), expr))
}

fn tuple_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?P<indent>[:=]\s*)\((?P<body>[^()]+(?:,[^()]+)+)\)\s*$").unwrap()
    })
}

fn nested_tuple_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[:=]\s*\([^()]*\([^()]*,[^()]*\)").unwrap())
}

fn empty_tuple_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[:=]\s*\(\s*\)\s*$").unwrap())
}

fn rewrite_tuple_literal(line: &str, state: &mut ChainState) -> TranspileResult<String> {
    if nested_tuple_literal_re().is_match(line) {
        return Err(TranspileError::new(ErrorKind::Syntax(
            "nested tuple literals are not supported".to_string(),
        )));
    }
    if empty_tuple_re().is_match(line) {
        validate_arity(0)?;
    }
    // A lone element with no top-level comma (`x := (e)`) is mere grouping,
    // not a tuple literal, and is left untouched.
    let Some(caps) = tuple_literal_re().captures(line) else {
        return Ok(line.to_string());
    };
    let body = &caps["body"];
    let elements = split_top_level(body, ',');
    let arity = elements.len();
    validate_arity(arity)?;
    let _ = state.next_marker_id();
    let name = tuple_literal_name(arity, body.trim());
    let whole = caps.get(0).unwrap().as_str();
    let replacement = format!("{}{}({})", &caps["indent"], name, elements.join(", "));
    Ok(line.replacen(whole, &replacement, 1))
}

pub fn run(source: &str, state: &mut ChainState) -> TranspileResult<String> {
    let mut out = Vec::new();
    for line in source.lines() {
        state.notice_line(line);
        if let Some((indent, parts, expr)) = try_split_destructure(line) {
            let patterns: Option<Vec<Pattern>> = parts.iter().map(|p| parse_pattern(p)).collect();
            if let Some(patterns) = patterns {
                validate_arity(patterns.len())?;
                for pattern in &patterns {
                    validate_pattern_arity(pattern)?;
                }
                let temp = state.next_tuple_temp();
                let tmp_line = format!("{}{} := {}", indent, temp, expr);
                out.push(rewrite_tuple_literal(&tmp_line, state)?);
                let mut destructured = Vec::new();
                emit_destructure(&patterns, &temp, state, indent, &mut destructured);
                for l in destructured {
                    out.push(rewrite_tuple_literal(&l, state)?);
                }
                continue;
            }
        }
        out.push(rewrite_tuple_literal(line, state)?);
    }
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_tuple_literal_to_placeholder_call() {
        let out = run("point := (10, \"hi\")\n", &mut ChainState::new()).unwrap();
        assert!(out.contains("point := __TUPLE_2__LITERAL__"));
    }

    #[test]
    fn rejects_empty_and_oversized_tuples() {
        assert!(run("x := ()\n", &mut ChainState::new()).is_err());
        let oversized = format!(
            "x := ({})\n",
            (0..13).map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
        );
        assert!(run(&oversized, &mut ChainState::new()).is_err());
    }

    #[test]
    fn leaves_a_single_parenthesized_expression_untouched_as_mere_grouping() {
        let out = run("x := (errVal)\n", &mut ChainState::new()).unwrap();
        assert_eq!(out.trim_end(), "x := (errVal)");
    }

    #[test]
    fn rejects_a_nested_tuple_literal() {
        let err = run("x := ((1, 2), 3)\n", &mut ChainState::new()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax(_)));
    }

    #[test]
    fn destructures_a_flat_tuple_pattern() {
        let out = run("(x, y) := (10, \"hi\")\n", &mut ChainState::new()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("__TUPLE_2__LITERAL__"));
        assert!(lines.iter().any(|l| l.trim() == "x, y := tmp._0, tmp._1"));
    }

    #[test]
    fn destructures_nested_pattern_with_collapsed_flat_sublevel() {
        let src = "((a, b), c) := f()\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].ends_with(":= f()"));
        assert!(lines.iter().any(|l| l.trim() == "a, b := tmp1._0, tmp1._1"));
        assert!(lines.iter().any(|l| l.contains("c := tmp._1")));
    }

    #[test]
    fn tuple_temp_counter_resets_at_each_function_boundary() {
        let src = concat!(
            "func one() {\n",
            "(a, b) := f()\n",
            "}\n",
            "func two() {\n",
            "(c, d) := g()\n",
            "}\n",
        );
        let out = run(src, &mut ChainState::new()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.iter().any(|l| l.trim() == "tmp := f()"));
        assert!(lines.iter().any(|l| l.trim() == "tmp := g()"));
        assert!(!out.contains("tmp1"));
    }

    #[test]
    fn rejects_a_single_element_destructure_pattern() {
        let err = run("(x) := f()\n", &mut ChainState::new()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TupleArity(_)));
    }
}
