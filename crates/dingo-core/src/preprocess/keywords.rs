//! Normalizes `let` bindings to native Go declaration syntax: `let x = expr`
//! becomes a short variable declaration, `let x Type` (no initializer)
//! becomes a `var` declaration, and `let (p1, ..., pN) = expr` (or `var`)
//! keeps its parenthesized pattern but swaps `=` for `:=`, so the tuple
//! processor downstream can recognize an explicit destructure target by its
//! leading `(`. Runs line-by-line and skips any line whose keyword sits
//! inside a string or line comment, since both words are common enough in
//! prose to show up in either.

use crate::error::TranspileResult;
use regex::Regex;
use std::sync::OnceLock;

/// Byte offset of the `)` balancing the `(` at `s[0]`, scanning from there.
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

/// Rewrites `let (p1, ..., pN) = expr` / `var (...) = expr` into
/// `(p1, ..., pN) := expr`, leaving the pattern's own parens untouched.
fn rewrite_tuple_let(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    let rest = trimmed
        .strip_prefix("let ")
        .or_else(|| trimmed.strip_prefix("var "))?
        .trim_start();
    if !rest.starts_with('(') {
        return None;
    }
    let close = find_matching_close(rest)?;
    let pattern = &rest[..=close];
    let after = rest[close + 1..].trim_start();
    let rhs = after.strip_prefix('=')?;
    if rhs.starts_with('=') {
        return None; // `==`, not an assignment
    }
    Some(format!("{}{} := {}", indent, pattern, rhs.trim()))
}

fn let_with_init_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<indent>\s*)let\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?:\s*:\s*[A-Za-z_][A-Za-z0-9_.\[\]*]*)?\s*=\s*(?P<expr>.+)$")
            .unwrap()
    })
}

fn let_without_init_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<indent>\s*)let\s+(?P<name>[A-Za-z_][A-Za-z0-9_]*)\s+(?P<ty>[A-Za-z_][A-Za-z0-9_.\[\]*]*)\s*$")
            .unwrap()
    })
}

/// True if `let` at `byte_idx` in `line` is inside a `"..."` string literal.
fn inside_string(line: &str, byte_idx: usize) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if i >= byte_idx {
            break;
        }
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            _ => {}
        }
    }
    in_string
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) if !inside_string(line, idx) => &line[..idx],
        _ => line,
    }
}

pub fn run(source: &str) -> TranspileResult<String> {
    let mut out = Vec::new();
    for line in source.lines() {
        let code = strip_line_comment(line);
        let kw_idx = code.find("let").or_else(|| code.find("var"));
        let touched = matches!(kw_idx, Some(idx) if !inside_string(code, idx));
        if !touched {
            out.push(line.to_string());
            continue;
        }
        if let Some(rewritten) = rewrite_tuple_let(line) {
            out.push(rewritten);
        } else if let Some(caps) = let_with_init_re().captures(line) {
            out.push(format!("{}{} := {}", &caps["indent"], &caps["name"], &caps["expr"]));
        } else if let Some(caps) = let_without_init_re().captures(line) {
            out.push(format!("{}var {} {}", &caps["indent"], &caps["name"], &caps["ty"]));
        } else {
            out.push(line.to_string());
        }
    }
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_let_with_initializer_to_short_decl() {
        let out = run("let count = 0\n").unwrap();
        assert_eq!(out.trim_end(), "count := 0");
    }

    #[test]
    fn rewrites_let_with_type_annotation_to_short_decl() {
        let out = run("let count: int = 0\n").unwrap();
        assert_eq!(out.trim_end(), "count := 0");
    }

    #[test]
    fn rewrites_bare_let_to_var_decl() {
        let out = run("let total int\n").unwrap();
        assert_eq!(out.trim_end(), "var total int");
    }

    #[test]
    fn ignores_let_inside_a_string_or_comment() {
        let out = run("msg := \"let there be light\"\n").unwrap();
        assert_eq!(out.trim_end(), "msg := \"let there be light\"");
        let out2 = run("// let this stay a comment\n").unwrap();
        assert_eq!(out2.trim_end(), "// let this stay a comment");
    }

    #[test]
    fn rewrites_flat_tuple_let_keeping_the_pattern_parens() {
        let out = run("let (x, y) = (10, \"hi\")\n").unwrap();
        assert_eq!(out.trim_end(), "(x, y) := (10, \"hi\")");
    }

    #[test]
    fn rewrites_nested_tuple_let_keeping_the_pattern_parens() {
        let out = run("let ((a, b), c) = f()\n").unwrap();
        assert_eq!(out.trim_end(), "((a, b), c) := f()");
    }

    #[test]
    fn rewrites_tuple_var_the_same_way() {
        let out = run("var (x, y) = pair()\n").unwrap();
        assert_eq!(out.trim_end(), "(x, y) := pair()");
    }

    #[test]
    fn does_not_treat_a_tuple_equality_comparison_as_a_destructure() {
        let out = run("let (x, y) == (a, b)\n").unwrap();
        assert_eq!(out.trim_end(), "let (x, y) == (a, b)");
    }
}
