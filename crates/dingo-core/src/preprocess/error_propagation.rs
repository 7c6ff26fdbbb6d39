//! Expands the postfix `?` error-propagation operator into its seven-line Go
//! equivalent: a temporary pair, a nil check, a wrapped early return, and
//! the binding the rest of the function expected. Bracketed by a matching
//! `dingo:s`/`dingo:e` marker pair around just the if-block, so the source
//! map can treat that block as one generated span mapping back to the
//! original line.
//!
//! Must not fire on the ternary operator `cond ? a : b`. Anchoring the match
//! on what can legally follow the `?` — end of line, or a quoted message
//! running to end of line — already rejects `cond ? a : b` forms, since
//! ` a : b` is neither: no separate state machine is needed to tell the two
//! apart once the match is anchored this way.

use super::ChainState;
use crate::error::{ErrorKind, TranspileError, TranspileResult};
use crate::marker::{end_marker, start_marker};
use crate::placeholder::{err_name, tmp_name};
use regex::Regex;
use std::sync::OnceLock;

fn let_propagate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(?P<indent>\s*)let\s+(?P<lhs>[A-Za-z_][A-Za-z0-9_]*)\s*=\s*(?P<expr>.+?)\?(?:\s+"(?P<msg>(?:[^"\\]|\\.)*)")?\s*$"#,
        )
        .unwrap()
    })
}

fn return_propagate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(?P<indent>\s*)return\s+(?P<expr>.+?)\?(?:\s+"(?P<msg>(?:[^"\\]|\\.)*)")?\s*$"#,
        )
        .unwrap()
    })
}

fn zero_value_for(return_type: &str) -> String {
    let t = return_type.trim();
    match t {
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
        | "uint32" | "uint64" | "byte" | "rune" | "float32" | "float64" => "0".to_string(),
        "string" => "\"\"".to_string(),
        "bool" => "false".to_string(),
        _ if t.starts_with('*')
            || t.starts_with("[]")
            || t.starts_with("map[")
            || t.starts_with("chan ")
            || t.starts_with("func(")
            || t == "any"
            || t == "error"
            || t == "interface{}" =>
        {
            "nil".to_string()
        }
        // A single-letter token is treated as an unresolved generic parameter.
        _ if t.len() == 1 && t.chars().next().unwrap().is_ascii_alphabetic() => "nil".to_string(),
        _ if t.starts_with('[') => {
            // array `[N]T` -> `T{}`
            match t.find(']') {
                Some(close) => format!("{}{{}}", &t[close + 1..]),
                None => "nil".to_string(),
            }
        }
        _ if !t.is_empty() => format!("{}{{}}", t),
        _ => "nil".to_string(),
    }
}

/// Scans backward from `idx` for the nearest enclosing `func` signature's
/// return types, to derive the zero values an early return needs for every
/// slot but the trailing `error`.
fn enclosing_return_types(lines: &[&str], idx: usize) -> Vec<String> {
    static SIG_RE: OnceLock<Regex> = OnceLock::new();
    let sig_re = SIG_RE.get_or_init(|| {
        Regex::new(r"^func\s+(?:\([^)]*\)\s*)?[A-Za-z_][A-Za-z0-9_]*\([^)]*\)\s*(.*)\{\s*$")
            .unwrap()
    });
    for line in lines[..idx].iter().rev() {
        if let Some(caps) = sig_re.captures(line.trim_start()) {
            let ret = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if ret.is_empty() {
                return Vec::new();
            }
            let inner = ret.trim_start_matches('(').trim_end_matches(')');
            return inner
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && s != "error")
                .collect();
        }
        if line.trim_start().starts_with("func ") {
            break;
        }
    }
    Vec::new()
}

fn escape_percent(msg: &str) -> String {
    msg.replace('%', "%%")
}

fn error_expr(msg: Option<&str>, err: &str) -> String {
    match msg {
        Some(m) => format!(r#"fmt.Errorf("{}: %w", {})"#, escape_percent(m), err),
        None => err.to_string(),
    }
}

struct Propagation<'a> {
    indent: &'a str,
    /// `Some(lhs)` for a `let lhs = expr?` line, `None` for a bare `return expr?`.
    lhs: Option<&'a str>,
    expr: &'a str,
    msg: Option<&'a str>,
}

fn expand(
    p: Propagation<'_>,
    non_error_returns: &[String],
    state: &mut ChainState,
    out: &mut Vec<String>,
) {
    let id = state.next_marker_id();
    let tmp = tmp_name(id);
    let err = err_name(id);

    out.push(format!("{}{}, {} := {}", p.indent, tmp, err, p.expr));
    out.push(format!("{}{}", p.indent, start_marker(id)));
    out.push(format!("{}if {} != nil {{", p.indent, err));
    let mut zero_values: Vec<String> = non_error_returns.iter().map(|t| zero_value_for(t)).collect();
    zero_values.push(error_expr(p.msg, &err));
    out.push(format!("{}\treturn {}", p.indent, zero_values.join(", ")));
    out.push(format!("{}}}", p.indent));
    out.push(format!("{}{}", p.indent, end_marker(id)));
    match p.lhs {
        Some(lhs) => out.push(format!("{}var {} = {}", p.indent, lhs, tmp)),
        None => {
            if non_error_returns.is_empty() {
                out.push(format!("{}return nil", p.indent));
            } else {
                out.push(format!("{}return {}, nil", p.indent, tmp));
            }
        }
    }
}

pub fn run(source: &str, state: &mut ChainState) -> TranspileResult<String> {
    let lines: Vec<&str> = source.lines().collect();
    let mut out = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        state.notice_line(line);
        if let Some(caps) = let_propagate_re().captures(line) {
            let non_error_returns = enclosing_return_types(&lines, idx);
            if non_error_returns.len() > 1 {
                return Err(TranspileError::new(ErrorKind::Syntax(format!(
                    "'?' requires the enclosing function to return one value plus an error, found {} non-error return values",
                    non_error_returns.len()
                ))));
            }
            let msg = caps.name("msg").map(|m| m.as_str());
            expand(
                Propagation {
                    indent: &caps["indent"],
                    lhs: Some(&caps["lhs"]),
                    expr: &caps["expr"],
                    msg,
                },
                &non_error_returns,
                state,
                &mut out,
            );
            if msg.is_some() {
                state.needed_imports.insert("fmt".to_string());
            }
            continue;
        }
        if let Some(caps) = return_propagate_re().captures(line) {
            let non_error_returns = enclosing_return_types(&lines, idx);
            if non_error_returns.len() > 1 {
                return Err(TranspileError::new(ErrorKind::Syntax(format!(
                    "'?' requires the enclosing function to return one value plus an error, found {} non-error return values",
                    non_error_returns.len()
                ))));
            }
            let msg = caps.name("msg").map(|m| m.as_str());
            expand(
                Propagation {
                    indent: &caps["indent"],
                    lhs: None,
                    expr: &caps["expr"],
                    msg,
                },
                &non_error_returns,
                state,
                &mut out,
            );
            if msg.is_some() {
                state.needed_imports.insert("fmt".to_string());
            }
            continue;
        }
        out.push((*line).to_string());
    }
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_let_propagation_into_seven_lines() {
        let src = "func readData(path string) ([]byte, error) {\n\tlet data = ReadFile(path)? \"failed: 50% complete\"\n\treturn data, nil\n}\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("__tmp0, __err0 := ReadFile(path)"));
        assert!(out.contains(r#"fmt.Errorf("failed: 50%% complete: %w", __err0)"#));
        assert!(out.contains("var data = __tmp0"));
        assert!(out.contains("// dingo:s:0"));
        assert!(out.contains("// dingo:e:0"));
    }

    #[test]
    fn expands_propagation_with_no_message() {
        let mut state = ChainState::new();
        let src = "func load() (int, error) {\n\tlet n = count()?\n\treturn n, nil\n}\n";
        let out = run(src, &mut state).unwrap();
        assert!(out.contains("__tmp0, __err0 := count()"));
        assert!(out.contains("return 0, __err0"));
        assert!(!out.contains("fmt.Errorf"));
        assert!(!state.needed_imports.contains("fmt"));
    }

    #[test]
    fn marker_ids_reset_at_each_function_boundary() {
        let src = concat!(
            "func one() (int, error) {\n",
            "\tlet a = count()?\n",
            "\treturn a, nil\n",
            "}\n",
            "func two() (int, error) {\n",
            "\tlet b = count()?\n",
            "\treturn b, nil\n",
            "}\n",
        );
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("__tmp0, __err0 := count()"));
        assert!(!out.contains("__tmp1"));
        assert!(!out.contains("__err1"));
    }

    #[test]
    fn expands_return_form_propagation() {
        let src = "func load() (int, error) {\n\treturn count()? \"bad\"\n}\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("__tmp0, __err0 := count()"));
        assert!(out.contains("return __tmp0, nil"));
    }

    #[test]
    fn does_not_rewrite_a_ternary() {
        let src = "let x = cond ? a : b\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert_eq!(out, src.trim_end_matches('\n'));
    }

    #[test]
    fn rejects_propagation_in_a_function_with_more_than_one_non_error_return() {
        let src = "func Load(path string) (string, int, error) {\n\tlet data = ReadFile(path)? \"failed\"\n\treturn data, 0, nil\n}\n";
        let err = run(src, &mut ChainState::new()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax(_)));
    }

    #[test]
    fn zero_value_covers_common_kinds() {
        assert_eq!(zero_value_for("int"), "0");
        assert_eq!(zero_value_for("string"), "\"\"");
        assert_eq!(zero_value_for("*Widget"), "nil");
        assert_eq!(zero_value_for("Widget"), "Widget{}");
        assert_eq!(zero_value_for("T"), "nil");
        assert_eq!(zero_value_for("[3]Widget"), "Widget{}");
    }

    #[test]
    fn escape_is_idempotent_once_doubled() {
        let once = escape_percent("50%");
        assert_eq!(escape_percent(&once), once);
    }
}
