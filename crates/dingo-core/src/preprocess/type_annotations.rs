//! Normalizes colon-style type annotations (`name: Type`, `-> Type`) into
//! Go's native spacing (`name Type`, ` Type`) so every later pass, and the
//! eventual host parser, only ever sees Go syntax. Scoped to function
//! signature lines: rewriting every `ident: ident` pair in the file would
//! also mangle struct and map composite literals, which use the same colon.

use super::ChainState;
use crate::error::TranspileResult;
use crate::marker::type_marker;
use regex::Regex;
use std::sync::OnceLock;

fn return_arrow_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\)\s*->\s*([A-Za-z_][A-Za-z0-9_.\[\]*]*)\s*\{").unwrap())
}

fn param_annotation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*:\s*([A-Za-z_][A-Za-z0-9_.\[\]*]*)\b").unwrap()
    })
}

fn is_signature_line(line: &str) -> bool {
    line.trim_start().starts_with("func ")
}

pub fn run(source: &str, state: &mut ChainState) -> TranspileResult<String> {
    let mut out = Vec::new();
    for line in source.lines() {
        let mut rewritten = line.to_string();
        let mut touched = false;

        if return_arrow_re().is_match(&rewritten) {
            rewritten = return_arrow_re()
                .replace(&rewritten, ") $1 {")
                .into_owned();
            touched = true;
        }

        if is_signature_line(&rewritten) && param_annotation_re().is_match(&rewritten) {
            rewritten = param_annotation_re()
                .replace_all(&rewritten, "$1 $2")
                .into_owned();
            touched = true;
        }

        if touched {
            out.push(type_marker(state.next_marker_id()));
        }
        out.push(rewritten);
    }
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_return_arrow_and_param_colons() {
        let src = "func Add(a: int, b: int) -> int {\n\treturn a + b\n}\n";
        let (out, _) = (run(src, &mut ChainState::new()).unwrap(), ());
        assert!(out.contains("func Add(a int, b int) int {"));
        assert!(out.contains("// dingo:t:0"));
    }

    #[test]
    fn leaves_composite_literals_with_colons_untouched() {
        let src = "x := Point{X: 1, Y: 2}\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert_eq!(out.trim_end(), "x := Point{X: 1, Y: 2}");
    }
}
