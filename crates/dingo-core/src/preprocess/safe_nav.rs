//! Lowers `a?.b?.c` safe-navigation chains and `lhs ?? rhs` null-coalescing
//! expressions into immediately-invoked function literals the AST-level
//! option plugin already knows how to finish resolving. Each hop's payload
//! access goes through the `__UNWRAP__(opt)` placeholder rather than a
//! direct `.Unwrap()` call, and the terminal constructors are the
//! placeholders `__INFER___Some(x)` / `__INFER___None()`, since the real
//! `Option_T` name isn't known until the AST phase resolves the chain's
//! element type.

use crate::error::TranspileResult;
use crate::placeholder::{
    infer_none_name, infer_placeholder, infer_some_name, null_coalesce_placeholder,
    unwrap_placeholder,
};
use regex::Regex;
use std::sync::OnceLock;

/// Matches a safe-nav chain, optionally followed by `?? rhs`. The `??`
/// half is captured here rather than left to `null_coalesce_re` because
/// that regex operates on plain text and can't span the multi-token IIFE
/// the chain lowers to; folding both into one match lets the replacement
/// closure nest the placeholder call around the chain's own lowered text
/// before either touches the line.
fn safe_nav_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?P<root>[A-Za-z_]\w*)(?P<chain>(?:\?\.[A-Za-z_]\w*)+)(?:\s*\?\?\s*(?P<rhs>[^;,\n]+))?",
        )
        .unwrap()
    })
}

fn null_coalesce_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?P<lhs>[A-Za-z_][\w.()]*)\s*\?\?\s*(?P<rhs>[^;,\n]+)").unwrap()
    })
}

fn lower_chain(root: &str, chain: &str) -> String {
    let steps: Vec<&str> = chain
        .split("?.")
        .filter(|s| !s.is_empty())
        .collect();
    let none_return = format!("return {}()", infer_none_name());
    let mut body = format!("if {}.IsNone() {{ {} }}", root, none_return);
    let mut current = format!("{}({})", unwrap_placeholder(), root);
    for (i, step) in steps.iter().enumerate() {
        let field_access = format!("{}.{}", current, step);
        if i + 1 == steps.len() {
            current = format!("{}({})", infer_some_name(), field_access);
        } else {
            body.push_str(&format!(
                "; if {field}.IsNone() {{ {ret} }}",
                field = field_access,
                ret = none_return
            ));
            current = format!("{}({})", unwrap_placeholder(), field_access);
        }
    }
    format!(
        "func() {} {{ {}; return {} }}()",
        infer_placeholder(),
        body,
        current
    )
}

pub fn run(source: &str) -> TranspileResult<String> {
    let mut out = Vec::new();
    for line in source.lines() {
        let mut rewritten = line.to_string();
        if safe_nav_re().is_match(&rewritten) {
            rewritten = safe_nav_re()
                .replace_all(&rewritten, |caps: &regex::Captures| {
                    let chain_iife = lower_chain(&caps["root"], &caps["chain"]);
                    match caps.name("rhs") {
                        Some(rhs) => format!(
                            "{}({}, {})",
                            null_coalesce_placeholder(),
                            chain_iife,
                            rhs.as_str().trim()
                        ),
                        None => chain_iife,
                    }
                })
                .into_owned();
        }
        if null_coalesce_re().is_match(&rewritten) {
            rewritten = null_coalesce_re()
                .replace_all(&rewritten, |caps: &regex::Captures| {
                    format!(
                        "{}({}, {})",
                        null_coalesce_placeholder(),
                        caps["lhs"].trim(),
                        caps["rhs"].trim()
                    )
                })
                .into_owned();
        }
        out.push(rewritten);
    }
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_a_single_hop_safe_nav_chain() {
        let out = run("x := user?.Name\n").unwrap();
        assert!(out.contains("func() __INFER__"));
        assert!(out.contains("user.IsNone()"));
        assert!(out.contains("__INFER___Some(__UNWRAP__(user).Name)"));
    }

    #[test]
    fn lowers_a_multi_hop_chain_through_unwrap_placeholders() {
        let out = run("name := user?.profile?.name\n").unwrap();
        assert!(out.contains("__UNWRAP__(user).profile.IsNone()"));
        assert!(out.contains("__INFER___Some(__UNWRAP__(__UNWRAP__(user).profile).name)"));
        assert!(out.contains("__INFER___None()"));
    }

    #[test]
    fn lowers_null_coalesce_into_a_marker_call() {
        let out = run("name := maybeName ?? \"default\"\n").unwrap();
        assert!(out.contains("__NULL_COALESCE__(maybeName, \"default\")"));
    }

    #[test]
    fn lowers_a_safe_nav_chain_combined_with_null_coalesce_into_one_marker_call() {
        let out = run("name := user?.profile?.name ?? \"anon\"\n").unwrap();
        assert!(out.starts_with("name := __NULL_COALESCE__(func() __INFER__"));
        assert!(out.contains("__INFER___Some(__UNWRAP__(__UNWRAP__(user).profile).name)"));
        assert!(out.trim_end().ends_with("}(), \"anon\")"));
    }
}
