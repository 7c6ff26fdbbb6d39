//! Recognition and construction of the synthetic identifiers the text-level
//! preprocessors leave for the AST-level plugins to pick up. Every such
//! identifier is double-underscore-delimited and all-caps on its tag, so it
//! can never collide with a name a human author would write.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Matches any synthetic placeholder identifier: `__TAG__`, `__TAG__KIND__`,
/// `__TAG__KIND_123`, `__TAG__KIND_abcdef01` and similar.
fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^__[A-Z][A-Z0-9_]*__(LITERAL|INFER|SAFE_NAV)(_[0-9]+|_[a-z0-9]+)?$").unwrap()
    })
}

pub fn is_placeholder(name: &str) -> bool {
    placeholder_re().is_match(name)
        || matches!(
            name,
            "__UNWRAP__" | "__NULL_COALESCE__" | "__INFER___Some" | "__INFER___None"
        )
        || name.starts_with("__match_")
        || is_temp(name)
}

fn is_temp(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("__tmp").or_else(|| name.strip_prefix("__err")) else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Deterministic hash suffix for a tuple literal placeholder, derived from
/// the element types so identical shapes collapse onto the same name.
pub fn tuple_hash(element_summary: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(element_summary.as_bytes());
    let digest = hasher.finalize();
    hex_prefix(&digest, 8)
}

fn hex_prefix(bytes: &[u8], count: usize) -> String {
    bytes
        .iter()
        .take(count)
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub fn tuple_literal_name(arity: usize, element_summary: &str) -> String {
    format!("__TUPLE_{}__LITERAL__{}", arity, tuple_hash(element_summary))
}

pub fn infer_placeholder() -> &'static str {
    "__INFER__"
}

pub fn infer_some_name() -> &'static str {
    "__INFER___Some"
}

pub fn infer_none_name() -> &'static str {
    "__INFER___None"
}

pub fn unwrap_placeholder() -> &'static str {
    "__UNWRAP__"
}

pub fn null_coalesce_placeholder() -> &'static str {
    "__NULL_COALESCE__"
}

pub fn match_temp_name(id: u32) -> String {
    format!("__match_{}", id)
}

pub fn tmp_name(n: u32) -> String {
    format!("__tmp{}", n)
}

pub fn err_name(n: u32) -> String {
    format!("__err{}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_tuple_literal_placeholder() {
        let name = tuple_literal_name(2, "int,string");
        assert!(is_placeholder(&name));
        assert!(name.starts_with("__TUPLE_2__LITERAL__"));
    }

    #[test]
    fn recognizes_infer_and_unwrap_and_match_and_temp_names() {
        assert!(is_placeholder(infer_placeholder()));
        assert!(is_placeholder(unwrap_placeholder()));
        assert!(is_placeholder(&match_temp_name(4)));
        assert!(is_placeholder(&tmp_name(0)));
        assert!(is_placeholder(&err_name(0)));
    }

    #[test]
    fn rejects_ordinary_identifiers() {
        assert!(!is_placeholder("myVariable"));
        assert!(!is_placeholder("TempValue"));
    }

    #[test]
    fn identical_shapes_hash_identically() {
        assert_eq!(tuple_hash("int,string"), tuple_hash("int,string"));
        assert_ne!(tuple_hash("int,string"), tuple_hash("string,int"));
    }
}
