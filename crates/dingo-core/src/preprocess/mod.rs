//! The seven text-level preprocessing passes, run in fixed order before the
//! result ever reaches a parser. Each pass is a pure `&str -> String`
//! rewrite; passes that need to correlate positions across the pipeline do
//! so by leaving marker comments (see [`crate::marker`]) for whoever reads
//! them next — another pass, the AST plugin engine, or the final source map.

pub mod error_propagation;
pub mod keywords;
pub mod pattern_match;
pub mod safe_nav;
pub mod stdlib_calls;
pub mod tuples;
pub mod type_annotations;

use crate::error::TranspileResult;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Threaded through the whole chain: per-function-scoped counters for
/// marker/temporary ids, and the set of stdlib import paths later passes
/// discover they need, for the orchestrator to splice into the import
/// block. Every counter here resets to 0 at each `func` declaration a pass
/// crosses, via [`ChainState::notice_line`]: counters are scoped to the
/// enclosing function, never to the file.
#[derive(Debug, Default)]
pub struct ChainState {
    next_id: u32,
    next_tuple_temp_id: u32,
    pub needed_imports: BTreeSet<String>,
}

fn func_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^func\s+(?:\([^)]*\)\s*)?[A-Za-z_][A-Za-z0-9_]*\(").unwrap()
    })
}

/// True for a line that opens a named function or method declaration, as
/// opposed to an anonymous `func(...) {...}` literal embedded in an
/// expression. The point at which every per-function counter starts over.
pub fn starts_function(line: &str) -> bool {
    func_decl_re().is_match(line.trim_start())
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_marker_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// `tmp`, `tmp1`, `tmp2`, ... — the tuple-destructure temporary
    /// namespace, kept separate from `next_marker_id`'s `__tmp<n>`/`__err<n>`
    /// (error propagation) namespace so the two never collide and never
    /// share a counter.
    pub fn next_tuple_temp(&mut self) -> String {
        let n = self.next_tuple_temp_id;
        self.next_tuple_temp_id += 1;
        if n == 0 {
            "tmp".to_string()
        } else {
            format!("tmp{}", n)
        }
    }

    /// Called by a pass's line-scan whenever it crosses into a new `func`
    /// declaration, zeroing every counter a pass owns so each function
    /// starts its temporaries over at 0.
    pub fn notice_line(&mut self, line: &str) {
        if starts_function(line) {
            self.next_id = 0;
            self.next_tuple_temp_id = 0;
        }
    }
}

#[tracing::instrument(skip(source), fields(source_len = source.len()))]
pub fn run_chain(source: &str) -> TranspileResult<(String, ChainState)> {
    let mut state = ChainState::new();
    let mut text = type_annotations::run(source, &mut state)?;
    text = error_propagation::run(&text, &mut state)?;
    text = keywords::run(&text)?;
    text = tuples::run(&text, &mut state)?;
    text = pattern_match::run(&text, &mut state)?;
    text = safe_nav::run(&text)?;
    text = stdlib_calls::run(&text, &mut state)?;
    Ok((text, state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_survives_the_whole_chain() {
        let (out, _state) = run_chain("").unwrap();
        assert_eq!(out, "");
    }
}
