//! Rewrites bare, capital-letter-prefixed calls that resolve to a standard
//! library function (`ReadFile(...)` -> `os.ReadFile(...)`) so the import
//! block can be generated mechanically instead of hand-maintained. A call is
//! left alone if it is already qualified (`pkg.Name(...)`), if it names a
//! function or method declared in this file, or if it doesn't match any
//! entry in the registry (most likely a sum-type constructor or a plugin
//! placeholder, both of which are capitalized too).

use super::ChainState;
use crate::error::{ErrorKind, TranspileError, TranspileResult};
use crate::stdlib_registry::StdlibRegistry;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn local_func_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^func\s+([A-Za-z_]\w*)\s*\(").unwrap())
}

fn bare_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|[^.\w])([A-Z]\w*)\(").unwrap())
}

fn local_declarations(source: &str) -> HashSet<String> {
    source
        .lines()
        .filter_map(|line| local_func_re().captures(line.trim_start()))
        .map(|caps| caps[1].to_string())
        .collect()
}

pub fn run(source: &str, state: &mut ChainState) -> TranspileResult<String> {
    let locals = local_declarations(source);
    let mut out = Vec::new();
    for line in source.lines() {
        if line.trim_start().starts_with("func ") {
            out.push(line.to_string());
            continue;
        }
        let mut rewritten = line.to_string();
        let names: Vec<String> = bare_call_re()
            .captures_iter(line)
            .map(|c| c[1].to_string())
            .collect();
        for name in names {
            if locals.contains(&name) || name.contains('_') {
                continue;
            }
            let candidates = StdlibRegistry::candidates(&name);
            match candidates.len() {
                0 => continue,
                1 => {
                    let entry = &candidates[0];
                    let pattern = Regex::new(&format!(r"(?:^|[^.\w]){}\(", regex::escape(&name)))
                        .unwrap();
                    rewritten = pattern
                        .replace_all(&rewritten, |caps: &regex::Captures| {
                            caps[0].replacen(&name, &format!("{}.{}", entry.package, name), 1)
                        })
                        .into_owned();
                    state.needed_imports.insert(entry.import_path.to_string());
                }
                _ => {
                    return Err(TranspileError::new(ErrorKind::Ambiguity {
                        name: name.clone(),
                        candidates: candidates
                            .iter()
                            .map(|c| format!("{}.{}", c.package, name))
                            .collect(),
                    }));
                }
            }
        }
        out.push(rewritten);
    }
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifies_an_unambiguous_bare_stdlib_call() {
        let out = run("data := ReadFile(path)\n", &mut ChainState::new()).unwrap();
        assert!(out.contains("os.ReadFile(path)"));
    }

    #[test]
    fn leaves_locally_declared_functions_untouched() {
        let src = "func ReadFile(p string) {}\nx := ReadFile(p)\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("x := ReadFile(p)"));
    }

    #[test]
    fn leaves_sum_type_constructors_untouched() {
        let out = run("v := Option_Some(1)\n", &mut ChainState::new()).unwrap();
        assert_eq!(out.trim_end(), "v := Option_Some(1)");
    }
}
