//! Parsing and emission for the two marker-comment forms each preprocessor
//! pass leaves behind: a short form for simple bookkeeping, and a richer
//! `DINGO_<KIND>: <payload>` form for passes that need to hand structured
//! data to a later pass or to the AST-level plugin engine.

use std::fmt;

/// The short-form marker: `// dingo:<kind>:<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortMarker {
    pub kind: char,
    pub id: u32,
}

impl fmt::Display for ShortMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "// dingo:{}:{}", self.kind, self.id)
    }
}

pub fn parse_short(comment: &str) -> Option<ShortMarker> {
    let rest = comment.trim().strip_prefix("// dingo:")?;
    let mut parts = rest.splitn(2, ':');
    let kind = parts.next()?.chars().next()?;
    let id: u32 = parts.next()?.trim().parse().ok()?;
    Some(ShortMarker { kind, id })
}

/// The seven-line error-propagation expansion is bracketed by a start/end
/// pair sharing one id, so a later pass can find the whole block again.
pub fn start_marker(id: u32) -> String {
    ShortMarker { kind: 's', id }.to_string()
}

pub fn end_marker(id: u32) -> String {
    ShortMarker { kind: 'e', id }.to_string()
}

pub fn type_marker(id: u32) -> String {
    ShortMarker { kind: 't', id }.to_string()
}

/// The rich marker payloads emitted by the pattern-match and tuple passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichMarker {
    MatchStart { scrutinee: String },
    MatchEnd,
    Pattern { variant: String, bindings: Vec<String>, guard: Option<String> },
    TuplePattern { summary: String, arity: usize },
    TupleArm { pattern: String },
}

fn kind_and_payload(comment: &str) -> Option<(&str, &str)> {
    let rest = comment.trim().strip_prefix("// DINGO_")?;
    rest.split_once(':').map(|(k, v)| (k.trim(), v.trim()))
}

pub fn parse_rich(comment: &str) -> Option<RichMarker> {
    let (kind, payload) = kind_and_payload(comment)?;
    match kind {
        "MATCH_START" => Some(RichMarker::MatchStart {
            scrutinee: payload.to_string(),
        }),
        "MATCH_END" => Some(RichMarker::MatchEnd),
        "PATTERN" => parse_pattern_payload(payload),
        "TUPLE_PATTERN" => parse_tuple_pattern_payload(payload),
        "TUPLE_ARM" => Some(RichMarker::TupleArm {
            pattern: payload.to_string(),
        }),
        _ => None,
    }
}

fn parse_pattern_payload(payload: &str) -> Option<RichMarker> {
    let (call, guard) = match payload.split_once('|') {
        Some((call, rest)) => (call.trim(), rest.trim().strip_prefix("GUARD:").map(|g| g.trim().to_string())),
        None => (payload.trim(), None),
    };
    let (variant, rest) = call.split_once('(')?;
    let body = rest.strip_suffix(')')?;
    let bindings = if body.trim().is_empty() {
        Vec::new()
    } else {
        body.split(',').map(|s| s.trim().to_string()).collect()
    };
    Some(RichMarker::Pattern {
        variant: variant.trim().to_string(),
        bindings,
        guard,
    })
}

fn parse_tuple_pattern_payload(payload: &str) -> Option<RichMarker> {
    let (summary, arity_part) = payload.split_once('|')?;
    let arity: usize = arity_part.trim().strip_prefix("ARITY:")?.trim().parse().ok()?;
    Some(RichMarker::TuplePattern {
        summary: summary.trim().to_string(),
        arity,
    })
}

impl fmt::Display for RichMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RichMarker::MatchStart { scrutinee } => write!(f, "// DINGO_MATCH_START: {}", scrutinee),
            RichMarker::MatchEnd => write!(f, "// DINGO_MATCH_END"),
            RichMarker::Pattern { variant, bindings, guard } => {
                write!(f, "// DINGO_PATTERN: {}({})", variant, bindings.join(", "))?;
                if let Some(g) = guard {
                    write!(f, " | GUARD: {}", g)?;
                }
                Ok(())
            }
            RichMarker::TuplePattern { summary, arity } => {
                write!(f, "// DINGO_TUPLE_PATTERN: {} | ARITY: {}", summary, arity)
            }
            RichMarker::TupleArm { pattern } => write!(f, "// DINGO_TUPLE_ARM: {}", pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_short_marker() {
        let s = start_marker(3);
        let parsed = parse_short(&s).unwrap();
        assert_eq!(parsed, ShortMarker { kind: 's', id: 3 });
    }

    #[test]
    fn parses_pattern_with_guard() {
        let marker = "// DINGO_PATTERN: Some(v) | GUARD: v > 0";
        let parsed = parse_rich(marker).unwrap();
        assert_eq!(
            parsed,
            RichMarker::Pattern {
                variant: "Some".to_string(),
                bindings: vec!["v".to_string()],
                guard: Some("v > 0".to_string()),
            }
        );
    }

    #[test]
    fn parses_unit_pattern_without_guard() {
        let parsed = parse_rich("// DINGO_PATTERN: None()").unwrap();
        assert_eq!(
            parsed,
            RichMarker::Pattern {
                variant: "None".to_string(),
                bindings: Vec::new(),
                guard: None,
            }
        );
    }

    #[test]
    fn parses_tuple_pattern_and_arm() {
        let parsed = parse_rich("// DINGO_TUPLE_PATTERN: (a, b) | ARITY: 2").unwrap();
        assert_eq!(
            parsed,
            RichMarker::TuplePattern {
                summary: "(a, b)".to_string(),
                arity: 2,
            }
        );
        let arm = parse_rich("// DINGO_TUPLE_ARM: (0, _)").unwrap();
        assert_eq!(
            arm,
            RichMarker::TupleArm {
                pattern: "(0, _)".to_string()
            }
        );
    }
}
