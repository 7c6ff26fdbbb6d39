//! Lowers `match scrutinee { Pattern => body, ... }` blocks into a `switch`
//! over a tag field, with one `DINGO_PATTERN` marker per arm carrying the
//! binding names and optional guard for the AST-level sum-type plugin to
//! pick up. The enum a variant belongs to is resolved the same way the
//! AST-level registry resolves it: the four built-in names plus whatever
//! `DINGO_ENUM`/`DINGO_VARIANT` markers appear earlier in the file.

use super::ChainState;
use crate::error::TranspileResult;
use crate::placeholder::match_temp_name;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn tag_name(enum_name: &str, variant: &str) -> String {
    match (enum_name, variant) {
        ("Result", "Ok") => "ResultTagOk".to_string(),
        ("Result", "Err") => "ResultTagErr".to_string(),
        ("Option", "Some") => "OptionTagSome".to_string(),
        ("Option", "None") => "OptionTagNone".to_string(),
        _ => format!("{}Tag", variant),
    }
}

fn variant_enum_map(source: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("Some".to_string(), "Option".to_string());
    map.insert("None".to_string(), "Option".to_string());
    map.insert("Ok".to_string(), "Result".to_string());
    map.insert("Err".to_string(), "Result".to_string());

    static ENUM_RE: OnceLock<Regex> = OnceLock::new();
    static VARIANT_RE: OnceLock<Regex> = OnceLock::new();
    let enum_re = ENUM_RE.get_or_init(|| Regex::new(r"//\s*DINGO_ENUM:\s*(\w+)").unwrap());
    let variant_re =
        VARIANT_RE.get_or_init(|| Regex::new(r"//\s*DINGO_VARIANT:\s*(\w+)\(").unwrap());

    let mut current_enum: Option<String> = None;
    for line in source.lines() {
        if let Some(caps) = enum_re.captures(line) {
            current_enum = Some(caps[1].to_string());
            continue;
        }
        if let Some(caps) = variant_re.captures(line) {
            if let Some(ref enum_name) = current_enum {
                map.insert(caps[1].to_string(), enum_name.clone());
            }
        } else if !line.trim_start().starts_with("//") {
            current_enum = None;
        }
    }
    map
}

fn match_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<indent>\s*)match\s+(?P<scrutinee>[A-Za-z_][\w.]*)\s*\{\s*$").unwrap())
}

fn arm_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<indent>\s*)(?P<pattern>_|[A-Za-z_]\w*(?:\([^)]*\))?)(?:\s+if\s+(?P<guard>[^=]+?))?\s*=>\s*(?P<body>.+?),?\s*$",
        )
        .unwrap()
    })
}

fn switch_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<indent>\s*)switch\s+(?P<scrutinee>[A-Za-z_][\w.]*)\s*\{\s*$").unwrap()
    })
}

fn case_dot_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<indent>\s*)case\s+\.(?P<variant>[A-Za-z_]\w*)(?:\((?P<bindings>[^)]*)\))?(?:\s+(?:if|where)\s+(?P<guard>[^:]+?))?\s*:\s*(?P<inline>.*)$",
        )
        .unwrap()
    })
}

fn default_case_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<indent>\s*)default\s*:\s*(?P<inline>.*)$").unwrap())
}

/// Lowers `match scrutinee { Pat => body, ... }` blocks.
fn lower_match_dialect(source: &str, state: &mut ChainState) -> String {
    let enum_map = variant_enum_map(source);
    let mut out = Vec::new();
    let lines: Vec<&str> = source.lines().collect();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let Some(caps) = match_open_re().captures(line) else {
            out.push(line.to_string());
            i += 1;
            continue;
        };
        let indent = caps["indent"].to_string();
        let scrutinee = caps["scrutinee"].to_string();
        let id = state.next_marker_id();
        let temp = match_temp_name(id);

        out.push(format!("{}// DINGO_MATCH_START: {}", indent, scrutinee));
        out.push(format!("{}{} := {}", indent, temp, scrutinee));
        out.push(format!("{}switch {}.tag {{", indent, temp));

        i += 1;
        while i < lines.len() {
            let arm_line = lines[i];
            if arm_line.trim() == "}" {
                i += 1;
                break;
            }
            if let Some(arm_caps) = arm_re().captures(arm_line) {
                let pattern = arm_caps["pattern"].trim();
                let body = arm_caps["body"].trim();
                let guard = arm_caps.name("guard").map(|m| m.as_str().trim().to_string());
                let arm_indent = format!("{}\t", indent);

                if pattern == "_" {
                    out.push(format!("{}default:", indent));
                } else {
                    let (variant, bindings) = split_pattern(pattern);
                    let enum_name = enum_map.get(&variant).cloned().unwrap_or_default();
                    out.push(format!("{}case {}:", indent, tag_name(&enum_name, &variant)));
                    let pattern_comment = match &guard {
                        Some(g) => format!(
                            "{}// DINGO_PATTERN: {}({}) | GUARD: {}",
                            arm_indent,
                            variant,
                            bindings.join(", "),
                            g
                        ),
                        None => format!(
                            "{}// DINGO_PATTERN: {}({})",
                            arm_indent,
                            variant,
                            bindings.join(", ")
                        ),
                    };
                    out.push(pattern_comment);
                }
                out.push(format!("{}{}", arm_indent, body));
            } else {
                out.push(arm_line.to_string());
            }
            i += 1;
        }

        out.push(format!("{}}}", indent));
        out.push(format!("{}// DINGO_MATCH_END", indent));
    }
    out.join("\n")
}

/// Lowers `switch scrutinee { case .Pat(let x): body ... }` blocks. A plain
/// Go `switch` with no dot-variant case is passed through untouched: the
/// opener alone doesn't distinguish the two, so the whole block is buffered
/// first and only rewritten once a dot-variant arm confirms the dialect.
fn lower_switch_dialect(source: &str, state: &mut ChainState) -> String {
    let enum_map = variant_enum_map(source);
    let lines: Vec<&str> = source.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let Some(caps) = switch_open_re().captures(line) else {
            out.push(line.to_string());
            i += 1;
            continue;
        };
        let indent = caps["indent"].to_string();
        let scrutinee = caps["scrutinee"].to_string();

        let mut block_end = i + 1;
        let mut is_dialect = false;
        while block_end < lines.len() && lines[block_end].trim() != "}" {
            if case_dot_re().is_match(lines[block_end]) {
                is_dialect = true;
            }
            block_end += 1;
        }
        if !is_dialect || block_end >= lines.len() {
            out.push(line.to_string());
            i += 1;
            continue;
        }

        let id = state.next_marker_id();
        let temp = match_temp_name(id);
        let arm_indent = format!("{}\t", indent);

        out.push(format!("{}// DINGO_MATCH_START: {}", indent, scrutinee));
        out.push(format!("{}{} := {}", indent, temp, scrutinee));
        out.push(format!("{}switch {}.tag {{", indent, temp));

        for arm_line in &lines[i + 1..block_end] {
            if let Some(arm_caps) = case_dot_re().captures(arm_line) {
                let variant = arm_caps["variant"].to_string();
                let bindings: Vec<String> = arm_caps
                    .name("bindings")
                    .map(|m| m.as_str())
                    .unwrap_or("")
                    .split(',')
                    .map(|s| s.trim().trim_start_matches("let ").trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                let guard = arm_caps.name("guard").map(|m| m.as_str().trim().to_string());
                let enum_name = enum_map.get(&variant).cloned().unwrap_or_default();
                out.push(format!("{}case {}:", indent, tag_name(&enum_name, &variant)));
                let pattern_comment = match &guard {
                    Some(g) => format!(
                        "{}// DINGO_PATTERN: {}({}) | GUARD: {}",
                        arm_indent,
                        variant,
                        bindings.join(", "),
                        g
                    ),
                    None => format!(
                        "{}// DINGO_PATTERN: {}({})",
                        arm_indent,
                        variant,
                        bindings.join(", ")
                    ),
                };
                out.push(pattern_comment);
                let inline = arm_caps["inline"].trim();
                if !inline.is_empty() {
                    out.push(format!("{}{}", arm_indent, inline));
                }
            } else if let Some(arm_caps) = default_case_re().captures(arm_line) {
                out.push(format!("{}default:", indent));
                let inline = arm_caps["inline"].trim();
                if !inline.is_empty() {
                    out.push(format!("{}{}", arm_indent, inline));
                }
            } else {
                out.push((*arm_line).to_string());
            }
        }

        out.push(format!("{}}}", indent));
        out.push(format!("{}// DINGO_MATCH_END", indent));
        i = block_end + 1;
    }
    out.join("\n")
}

pub fn run(source: &str, state: &mut ChainState) -> TranspileResult<String> {
    let matched = lower_match_dialect(source, state);
    Ok(lower_switch_dialect(&matched, state))
}

fn split_pattern(pattern: &str) -> (String, Vec<String>) {
    match pattern.split_once('(') {
        Some((name, rest)) => {
            let body = rest.trim_end_matches(')');
            let bindings = if body.trim().is_empty() {
                Vec::new()
            } else {
                body.split(',').map(|s| s.trim().to_string()).collect()
            };
            (name.trim().to_string(), bindings)
        }
        None => (pattern.to_string(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_option_match_to_tag_switch() {
        let src = "match result {\n\tOk(v) => use(v),\n\tErr(e) => log(e),\n}\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("case ResultTagOk:"));
        assert!(out.contains("case ResultTagErr:"));
        assert!(out.contains("// DINGO_PATTERN: Ok(v)"));
        assert!(out.contains("// DINGO_MATCH_START: result"));
        assert!(out.contains("// DINGO_MATCH_END"));
    }

    #[test]
    fn resolves_user_declared_enum_from_markers_earlier_in_file() {
        let src = concat!(
            "// DINGO_ENUM: Shape\n",
            "// DINGO_VARIANT: Circle(radius)\n",
            "// DINGO_VARIANT: Empty()\n",
            "type Shape__dingo_sum struct{}\n",
            "match s {\n",
            "\tCircle(radius) => area(radius),\n",
            "\t_ => 0,\n",
            "}\n",
        );
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("case CircleTag:"));
        assert!(out.contains("default:"));
    }

    #[test]
    fn carries_a_guard_into_the_pattern_marker() {
        let src = "match opt {\n\tSome(v) if v > 0 => positive(v),\n\tNone() => zero(),\n}\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("GUARD: v > 0"));
    }

    #[test]
    fn lowers_dot_case_switch_to_tag_switch() {
        let src = "switch res {\ncase .Ok(let v):\n\tuse(v)\ndefault:\n\thandle()\n}\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("case ResultTagOk:"));
        assert!(out.contains("// DINGO_PATTERN: Ok(v)"));
        assert!(out.contains("use(v)"));
        assert!(out.contains("default:"));
        assert!(out.contains("handle()"));
        assert!(out.contains("// DINGO_MATCH_START: res"));
        assert!(out.contains("// DINGO_MATCH_END"));
    }

    #[test]
    fn leaves_an_ordinary_go_switch_untouched() {
        let src = "switch x {\ncase 1:\n\tfoo()\ndefault:\n\tbar()\n}\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert_eq!(out.trim_end(), src.trim_end());
    }

    #[test]
    fn carries_a_guard_into_the_dot_case_pattern_marker() {
        let src = "switch opt {\ncase .Some(let v) if v > 0:\n\tpositive(v)\ncase .None():\n\tzero()\n}\n";
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("GUARD: v > 0"));
        assert!(out.contains("case OptionTagSome:"));
        assert!(out.contains("case OptionTagNone:"));
    }

    #[test]
    fn resolves_user_declared_enum_for_dot_case_switch() {
        let src = concat!(
            "// DINGO_ENUM: Shape\n",
            "// DINGO_VARIANT: Circle(radius)\n",
            "// DINGO_VARIANT: Empty()\n",
            "type Shape__dingo_sum struct{}\n",
            "switch s {\n",
            "case .Circle(let radius):\n",
            "\tarea(radius)\n",
            "default:\n",
            "\t0\n",
            "}\n",
        );
        let out = run(src, &mut ChainState::new()).unwrap();
        assert!(out.contains("case CircleTag:"));
        assert!(out.contains("// DINGO_PATTERN: Circle(radius)"));
    }
}
