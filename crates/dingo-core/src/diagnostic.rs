//! Caret-rendered diagnostic formatting for [`crate::error::TranspileError`].

use crate::error::{ErrorKind, TranspileError};
use colored::Colorize;
use std::fmt;

/// Error category for diagnostic classification, driving the header tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Ambiguity,
    Type,
    Resolution,
    Internal,
}

impl ErrorCategory {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Ambiguity => "ambiguity",
            Self::Type => "type",
            Self::Resolution => "resolution",
            Self::Internal => "internal",
        }
    }
}

fn categorize(kind: &ErrorKind) -> (ErrorCategory, Option<String>, Option<String>) {
    match kind {
        ErrorKind::Syntax(_) => (ErrorCategory::Syntax, None, None),
        ErrorKind::TupleArity(msg) => (
            ErrorCategory::Syntax,
            None,
            Some(remediation_for_tuple_arity(msg)),
        ),
        ErrorKind::Ambiguity { candidates, .. } => (
            ErrorCategory::Ambiguity,
            Some(format!("candidates: {}", candidates.join(", "))),
            Some("qualify the call explicitly, e.g. `pkg.Name(...)`".to_string()),
        ),
        ErrorKind::NonExhaustiveMatch(missing) => (
            ErrorCategory::Type,
            Some(format!("missing pattern(s): {}", missing.join(", "))),
            Some(format!(
                "add an arm for {} or a wildcard `_` arm",
                missing.join(", ")
            )),
        ),
        ErrorKind::PatternTypeMismatch(msg) => (ErrorCategory::Type, Some(msg.clone()), None),
        ErrorKind::NullCoalesceMismatch(msg) => (ErrorCategory::Type, Some(msg.clone()), None),
        ErrorKind::WildcardInBindingPosition => (
            ErrorCategory::Type,
            None,
            Some("use a named binding, or `_` only to ignore a field".to_string()),
        ),
        ErrorKind::InvalidGuard(msg) => (ErrorCategory::Type, Some(msg.clone()), None),
        ErrorKind::UnresolvedSafeNav => (
            ErrorCategory::Resolution,
            None,
            Some("add an explicit annotation to the chain's root".to_string()),
        ),
        ErrorKind::UnresolvedInfer(name) => (
            ErrorCategory::Resolution,
            None,
            Some(format!("add explicit annotation: `let {}: Option<T> = ...`", name)),
        ),
        ErrorKind::Internal(_) => (ErrorCategory::Internal, None, None),
        ErrorKind::Configuration(msg) => (
            ErrorCategory::Internal,
            Some(msg.clone()),
            Some("check dingo.toml and any --flag=value overrides".to_string()),
        ),
    }
}

fn remediation_for_tuple_arity(msg: &str) -> String {
    if msg.contains('0') {
        "empty tuples are not supported".to_string()
    } else if msg.contains('1') {
        "remove the parentheses for a single-element tuple".to_string()
    } else {
        "tuples support at most 12 elements".to_string()
    }
}

/// A 3-line source context window with gutter line numbers.
#[derive(Debug, Clone)]
pub struct Snippet {
    pub before: Option<(usize, String)>,
    pub error_line: (usize, String),
    pub after: Option<(usize, String)>,
    pub caret_col: Option<usize>,
    pub caret_width: usize,
}

fn extract_snippet(source: &str, line: usize, column: Option<usize>, width: usize) -> Snippet {
    let lines: Vec<&str> = source.lines().collect();
    let idx = line.saturating_sub(1);
    let before = idx
        .checked_sub(1)
        .and_then(|i| lines.get(i))
        .map(|s| (line - 1, s.to_string()));
    let error_line = (line, lines.get(idx).copied().unwrap_or("").to_string());
    let after = lines.get(idx + 1).map(|s| (line + 1, s.to_string()));
    Snippet {
        before,
        error_line,
        after,
        caret_col: column,
        caret_width: width.max(1),
    }
}

/// A rich diagnostic with source context, rendered rustc-style.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub category: ErrorCategory,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub snippet: Option<Snippet>,
    pub note: Option<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn from_transpile_error(err: &TranspileError, source: Option<&str>) -> Self {
        let (category, note, help) = categorize(&err.kind);
        let (file, line, column, length) = match &err.location {
            Some(loc) => (
                Some(loc.file.clone()),
                Some(loc.line),
                Some(loc.column),
                loc.length,
            ),
            None => (None, None, None, 1),
        };
        let snippet = match (source, line) {
            (Some(src), Some(ln)) => Some(extract_snippet(src, ln, column, length)),
            _ => None,
        };
        Self {
            category,
            message: err.kind.to_string(),
            file,
            line,
            column,
            snippet,
            note,
            help,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {}",
            "error".red().bold(),
            self.category.tag().red(),
            self.message.bold()
        )?;
        writeln!(f)?;

        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(col)) => {
                writeln!(f, " {} {}:{}:{}", "-->".blue().bold(), file, line, col)?;
            }
            (Some(file), Some(line), None) => {
                writeln!(f, " {} {}:{}", "-->".blue().bold(), file, line)?;
            }
            (Some(file), None, None) => {
                writeln!(f, " {} {}", "-->".blue().bold(), file)?;
            }
            _ => {}
        }

        if let Some(ref snippet) = self.snippet {
            format_snippet(f, snippet)?;
        }

        if let Some(ref note) = self.note {
            writeln!(f, "  {}: {}", "note".yellow().bold(), note)?;
        }

        if let Some(ref help) = self.help {
            writeln!(f, "  {}: {}", "help".green().bold(), help)?;
        }

        Ok(())
    }
}

fn format_snippet(f: &mut fmt::Formatter<'_>, snippet: &Snippet) -> fmt::Result {
    let gutter_width = 4;

    if let Some((num, ref text)) = snippet.before {
        writeln!(
            f,
            " {:>gutter_width$} {} {}",
            num.to_string().blue().bold(),
            "|".blue().bold(),
            text,
            gutter_width = gutter_width
        )?;
    }

    let (num, ref text) = snippet.error_line;
    writeln!(
        f,
        " {:>gutter_width$} {} {}",
        num.to_string().blue().bold(),
        "|".blue().bold(),
        text,
        gutter_width = gutter_width
    )?;

    if let Some(col) = snippet.caret_col {
        let padding = col.saturating_sub(1);
        let carets = "^".repeat(snippet.caret_width.max(1));
        writeln!(
            f,
            " {:>gutter_width$} {} {}{}",
            "",
            "|".blue().bold(),
            " ".repeat(padding),
            carets.red().bold(),
            gutter_width = gutter_width
        )?;
    }

    if let Some((num, ref text)) = snippet.after {
        writeln!(
            f,
            " {:>gutter_width$} {} {}",
            num.to_string().blue().bold(),
            "|".blue().bold(),
            text,
            gutter_width = gutter_width
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_non_exhaustive_match_with_missing_patterns_note() {
        let err = TranspileError::new(ErrorKind::NonExhaustiveMatch(vec!["Err".to_string()]));
        let diag = Diagnostic::from_transpile_error(&err, None);
        let rendered = format!("{}", diag);
        assert!(rendered.contains("error[type]"));
        assert!(rendered.contains("Err"));
    }

    #[test]
    fn snippet_includes_surrounding_lines_and_caret() {
        let src = "line one\nline two\nline three\n";
        let snippet = extract_snippet(src, 2, Some(3), 1);
        assert_eq!(snippet.before.unwrap().1, "line one");
        assert_eq!(snippet.after.unwrap().1, "line three");
    }
}
