//! The transpiler's error taxonomy and context-carrying error type.

use std::fmt;
use thiserror::Error;

/// Source location information for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The transpiler's error taxonomy.
#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("tuple arity out of range: {0}")]
    TupleArity(String),

    #[error("ambiguous unqualified call '{name}', candidates: {candidates:?}")]
    Ambiguity {
        name: String,
        candidates: Vec<String>,
    },

    #[error("non-exhaustive match, missing: {0:?}")]
    NonExhaustiveMatch(Vec<String>),

    #[error("pattern type mismatch: {0}")]
    PatternTypeMismatch(String),

    #[error("null-coalesce type mismatch: {0}")]
    NullCoalesceMismatch(String),

    #[error("wildcard used in binding position")]
    WildcardInBindingPosition,

    #[error("guard is not a valid boolean expression: {0}")]
    InvalidGuard(String),

    #[error("could not infer the leaf type of a safe-navigation chain")]
    UnresolvedSafeNav,

    #[error("could not infer a type for {0}; add an explicit annotation")]
    UnresolvedInfer(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ErrorKind {
    /// The driver-observable exit code a run should report when this is
    /// the only or most severe recorded error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Syntax(_) | ErrorKind::TupleArity(_) => 1,
            ErrorKind::Ambiguity { .. }
            | ErrorKind::NonExhaustiveMatch(_)
            | ErrorKind::PatternTypeMismatch(_)
            | ErrorKind::NullCoalesceMismatch(_)
            | ErrorKind::WildcardInBindingPosition
            | ErrorKind::InvalidGuard(_)
            | ErrorKind::UnresolvedSafeNav
            | ErrorKind::UnresolvedInfer(_)
            | ErrorKind::Internal(_) => 2,
            ErrorKind::Configuration(_) => 3,
        }
    }
}

/// Context-aware transpilation error: a kind plus an accumulated stack of
/// "while doing X" context frames, cheapest to read innermost-first.
#[derive(Debug, Error)]
pub struct TranspileError {
    pub kind: ErrorKind,
    pub location: Option<SourceLocation>,
    pub context: Vec<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TranspileError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: None,
            context: Vec::new(),
            source: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for TranspileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        if !self.context.is_empty() {
            write!(f, "\n\nContext:")?;
            for (i, ctx) in self.context.iter().enumerate() {
                write!(f, "\n  {}. {}", i + 1, ctx)?;
            }
        }
        Ok(())
    }
}

pub type TranspileResult<T> = Result<T, TranspileError>;

pub trait ResultExt<T> {
    fn with_context(self, ctx: impl Into<String>) -> TranspileResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<TranspileError>,
{
    fn with_context(self, ctx: impl Into<String>) -> TranspileResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }
}

impl From<dingo_annotations::ConfigError> for TranspileError {
    fn from(err: dingo_annotations::ConfigError) -> Self {
        TranspileError::new(ErrorKind::Configuration(err.to_string()))
    }
}

impl From<anyhow::Error> for TranspileError {
    fn from(err: anyhow::Error) -> Self {
        TranspileError::new(ErrorKind::Internal(err.to_string()))
    }
}

impl From<dingo_analysis::TransformError> for TranspileError {
    fn from(err: dingo_analysis::TransformError) -> Self {
        use dingo_analysis::TransformErrorKind as K;
        let kind = match err.kind {
            K::NonExhaustiveMatch(missing) => ErrorKind::NonExhaustiveMatch(missing),
            K::PatternTypeMismatch(msg) => ErrorKind::PatternTypeMismatch(msg),
            K::WildcardInBindingPosition => ErrorKind::WildcardInBindingPosition,
            K::InvalidGuard(msg) => ErrorKind::InvalidGuard(msg),
            K::UnresolvedSafeNav => ErrorKind::UnresolvedSafeNav,
            K::NullCoalesceMismatch(msg) => ErrorKind::NullCoalesceMismatch(msg),
            K::AmbiguousCall { name, candidates } => ErrorKind::Ambiguity { name, candidates },
            K::Internal(msg) => ErrorKind::Internal(msg),
        };
        let mut error = TranspileError::new(kind);
        if let Some(pos) = err.position {
            error = error.with_location(SourceLocation {
                file: String::new(),
                line: pos.line,
                column: pos.column,
                length: 1,
            });
        }
        error
    }
}

#[macro_export]
macro_rules! transpile_error {
    ($kind:expr) => {
        $crate::error::TranspileError::new($kind)
    };
    ($kind:expr, $($ctx:expr),+) => {{
        let mut err = $crate::error::TranspileError::new($kind);
        $(
            err = err.with_context($ctx);
        )+
        err
    }};
}

#[macro_export]
macro_rules! transpile_bail {
    ($kind:expr) => {
        return Err($crate::transpile_error!($kind))
    };
    ($kind:expr, $($ctx:expr),+) => {
        return Err($crate::transpile_error!($kind, $($ctx),+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_with_context_accumulates_frames() {
        let err = TranspileError::new(ErrorKind::Syntax("bad brace".to_string()))
            .with_context("while lowering a match")
            .with_context("in function 'run'");
        assert_eq!(err.context.len(), 2);
    }

    #[test]
    fn display_includes_location_and_context() {
        let loc = SourceLocation {
            file: "in.dg".to_string(),
            line: 3,
            column: 7,
            length: 1,
        };
        let err = TranspileError::new(ErrorKind::TupleArity("0".to_string()))
            .with_location(loc)
            .with_context("in tuple literal");
        let rendered = format!("{}", err);
        assert!(rendered.contains("in.dg:3:7"));
        assert!(rendered.contains("in tuple literal"));
    }

    #[test]
    fn exit_codes_match_the_documented_taxonomy() {
        assert_eq!(ErrorKind::Syntax("x".into()).exit_code(), 1);
        assert_eq!(ErrorKind::WildcardInBindingPosition.exit_code(), 2);
    }
}
