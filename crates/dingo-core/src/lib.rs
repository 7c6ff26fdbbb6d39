//! # Dingo Core - Transpilation Engine
//!
//! Converts Dingo source (a small Rust-flavored surface syntax) to the
//! Go-subset grammar [`dingo_goast`] parses and prints, by running a fixed
//! chain of text-level preprocessors ([`preprocess`]) ahead of an AST-level
//! plugin engine ([`dingo_analysis`]) that lowers sum-type matches, tuple
//! literals and safe-navigation chains the preprocessors left as markers
//! and placeholders.
//!
//! ## Example
//!
//! ```rust
//! use dingo_core::DingoPipeline;
//!
//! let pipeline = DingoPipeline::new();
//! let source = "package main\n\nfunc Greet() string {\n\treturn \"hi\"\n}\n";
//! let output = pipeline.transpile(source).unwrap();
//! assert!(output.generated.contains("func Greet"));
//! ```

pub mod diagnostic;
pub mod error;
pub mod marker;
pub mod orchestrator;
pub mod placeholder;
pub mod preprocess;
pub mod stdlib_registry;

use dingo_annotations::{Config, NilSafetyMode};

pub use diagnostic::{Diagnostic, ErrorCategory};
pub use error::{ErrorKind, ResultExt, SourceLocation, TranspileError, TranspileResult};
pub use orchestrator::TranspileOutput;

/// Main entry point for transpilation. Holds the per-run [`Config`]; stateless
/// beyond that, so a single instance transpiles any number of files.
#[derive(Debug, Clone, Default)]
pub struct DingoPipeline {
    config: Config,
}

impl DingoPipeline {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Builds a pipeline from CLI-style `--flag=value` pairs, surfacing a
    /// configuration error (exit code 3) rather than a transpilation error.
    pub fn from_flags(
        flags: std::collections::HashMap<String, String>,
    ) -> TranspileResult<Self> {
        let config = Config::from_flags(flags)?;
        Ok(Self::with_config(config))
    }

    pub fn from_toml(text: &str) -> TranspileResult<Self> {
        let config = Config::from_toml(text)?;
        Ok(Self::with_config(config))
    }

    pub fn nil_safety(&self) -> NilSafetyMode {
        self.config.nil_safety_checks
    }

    /// Transpiles one Dingo source file to Go-subset source text, plus the
    /// source map correlating the two. `anyhow::Result` at this crate
    /// boundary, matching the split between a precise internal error enum
    /// ([`TranspileResult`]) and an opaque public API.
    pub fn transpile(&self, source: &str) -> anyhow::Result<TranspileOutput> {
        self.transpile_precise(source).map_err(anyhow::Error::from)
    }

    /// Same transpilation, keeping the precise [`TranspileError`] for
    /// callers (like [`Self::transpile_or_diagnostic`]) that need its
    /// `kind`/`location` rather than an opaque `anyhow::Error`.
    fn transpile_precise(&self, source: &str) -> TranspileResult<TranspileOutput> {
        orchestrator::run(source, self.config.nil_safety_checks)
            .map_err(|e| e.with_context("while transpiling"))
    }

    /// Transpiles and renders any error as a caret-annotated diagnostic
    /// against the original source, the way a driver binary would report it.
    pub fn transpile_or_diagnostic(&self, source: &str) -> Result<TranspileOutput, Diagnostic> {
        self.transpile_precise(source)
            .map_err(|e| Diagnostic::from_transpile_error(&e, Some(source)))
    }
}
