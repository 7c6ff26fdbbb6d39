//! The AST-level plugin engine: sum-type lowering, tuple synthesis,
//! safe-navigation IIFE resolution, `__INFER__` resolution and
//! null-coalesce lowering, run in sequence over one file's already-parsed
//! tree.

pub mod ast_build;
pub mod context;
pub mod option_plugin;
pub mod sumtype;
pub mod tuple_plugin;

use context::TransformContext;
use dingo_annotations::NilSafetyMode;
use dingo_goast::{Ast, TypeInfo};

pub use context::{TransformError, TransformErrorKind};
pub use sumtype::registry::SumTypeRegistry;

/// Outcome of running the plugin chain over one file.
pub struct AnalysisResult {
    pub registry: SumTypeRegistry,
    pub errors: Vec<TransformError>,
}

/// Runs every AST-level plugin over `ast` in the fixed order the
/// destructuring and synthesis steps depend on: sum-type lowering first (it
/// introduces the union structs tuple/option code may reference), then
/// tuple synthesis, then `__INFER__` resolution, then null-coalesce
/// lowering, finally splicing every plugin's queued declarations into file
/// scope in one pass.
#[tracing::instrument(skip(ast, type_info))]
pub fn run_plugins(
    ast: &mut Ast,
    type_info: Option<&TypeInfo>,
    nil_safety: NilSafetyMode,
) -> AnalysisResult {
    if type_info.is_none() {
        tracing::warn!("no TypeInfo supplied; safe-nav and infer resolution degrade to best-effort");
    }
    let mut ctx = TransformContext::new(ast, type_info);
    let registry = sumtype::run(&mut ctx, nil_safety);
    tuple_plugin::run(&mut ctx);
    option_plugin::resolve_safe_nav_iifes(&mut ctx);
    option_plugin::resolve_infer_types(&mut ctx);
    option_plugin::lower_null_coalesce(&mut ctx);
    let errors = std::mem::take(&mut ctx.errors);
    ctx.flush_pending_decls();
    tracing::debug!(enum_count = registry.iter().count(), errors = errors.len(), "plugin chain finished");
    AnalysisResult { registry, errors }
}
