//! The plugin surface handed to the external bundler.
//!
//! Three hook points: `resolve_id` during the graph walk, `transform` per
//! file (possibly concurrent across files), and `render_chunk` once per
//! final chunk. Hooks are stateless with respect to one another; the only
//! shared state is the unresolved-import accumulator the bundler feeds
//! through [`PackPlugin::note_external`].

use dashmap::DashSet;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};

use crate::bundling::resolver::{is_script_path, resolve_relative};
use crate::bundling::transform::TransformDirective;
use crate::bundling::{TransformOutput, TransformService};
use crate::config::{CompilerOptions, merge};
use crate::error::{PackError, Result};

/// Outcome of a plugin hook.
///
/// `Unchanged` defers to the bundler's default behaviour; it is distinct
/// from "transformed to empty", which would be `Replaced` with empty
/// content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookResult<T> {
    Unchanged,
    Replaced(T),
}

impl<T> HookResult<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, HookResult::Unchanged)
    }

    pub fn replaced(self) -> Option<T> {
        match self {
            HookResult::Unchanged => None,
            HookResult::Replaced(value) => Some(value),
        }
    }
}

/// Marker prefix for synthetic modules owned by other plugins.
const SYNTHETIC_PREFIX: char = '\0';

/// The bundler plugin: custom resolution, tsconfig-driven transformation,
/// and the chunk-level minification gate.
pub struct PackPlugin<S> {
    service: S,
    compiler_options: CompilerOptions,
    /// Residual externally supplied transformer configuration; the derived
    /// directive wins on overlapping keys.
    swc_config: Value,
    externals: DashSet<String>,
}

impl<S: TransformService> PackPlugin<S> {
    pub fn new(service: S, compiler_options: CompilerOptions, swc_config: Value) -> Self {
        PackPlugin {
            service,
            compiler_options,
            swc_config,
            externals: DashSet::new(),
        }
    }

    /// Resolve hook. Synthetic specifiers belong to other plugins; bare
    /// specifiers defer to the bundler; relative specifiers go through the
    /// extension-probing resolver.
    pub fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&Path>,
    ) -> Result<HookResult<PathBuf>> {
        if specifier.starts_with(SYNTHETIC_PREFIX) {
            return Ok(HookResult::Unchanged);
        }
        let Some(importer) = importer else {
            return Ok(HookResult::Unchanged);
        };
        match resolve_relative(importer, specifier)? {
            Some(path) => Ok(HookResult::Replaced(path)),
            None => Ok(HookResult::Unchanged),
        }
    }

    /// Transform hook. Excluded files pass through unchanged; everything
    /// else is delegated to the transform service under the merged
    /// directive. A service failure is fatal for the build — shipping
    /// unprocessed TypeScript would be silently broken output.
    pub fn transform(&self, code: &str, id: &Path) -> Result<HookResult<TransformOutput>> {
        if !self.filter_includes(id) {
            return Ok(HookResult::Unchanged);
        }

        let directive = TransformDirective::derive(id, &self.compiler_options);
        let mut options = merge(self.swc_config.clone(), directive.to_swc_options());
        // Minification is staged at render_chunk; residual jsc.minify must
        // not reach the per-file transform.
        if let Some(jsc) = options.pointer_mut("/jsc").and_then(Value::as_object_mut) {
            jsc.remove("minify");
        }

        tracing::debug!(file = %id.display(), "transforming");
        let output =
            self.service
                .transform(code, &options)
                .map_err(|err| PackError::Transform {
                    file: id.display().to_string(),
                    message: format!("{err:#}"),
                })?;
        Ok(HookResult::Replaced(output))
    }

    /// Render hook: the minification gate. Runs once per final chunk,
    /// after every per-file transform for the target has completed.
    pub fn render_chunk(&self, code: &str) -> Result<HookResult<TransformOutput>> {
        if !minify_requested(&self.swc_config) {
            return Ok(HookResult::Unchanged);
        }

        let minify_options = self
            .swc_config
            .pointer("/jsc/minify")
            .cloned()
            .unwrap_or(Value::Null);
        let output = self
            .service
            .minify(code, &minify_options)
            .map_err(|err| PackError::Transform {
                file: "<chunk>".to_string(),
                message: format!("{err:#}"),
            })?;
        Ok(HookResult::Replaced(output))
    }

    /// Record a specifier the bundler left unresolved. Idempotent and safe
    /// under concurrent graph-walk callbacks.
    pub fn note_external(&self, specifier: &str) {
        self.externals.insert(specifier.to_string());
    }

    /// The accumulated unresolved imports, sorted for deterministic
    /// reporting.
    pub fn externals_sorted(&self) -> Vec<String> {
        let mut externals: Vec<String> = self
            .externals
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        externals.sort();
        externals
    }

    /// Default inclusion filter: script-like extensions, minus anything
    /// under the dependency-storage directory.
    fn filter_includes(&self, id: &Path) -> bool {
        if !is_script_path(id) {
            return false;
        }
        !id.components()
            .any(|component| component == Component::Normal("node_modules".as_ref()))
    }
}

/// Whether the residual transformer configuration requests minification:
/// a top-level `minify`, or a nested `jsc.minify.mangle`/`compress`.
fn minify_requested(swc_config: &Value) -> bool {
    if is_truthy(swc_config.get("minify")) {
        return true;
    }
    is_truthy(swc_config.pointer("/jsc/minify/mangle"))
        || is_truthy(swc_config.pointer("/jsc/minify/compress"))
}

/// JavaScript-style truthiness: the source configuration format treats an
/// empty options object (e.g. `"mangle": {}`) as enabling the feature.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
