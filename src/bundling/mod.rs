//! The bridge between resolved configuration and the external bundler.
//!
//! The module-graph builder and the syntax transformer are collaborators,
//! not residents: they appear here only as the [`Bundler`] and
//! [`TransformService`] traits. tspack contributes the plugin hook points
//! a Rollup-style bundler invokes during a build (resolve, transform,
//! render) and the output-target layout derived from the manifest.

pub mod outputs;
pub mod plugin;
pub mod resolver;
pub mod transform;

pub use outputs::{OutputTarget, TargetFormat, output_targets};
pub use plugin::{HookResult, PackPlugin};
pub use transform::TransformDirective;

use serde_json::Value;
use std::path::Path;

/// Output of one transform or minify delegation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    pub code: String,
    /// Source map, when the service produced one.
    pub map: Option<String>,
}

/// The external syntax transformer and minifier.
///
/// Both operations are potentially blocking and may be invoked for many
/// files concurrently; implementations must be `Sync`.
pub trait TransformService: Sync {
    /// Transform one file's source under SWC-shaped `options`.
    fn transform(&self, code: &str, options: &Value) -> anyhow::Result<TransformOutput>;

    /// Minify one finished chunk under `options` (the `jsc.minify` value).
    fn minify(&self, code: &str, options: &Value) -> anyhow::Result<TransformOutput>;
}

/// Timing report returned by the external bundler.
#[derive(Debug, Clone, Default)]
pub struct BundleReport {
    /// Milliseconds spent generating output, as reported by the bundler.
    pub generate_ms: f64,
}

/// The external module-graph builder and code generator.
///
/// Drives the plugin's hook points: `resolve_id` synchronously during the
/// graph walk, `transform` possibly concurrently across files, and
/// `render_chunk` once per final chunk after the whole graph for a target
/// is transformed. Specifiers it leaves unresolved are reported back
/// through [`PackPlugin::note_external`].
pub trait Bundler {
    fn bundle<S: TransformService>(
        &self,
        entry: &Path,
        plugin: &PackPlugin<S>,
        targets: &[OutputTarget],
    ) -> anyhow::Result<BundleReport>;
}
