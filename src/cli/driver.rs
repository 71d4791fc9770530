//! Build orchestration over the external bundler and transform service.
//!
//! The driver owns the sequencing: configuration resolution happens
//! completely before the first file is touched, and a failure in any single
//! file's transform aborts the whole build. A partially transformed output
//! is strictly worse than none.

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::bundling::{Bundler, PackPlugin, TransformService, output_targets};
use crate::cli::args::CliArgs;
use crate::config::{self, PackConfig, PkgJson, tsconfig};

/// File holding residual externally supplied transformer configuration.
const SWC_CONFIG_FILE: &str = ".swcrc";

/// Everything resolved before any source file is processed.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub pkg: PkgJson,
    pub config: PackConfig,
    /// The fully merged tsconfig chain.
    pub ts_config: Value,
}

/// Outcome of a completed build, for reporting.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub generate_ms: f64,
    /// Imports the bundler left external, minus node builtins and declared
    /// dependencies, sorted lexically.
    pub external_imports: Vec<String>,
}

/// Resolve manifest, aggregated options, and the tsconfig chain.
///
/// Any failure here is fatal and happens before the bundler sees a single
/// file.
pub fn resolve_project(cwd: &Path, args: &CliArgs) -> Result<ResolvedProject> {
    let pkg = config::load_pkg_json(cwd)?;
    let config = config::aggregate(&pkg, args)?;
    let ts_config = config::load_tsconfig(cwd, &config.ts_config)?;
    Ok(ResolvedProject {
        pkg,
        config,
        ts_config,
    })
}

/// Load `.swcrc` if present, leniently: a missing or malformed file means
/// no residual transformer configuration.
fn load_swc_config(cwd: &Path) -> Value {
    let path = cwd.join(SWC_CONFIG_FILE);
    let Ok(source) = std::fs::read_to_string(&path) else {
        return Value::Object(Map::new());
    };
    match tsconfig::parse_tsconfig(&source) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%error, path = %path.display(), "ignoring malformed .swcrc");
            Value::Object(Map::new())
        }
    }
}

/// Run a full build: resolve configuration, assemble the plugin, hand the
/// entry point to the external bundler, and collect the advisory report.
pub fn run_build<B: Bundler, S: TransformService>(
    cwd: &Path,
    args: &CliArgs,
    bundler: &B,
    service: S,
) -> Result<BuildSummary> {
    let project = resolve_project(cwd, args)?;
    let compiler_options = config::compiler_options(&project.ts_config);
    let swc_config = load_swc_config(cwd);

    let plugin = PackPlugin::new(service, compiler_options, swc_config);
    let targets = output_targets(&project.pkg, &project.config);
    let entry = cwd.join(&project.config.input_file);

    tracing::info!(entry = %entry.display(), targets = targets.len(), "starting bundle");
    let report = bundler
        .bundle(&entry, &plugin, &targets)
        .context("bundle failed")?;

    Ok(BuildSummary {
        generate_ms: report.generate_ms,
        external_imports: advisory_externals(&project.pkg, plugin.externals_sorted()),
    })
}

/// Drop externals nobody needs to hear about: node builtins and imports
/// covered by a declared dependency.
fn advisory_externals(pkg: &PkgJson, externals: Vec<String>) -> Vec<String> {
    externals
        .into_iter()
        .filter(|specifier| !specifier.starts_with("node:"))
        .filter(|specifier| {
            !pkg.dependency_names().any(|dep| {
                specifier == dep || specifier.starts_with(&format!("{dep}/"))
            })
        })
        .collect()
}

/// Render the post-build report: timing, then the external-import advisory
/// when non-empty. Advisory only, it never affects exit status.
pub fn render_summary(summary: &BuildSummary) -> String {
    let mut out = format!("Bundles generated in {:.2} ms\n", summary.generate_ms);
    if summary.external_imports.is_empty() {
        return out;
    }
    out.push_str("Imports treated as external:\n");
    for specifier in &summary.external_imports {
        out.push_str(&format!("  {}\n", specifier.yellow()));
    }
    out
}

pub fn print_summary(summary: &BuildSummary) {
    print!("{}", render_summary(summary));
}
