//! Output-target layout derived from the manifest's entry-point fields.
//!
//! Each bundle lands beside the path the manifest already declares for it:
//! the CommonJS bundle beside `main` (using `main`'s extension), the ES
//! Module bundle beside `module`, and type declarations beside `types`.

use std::path::{Path, PathBuf};

use crate::config::{OutputFormat, PackConfig, PkgJson};

/// Format of one emitted output target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Cjs,
    Esm,
    /// Type declaration bundle (`.d.ts`), one file per entry module.
    Dts,
}

/// One output the bundler should write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    /// Entry file-name pattern, e.g. `[name].cjs`.
    pub entry_file_names: String,
    pub format: TargetFormat,
}

/// Derive the targets to emit: a format is included only when it is both
/// requested by the aggregated options and declared by the manifest.
/// Declarations are gated solely on `types` being declared.
pub fn output_targets(pkg: &PkgJson, config: &PackConfig) -> Vec<OutputTarget> {
    let mut targets = Vec::new();

    if config.formats.contains(&OutputFormat::Cjs)
        && let Some(main) = pkg.main.as_deref()
    {
        targets.push(entry_target(main, TargetFormat::Cjs));
    }
    if config.formats.contains(&OutputFormat::Esm)
        && let Some(module) = pkg.module.as_deref()
    {
        targets.push(entry_target(module, TargetFormat::Esm));
    }
    if let Some(types) = pkg.types.as_deref() {
        targets.push(OutputTarget {
            dir: parent_dir(types),
            entry_file_names: "[name].d.ts".to_string(),
            format: TargetFormat::Dts,
        });
    }

    targets
}

/// Build a bundle target beside `declared`, reusing its extension.
fn entry_target(declared: &str, format: TargetFormat) -> OutputTarget {
    let extension = Path::new(declared)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| ".js".to_string());
    OutputTarget {
        dir: parent_dir(declared),
        entry_file_names: format!("[name]{extension}"),
        format,
    }
}

fn parent_dir(declared: &str) -> PathBuf {
    Path::new(declared)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::CliArgs;
    use crate::config::aggregate;
    use serde_json::json;

    fn pkg(value: serde_json::Value) -> PkgJson {
        serde_json::from_value(value).expect("manifest")
    }

    fn config_with_formats(formats: Option<&str>) -> PackConfig {
        let cli = CliArgs {
            formats: formats.map(str::to_string),
            ..CliArgs::default()
        };
        aggregate(&PkgJson::default(), &cli).expect("aggregate")
    }

    #[test]
    fn dual_format_package_gets_three_targets() {
        let pkg = pkg(json!({
            "main": "dist/cjs/index.cjs",
            "module": "dist/esm/index.mjs",
            "types": "dist/types/index.d.ts"
        }));
        let targets = output_targets(&pkg, &config_with_formats(None));

        assert_eq!(
            targets,
            vec![
                OutputTarget {
                    dir: PathBuf::from("dist/cjs"),
                    entry_file_names: "[name].cjs".to_string(),
                    format: TargetFormat::Cjs,
                },
                OutputTarget {
                    dir: PathBuf::from("dist/esm"),
                    entry_file_names: "[name].mjs".to_string(),
                    format: TargetFormat::Esm,
                },
                OutputTarget {
                    dir: PathBuf::from("dist/types"),
                    entry_file_names: "[name].d.ts".to_string(),
                    format: TargetFormat::Dts,
                },
            ]
        );
    }

    #[test]
    fn undeclared_entries_are_skipped() {
        let pkg = pkg(json!({"main": "dist/index.js"}));
        let targets = output_targets(&pkg, &config_with_formats(None));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].format, TargetFormat::Cjs);
        assert_eq!(targets[0].entry_file_names, "[name].js");
    }

    #[test]
    fn unrequested_formats_are_skipped_even_when_declared() {
        let pkg = pkg(json!({
            "main": "dist/cjs/index.cjs",
            "module": "dist/esm/index.mjs"
        }));
        let targets = output_targets(&pkg, &config_with_formats(Some("esm")));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].format, TargetFormat::Esm);
    }

    #[test]
    fn declarations_do_not_depend_on_formats() {
        let pkg = pkg(json!({"types": "dist/types/index.d.ts"}));
        let targets = output_targets(&pkg, &config_with_formats(Some("cjs")));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].format, TargetFormat::Dts);
    }
}
