//! Aggregation of build options from defaults, the manifest `pack` block,
//! and command-line flags.
//!
//! Precedence is CLI > manifest > built-in default, field by field: a later
//! source's present field always wins, absent fields fall through. The
//! merged record is validated before use; validation failure is fatal,
//! never a silent default substitution.

use serde::Deserialize;
use std::collections::BTreeSet;

use crate::cli::args::CliArgs;
use crate::config::pkg_json::PkgJson;
use crate::error::{PackError, Result};

pub const DEFAULT_TS_CONFIG: &str = "tsconfig.json";
pub const DEFAULT_INPUT_FILE: &str = "src/index.ts";
pub const DEFAULT_FORMATS: &str = "cjs,esm";

/// Bundle output formats tspack can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutputFormat {
    Cjs,
    Esm,
}

impl OutputFormat {
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "cjs" => Ok(OutputFormat::Cjs),
            "esm" => Ok(OutputFormat::Esm),
            other => Err(PackError::Validation(format!(
                "unrecognized output format '{other}' (expected 'cjs' or 'esm')"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Cjs => "cjs",
            OutputFormat::Esm => "esm",
        }
    }
}

/// The validated build options record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    pub help: bool,
    pub doctor: bool,
    pub ts_config: String,
    pub input_file: String,
    pub formats: BTreeSet<OutputFormat>,
}

/// The manifest's `pack` block, before validation.
///
/// All fields optional; `formats` is a comma-separated string, matching
/// the CLI flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PackOverrides {
    help: Option<bool>,
    doctor: Option<bool>,
    ts_config: Option<String>,
    input_file: Option<String>,
    formats: Option<String>,
}

/// Extract the `pack` block from the manifest, leniently.
///
/// A schema-invalid block is treated as absent so malformed unrelated
/// manifest fields never block a build. The drop is surfaced as a warning
/// rather than silently, so typos stay discoverable.
fn manifest_overrides(pkg: &PkgJson) -> PackOverrides {
    let Some(block) = pkg.pack.as_ref() else {
        return PackOverrides::default();
    };
    match serde_json::from_value(block.clone()) {
        Ok(overrides) => overrides,
        Err(error) => {
            tracing::warn!(%error, "ignoring malformed pack block in package.json");
            PackOverrides::default()
        }
    }
}

/// Split and validate a comma-separated format list.
pub fn parse_formats(source: &str) -> Result<BTreeSet<OutputFormat>> {
    let mut formats = BTreeSet::new();
    for token in source.split(',') {
        formats.insert(OutputFormat::parse(token.trim())?);
    }
    Ok(formats)
}

/// Merge defaults, the manifest `pack` block, and CLI flags into one
/// validated options record.
pub fn aggregate(pkg: &PkgJson, cli: &CliArgs) -> Result<PackConfig> {
    let manifest = manifest_overrides(pkg);

    let ts_config = cli
        .ts_config
        .clone()
        .or(manifest.ts_config)
        .unwrap_or_else(|| DEFAULT_TS_CONFIG.to_string());
    let input_file = cli
        .input_file
        .clone()
        .or(manifest.input_file)
        .unwrap_or_else(|| DEFAULT_INPUT_FILE.to_string());
    let formats_source = cli
        .formats
        .clone()
        .or(manifest.formats)
        .unwrap_or_else(|| DEFAULT_FORMATS.to_string());

    Ok(PackConfig {
        // --help never reaches aggregation (the parser exits first); the
        // manifest can still request it for tooling that embeds the driver.
        help: manifest.help.unwrap_or(false),
        doctor: cli.doctor || manifest.doctor.unwrap_or(false),
        ts_config,
        input_file,
        formats: parse_formats(&formats_source)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pkg_with_pack(pack: serde_json::Value) -> PkgJson {
        serde_json::from_value(json!({"name": "fixture", "pack": pack})).expect("manifest")
    }

    fn both_formats() -> BTreeSet<OutputFormat> {
        [OutputFormat::Cjs, OutputFormat::Esm].into_iter().collect()
    }

    #[test]
    fn defaults_apply_when_all_sources_are_silent() {
        let config = aggregate(&PkgJson::default(), &CliArgs::default()).expect("aggregate");
        assert!(!config.help);
        assert!(!config.doctor);
        assert_eq!(config.ts_config, DEFAULT_TS_CONFIG);
        assert_eq!(config.input_file, DEFAULT_INPUT_FILE);
        assert_eq!(config.formats, both_formats());
    }

    #[test]
    fn manifest_beats_default_per_field() {
        let pkg = pkg_with_pack(json!({
            "tsConfig": "tsconfig.build.json",
            "inputFile": "src/main.ts",
            "formats": "esm",
            "doctor": true
        }));
        let config = aggregate(&pkg, &CliArgs::default()).expect("aggregate");
        assert_eq!(config.ts_config, "tsconfig.build.json");
        assert_eq!(config.input_file, "src/main.ts");
        assert_eq!(config.formats, [OutputFormat::Esm].into_iter().collect());
        assert!(config.doctor);
    }

    #[test]
    fn cli_beats_manifest_per_field() {
        let pkg = pkg_with_pack(json!({
            "tsConfig": "tsconfig.build.json",
            "inputFile": "src/main.ts",
            "formats": "esm"
        }));
        let cli = CliArgs {
            ts_config: Some("tsconfig.release.json".to_string()),
            input_file: Some("src/lib.ts".to_string()),
            formats: Some("cjs".to_string()),
            ..CliArgs::default()
        };
        let config = aggregate(&pkg, &cli).expect("aggregate");
        assert_eq!(config.ts_config, "tsconfig.release.json");
        assert_eq!(config.input_file, "src/lib.ts");
        assert_eq!(config.formats, [OutputFormat::Cjs].into_iter().collect());
    }

    #[test]
    fn absent_cli_fields_fall_through_to_manifest() {
        let pkg = pkg_with_pack(json!({"inputFile": "src/main.ts"}));
        let cli = CliArgs {
            ts_config: Some("tsconfig.release.json".to_string()),
            ..CliArgs::default()
        };
        let config = aggregate(&pkg, &cli).expect("aggregate");
        assert_eq!(config.ts_config, "tsconfig.release.json");
        assert_eq!(config.input_file, "src/main.ts");
        assert_eq!(config.formats, both_formats());
    }

    #[test]
    fn comma_separated_formats_become_a_set() {
        assert_eq!(parse_formats("cjs,esm").expect("parse"), both_formats());
        assert_eq!(
            parse_formats("esm").expect("parse"),
            [OutputFormat::Esm].into_iter().collect()
        );
        // Duplicates collapse.
        assert_eq!(
            parse_formats("esm,esm").expect("parse"),
            [OutputFormat::Esm].into_iter().collect()
        );
    }

    #[test]
    fn unrecognized_format_token_fails_validation() {
        let err = parse_formats("cjs,umd").expect_err("should fail");
        assert!(matches!(err, PackError::Validation(_)), "{err}");
        assert!(err.to_string().contains("umd"));
    }

    #[test]
    fn unrecognized_format_from_manifest_fails_aggregation() {
        let pkg = pkg_with_pack(json!({"formats": "umd"}));
        let err = aggregate(&pkg, &CliArgs::default()).expect_err("should fail");
        assert!(matches!(err, PackError::Validation(_)), "{err}");
    }

    #[test]
    fn malformed_pack_block_is_treated_as_absent() {
        // inputFile has the wrong type; the whole block is dropped.
        let pkg = pkg_with_pack(json!({"inputFile": 42}));
        let config = aggregate(&pkg, &CliArgs::default()).expect("aggregate");
        assert_eq!(config.input_file, DEFAULT_INPUT_FILE);
    }

    #[test]
    fn doctor_flag_or_manifest_enables_doctor() {
        let cli = CliArgs {
            doctor: true,
            ..CliArgs::default()
        };
        let config = aggregate(&PkgJson::default(), &cli).expect("aggregate");
        assert!(config.doctor);
    }
}
