//! Package-health checks for publishable libraries.
//!
//! Every check is advisory: the doctor prints a verdict per rule and never
//! fails the process. Verdicts are three-valued since many rules only apply
//! once a related manifest field is declared.
//!
//! The predicates are separated from the printing so they stay testable.

use colored::Colorize;
use std::path::Path;

use crate::config::{
    DEFAULT_INPUT_FILE, DEFAULT_TS_CONFIG, PackConfig, PkgJson,
};

/// Verdict of a single check.
///
/// `Skipped` marks rules whose precondition is absent (for example an
/// extension check when the entry itself is undeclared) as well as
/// choices that are merely recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    Skipped,
}

impl Verdict {
    fn of(ok: bool) -> Self {
        if ok { Verdict::Pass } else { Verdict::Fail }
    }

    fn mark(self) -> colored::ColoredString {
        match self {
            Verdict::Pass => "✓".green(),
            Verdict::Fail => "✕".red(),
            Verdict::Skipped => "○".yellow(),
        }
    }
}

fn log_result(verdict: Verdict, message: &str) {
    println!(" {} - {}", verdict.mark(), message);
}

fn log_warning(message: &str) {
    println!("\n{}\n", message.yellow());
}

fn extension_of(declared: &str) -> Option<&str> {
    Path::new(declared).extension()?.to_str()
}

/// `"ES Module"` or `"Common JS"`, from the manifest's `type` field.
pub fn module_kind(pkg: &PkgJson) -> &'static str {
    if pkg.is_es_module() {
        "ES Module"
    } else {
        "Common JS"
    }
}

/// CJS entry declared. Optional for ES Module packages, mandatory
/// otherwise.
pub fn cjs_entry_declared(pkg: &PkgJson) -> Verdict {
    if pkg.is_es_module() && pkg.main.is_none() {
        return Verdict::Skipped;
    }
    Verdict::of(pkg.main.is_some())
}

/// `main` carries a CJS-safe extension. `.js` is only safe while the
/// package is not `"type": "module"`.
pub fn cjs_entry_extension(pkg: &PkgJson) -> Verdict {
    let Some(main) = pkg.main.as_deref() else {
        return Verdict::Skipped;
    };
    let ext = extension_of(main);
    if pkg.is_es_module() {
        Verdict::of(ext == Some("cjs"))
    } else {
        Verdict::of(matches!(ext, Some("cjs" | "js")))
    }
}

/// ESM entry declared. Only expected once the package opts into ESM by
/// either the `type` field or a `module` entry.
pub fn esm_entry_declared(pkg: &PkgJson) -> Verdict {
    if !pkg.is_es_module() && pkg.module.is_none() {
        return Verdict::Skipped;
    }
    Verdict::of(pkg.module.is_some())
}

/// `module` carries an ESM-safe extension, the mirror of the CJS rule.
pub fn esm_entry_extension(pkg: &PkgJson) -> Verdict {
    let Some(module) = pkg.module.as_deref() else {
        return Verdict::Skipped;
    };
    let ext = extension_of(module);
    if pkg.is_es_module() {
        Verdict::of(matches!(ext, Some("mjs" | "js")))
    } else {
        Verdict::of(ext == Some("mjs"))
    }
}

pub fn types_declared(pkg: &PkgJson) -> Verdict {
    if pkg.types.is_none() {
        return Verdict::Skipped;
    }
    Verdict::Pass
}

pub fn types_extension(pkg: &PkgJson) -> Verdict {
    let Some(types) = pkg.types.as_deref() else {
        return Verdict::Skipped;
    };
    Verdict::of(types.ends_with(".d.ts"))
}

/// The `files` allow-list is present and non-empty.
pub fn files_limited(pkg: &PkgJson) -> Verdict {
    Verdict::of(pkg.files.as_ref().is_some_and(|files| !files.is_empty()))
}

pub fn exports_root_declared(pkg: &PkgJson) -> Verdict {
    Verdict::of(pkg.exports_root().is_some())
}

fn exports_root_key(pkg: &PkgJson, key: &str) -> bool {
    pkg.exports_root().is_some_and(|root| root.get(key).is_some())
}

/// `exports["."].require` mirrors `main`, when `main` is declared.
pub fn exports_root_require(pkg: &PkgJson) -> Verdict {
    if pkg.main.is_none() {
        return Verdict::Skipped;
    }
    Verdict::of(exports_root_key(pkg, "require"))
}

/// `exports["."].import` mirrors `module`, when `module` is declared.
pub fn exports_root_import(pkg: &PkgJson) -> Verdict {
    if pkg.module.is_none() {
        return Verdict::Skipped;
    }
    Verdict::of(exports_root_key(pkg, "import"))
}

/// `exports["."].types` mirrors `types`, when `types` is declared.
pub fn exports_root_types(pkg: &PkgJson) -> Verdict {
    if pkg.types.is_none() {
        return Verdict::Skipped;
    }
    Verdict::of(exports_root_key(pkg, "types"))
}

/// Run every manifest rule and print the report.
pub fn run_doctor(pkg: &PkgJson) {
    println!("🩺 Running tspack: verifying package.json...\n");
    println!("{} Package Detected\n", module_kind(pkg));

    let cjs = cjs_entry_declared(pkg);
    log_result(cjs, "Exports Common JS");
    match cjs {
        Verdict::Fail => log_warning("Missing \"main\" property from package.json"),
        Verdict::Skipped => log_warning(
            "While optional for ES Module packages, omitting \"main\" can break \
             environments that have not adopted ESM yet.",
        ),
        Verdict::Pass => {}
    }

    let cjs_ext = cjs_entry_extension(pkg);
    if cjs_ext != Verdict::Skipped {
        log_result(cjs_ext, "Exported CJS Correct File Extension");
        if cjs_ext == Verdict::Fail {
            log_warning(
                "CommonJS exports can be \".cjs\", but \".js\" is considered ESM \
                 when \"type\": \"module\" exists in package.json",
            );
        }
    }

    log_result(esm_entry_declared(pkg), "Exports ES Module");

    let esm_ext = esm_entry_extension(pkg);
    if esm_ext != Verdict::Skipped {
        log_result(esm_ext, "Exported ES Module Correct File Extension");
        if esm_ext == Verdict::Fail {
            log_warning(
                "ES Module exports can be \".mjs\", but \".js\" is considered CJS \
                 when \"type\": \"module\" is omitted from package.json",
            );
        }
    }

    let types = types_declared(pkg);
    log_result(types, "Exports Types for developers");
    if types != Verdict::Pass {
        log_warning(
            "Exporting types, while optional, aids developers who consume your \
             library.\nAdd \"types\": \"<dist folder>/<types folder>/index.d.ts\" \
             to give them a hand!",
        );
    }

    let types_ext = types_extension(pkg);
    if types_ext != Verdict::Skipped {
        log_result(types_ext, "Exported Types Correct File Extension");
        if types_ext == Verdict::Fail {
            log_warning("Types exports should carry the extension \".d.ts\"");
        }
    }

    let files = files_limited(pkg);
    log_result(files, "Limited files packaged on release");
    if files == Verdict::Fail {
        log_warning(
            "To limit release size, only include the build folder via the \
             \"files\" property.\npackage.json and README.md are packaged \
             automatically.\n\ni.e.:\n{\n  \"files\": [\"dist\"]\n}",
        );
    }

    let root = exports_root_declared(pkg);
    log_result(root, "Additional bundler support - Root");
    if root == Verdict::Fail {
        log_warning(
            "Bundler support can be extended with \"exports\" in package.json.\n\
             A root exports property (\".\") tells the consuming resolver \
             whether to use CJS or ESM.",
        );
    }

    for (verdict, label, hint) in [
        (
            exports_root_require(pkg),
            "Additional bundler support - Root Common JS",
            "Point \"exports\" > \".\" > \"require\" at the Common JS bundle",
        ),
        (
            exports_root_import(pkg),
            "Additional bundler support - Root ES Modules",
            "Point \"exports\" > \".\" > \"import\" at the ES Module bundle",
        ),
        (
            exports_root_types(pkg),
            "Additional bundler support - Root Types",
            "Point \"exports\" > \".\" > \"types\" at the declaration file",
        ),
    ] {
        if verdict == Verdict::Skipped {
            continue;
        }
        log_result(verdict, label);
        if verdict == Verdict::Fail {
            log_warning(hint);
        }
    }
}

/// The input file was configured explicitly rather than defaulted.
pub fn input_file_configured(config: &PackConfig) -> Verdict {
    if config.input_file == DEFAULT_INPUT_FILE {
        Verdict::Skipped
    } else {
        Verdict::Pass
    }
}

pub fn input_file_exists(cwd: &Path, config: &PackConfig) -> Verdict {
    Verdict::of(cwd.join(&config.input_file).is_file())
}

/// The tsconfig path was configured explicitly rather than defaulted.
pub fn ts_config_configured(config: &PackConfig) -> Verdict {
    if config.ts_config == DEFAULT_TS_CONFIG {
        Verdict::Skipped
    } else {
        Verdict::Pass
    }
}

pub fn ts_config_exists(cwd: &Path, config: &PackConfig) -> Verdict {
    Verdict::of(cwd.join(&config.ts_config).is_file())
}

/// Run the aggregated-options rules and print the report.
pub fn inspect_pack_config(cwd: &Path, config: &PackConfig) {
    println!("{}", "📦 Verifying pack config...\n".green());

    let input = input_file_configured(config);
    log_result(input, "Input file configured");
    if input != Verdict::Pass {
        log_warning(&format!(
            "tspack is using its default input file ({DEFAULT_INPUT_FILE})"
        ));
    }
    log_result(input_file_exists(cwd, config), "Input file found");

    let ts = ts_config_configured(config);
    log_result(ts, "TypeScript configured");
    if ts != Verdict::Pass {
        log_warning(&format!(
            "tspack is using its default tsconfig path ({DEFAULT_TS_CONFIG})"
        ));
    }
    log_result(ts_config_exists(cwd, config), "tsconfig file found");
}
