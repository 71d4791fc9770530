//! Derivation of per-file transformer directives from the merged tsconfig.
//!
//! Pure translation layer: file identity plus compiler options in,
//! SWC-shaped directive out. No I/O and no failure path — absent
//! configuration yields permissive defaults.

use serde_json::{Value, json};
use std::path::Path;

use crate::config::CompilerOptions;

/// Syntax dialect the transformer should parse a file with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    TypeScript { tsx: bool },
    Ecmascript { jsx: bool },
}

impl Syntax {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ts") | Some("mts") | Some("cts") => Syntax::TypeScript { tsx: false },
            Some("tsx") => Syntax::TypeScript { tsx: true },
            Some("jsx") => Syntax::Ecmascript { jsx: true },
            _ => Syntax::Ecmascript { jsx: false },
        }
    }
}

/// The JSX runtime selection derived from `compilerOptions.jsx`.
///
/// The two automatic variants map to the React 17 transform; the
/// development variant additionally flags dev-mode output. Every other
/// mode (or none) selects the classic runtime with pragma passthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxRuntime {
    Automatic {
        import_source: Option<String>,
        development: bool,
    },
    Classic {
        pragma: Option<String>,
        pragma_frag: Option<String>,
    },
}

/// Instructions for transforming one source file.
///
/// Derived once per file from (file identity, merged config); carries no
/// independent lifecycle. Minification is always off here — it is staged
/// separately at chunk rendering, where the whole chunk is visible.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformDirective {
    pub filename: String,
    pub syntax: Syntax,
    pub jsx_runtime: JsxRuntime,
    pub decorators: bool,
    pub decorator_metadata: bool,
    pub external_helpers: bool,
    /// Target identifier, lower-cased per the transformer's convention.
    pub target: Option<String>,
    pub base_url: Option<String>,
    pub paths: Option<Value>,
}

impl TransformDirective {
    /// Derive the directive for `path` under the merged compiler options.
    pub fn derive(path: &Path, options: &CompilerOptions) -> Self {
        let jsx_mode = options.jsx.as_deref();
        let automatic = matches!(jsx_mode, Some("react-jsx") | Some("react-jsxdev"));

        let jsx_runtime = if automatic {
            JsxRuntime::Automatic {
                import_source: options.jsx_import_source.clone(),
                development: jsx_mode == Some("react-jsxdev"),
            }
        } else {
            JsxRuntime::Classic {
                pragma: options.jsx_factory.clone(),
                pragma_frag: options.jsx_fragment_factory.clone(),
            }
        };

        TransformDirective {
            filename: path.to_string_lossy().into_owned(),
            syntax: Syntax::from_path(path),
            jsx_runtime,
            decorators: options.experimental_decorators.unwrap_or(false),
            decorator_metadata: options.emit_decorator_metadata.unwrap_or(false),
            external_helpers: options.import_helpers.unwrap_or(false),
            target: options.target.as_deref().map(str::to_lowercase),
            base_url: options.base_url.clone(),
            paths: options
                .paths
                .as_ref()
                .map(|paths| serde_json::to_value(paths).unwrap_or(Value::Null)),
        }
    }

    /// Serialize to SWC-shaped options so the directive can be deep-merged
    /// over residual transformer configuration (directive wins).
    ///
    /// Absent directive fields are omitted entirely rather than emitted as
    /// null, so they never mask a residual configuration value.
    pub fn to_swc_options(&self) -> Value {
        let (syntax, tsx, jsx) = match self.syntax {
            Syntax::TypeScript { tsx } => ("typescript", Some(tsx), None),
            Syntax::Ecmascript { jsx } => ("ecmascript", None, Some(jsx)),
        };

        let react = match &self.jsx_runtime {
            JsxRuntime::Automatic {
                import_source,
                development,
            } => json!({
                "runtime": "automatic",
                "importSource": import_source,
                "development": development,
            }),
            JsxRuntime::Classic {
                pragma,
                pragma_frag,
            } => json!({
                "runtime": "classic",
                "pragma": pragma,
                "pragmaFrag": pragma_frag,
            }),
        };

        prune_nulls(json!({
            "filename": self.filename,
            // Minification happens at chunk rendering, never per file.
            "minify": false,
            "jsc": {
                "externalHelpers": self.external_helpers,
                "parser": {
                    "syntax": syntax,
                    "tsx": tsx,
                    "jsx": jsx,
                    "decorators": self.decorators,
                },
                "transform": {
                    "decoratorMetadata": self.decorator_metadata,
                    "react": react,
                },
                "target": self.target,
                "baseUrl": self.base_url,
                "paths": self.paths,
            },
        }))
    }
}

/// Recursively drop null-valued object entries.
fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, entry)| !entry.is_null())
                .map(|(key, entry)| (key, prune_nulls(entry)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_with_jsx(jsx: &str) -> CompilerOptions {
        CompilerOptions {
            jsx: Some(jsx.to_string()),
            ..CompilerOptions::default()
        }
    }

    #[test]
    fn syntax_follows_extension() {
        let opts = CompilerOptions::default();
        let ts = TransformDirective::derive(Path::new("src/a.ts"), &opts);
        assert_eq!(ts.syntax, Syntax::TypeScript { tsx: false });

        let tsx = TransformDirective::derive(Path::new("src/a.tsx"), &opts);
        assert_eq!(tsx.syntax, Syntax::TypeScript { tsx: true });

        let jsx = TransformDirective::derive(Path::new("src/a.jsx"), &opts);
        assert_eq!(jsx.syntax, Syntax::Ecmascript { jsx: true });

        let js = TransformDirective::derive(Path::new("src/a.mjs"), &opts);
        assert_eq!(js.syntax, Syntax::Ecmascript { jsx: false });
    }

    #[test]
    fn react_jsx_selects_automatic_runtime_without_development() {
        let directive =
            TransformDirective::derive(Path::new("src/a.tsx"), &options_with_jsx("react-jsx"));
        assert_eq!(
            directive.jsx_runtime,
            JsxRuntime::Automatic {
                import_source: None,
                development: false
            }
        );
    }

    #[test]
    fn react_jsxdev_sets_the_development_flag() {
        let mut options = options_with_jsx("react-jsxdev");
        options.jsx_import_source = Some("preact".to_string());
        let directive = TransformDirective::derive(Path::new("src/a.tsx"), &options);
        assert_eq!(
            directive.jsx_runtime,
            JsxRuntime::Automatic {
                import_source: Some("preact".to_string()),
                development: true
            }
        );
    }

    #[test]
    fn other_jsx_modes_select_classic_runtime() {
        for mode in ["react", "preserve", "react-native"] {
            let mut options = options_with_jsx(mode);
            options.jsx_factory = Some("h".to_string());
            options.jsx_fragment_factory = Some("Fragment".to_string());
            let directive = TransformDirective::derive(Path::new("src/a.tsx"), &options);
            assert_eq!(
                directive.jsx_runtime,
                JsxRuntime::Classic {
                    pragma: Some("h".to_string()),
                    pragma_frag: Some("Fragment".to_string())
                },
                "mode {mode}"
            );
        }
    }

    #[test]
    fn target_is_lowercased() {
        let options = CompilerOptions {
            target: Some("ES2020".to_string()),
            ..CompilerOptions::default()
        };
        let directive = TransformDirective::derive(Path::new("src/a.ts"), &options);
        assert_eq!(directive.target.as_deref(), Some("es2020"));
    }

    #[test]
    fn decorator_flags_pass_through() {
        let options = CompilerOptions {
            experimental_decorators: Some(true),
            emit_decorator_metadata: Some(true),
            ..CompilerOptions::default()
        };
        let directive = TransformDirective::derive(Path::new("src/a.ts"), &options);
        assert!(directive.decorators);
        assert!(directive.decorator_metadata);
    }

    #[test]
    fn swc_options_always_disable_minify_and_stamp_filename() {
        let directive =
            TransformDirective::derive(Path::new("src/a.ts"), &CompilerOptions::default());
        let swc = directive.to_swc_options();
        assert_eq!(swc["minify"], serde_json::json!(false));
        assert_eq!(swc["filename"], serde_json::json!("src/a.ts"));
        assert_eq!(swc.pointer("/jsc/parser/syntax"), Some(&serde_json::json!("typescript")));
    }
}
