//! Resolution of the tsconfig `extends` chain.
//!
//! A tsconfig may name a parent document to inherit from. The chain is
//! walked recursively, carrying the most-specific-so-far document as an
//! accumulator so the final merge order is strictly base-to-specific
//! regardless of chain depth. Parents win nothing: a child's scalar
//! overwrites, a child's array replaces wholesale (see
//! [`crate::config::merge`]).

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::merge;
use crate::error::{PackError, Result};

/// Key naming the parent document in the chain.
const EXTENDS_KEY: &str = "extends";

/// Dependency-storage directory probed for bare (non-relative) extends
/// references such as `@tsconfig/node18/tsconfig.json`.
const DEPENDENCY_DIR: &str = "node_modules";

/// Load and fully merge the tsconfig chain rooted at
/// `root_dir/entry_relative`.
///
/// Relative `extends` references (starting with `.`) resolve against
/// `root_dir`; bare references resolve under `root_dir/node_modules`.
/// The chain fails fast on a revisited document instead of recursing
/// forever.
pub fn load_tsconfig(root_dir: &Path, entry_relative: &str) -> Result<Value> {
    let mut visited = HashSet::new();
    load_chain(
        root_dir,
        Path::new(entry_relative),
        Value::Object(Map::new()),
        &mut visited,
    )
}

fn load_chain(
    root_dir: &Path,
    entry: &Path,
    accumulated: Value,
    visited: &mut HashSet<PathBuf>,
) -> Result<Value> {
    let path = root_dir.join(entry);
    let canonical = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    if !visited.insert(canonical) {
        return Err(PackError::ExtendsCycle { path });
    }

    tracing::debug!(path = %path.display(), "loading tsconfig");
    let source = std::fs::read_to_string(&path).map_err(|source| PackError::ConfigNotFound {
        path: path.clone(),
        source,
    })?;
    let mut document = parse_tsconfig(&source).map_err(|source| PackError::ConfigParse {
        path: path.clone(),
        source,
    })?;

    let extends = take_extends(&mut document);
    let Some(extends) = extends else {
        // Base of the chain; everything accumulated so far is more specific.
        return Ok(merge(document, accumulated));
    };

    let accumulated = merge(document, accumulated);
    let parent: PathBuf = if extends.starts_with('.') {
        PathBuf::from(&extends)
    } else {
        Path::new(DEPENDENCY_DIR).join(&extends)
    };
    load_chain(root_dir, &parent, accumulated, visited)
}

/// Strip the `extends` key, returning its value when it names a parent.
///
/// A non-string `extends` does not start a chain and stays in the document
/// untouched, matching the lenient read everywhere else in this layer.
fn take_extends(document: &mut Value) -> Option<String> {
    let object = document.as_object_mut()?;
    match object.get(EXTENDS_KEY) {
        Some(Value::String(_)) => match object.remove(EXTENDS_KEY) {
            Some(Value::String(reference)) => Some(reference),
            _ => None,
        },
        _ => None,
    }
}

/// Parse tsconfig source, tolerating JSONC comments and trailing commas.
pub fn parse_tsconfig(source: &str) -> serde_json::Result<Value> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    serde_json::from_str(&normalized)
}

/// The compilerOptions fields the transform bridge consumes.
///
/// Deserialized leniently from the merged chain: a malformed
/// `compilerOptions` block falls back to defaults rather than failing the
/// build, so the bridge itself has no failure path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub jsx: Option<String>,
    pub jsx_factory: Option<String>,
    pub jsx_fragment_factory: Option<String>,
    pub jsx_import_source: Option<String>,
    pub experimental_decorators: Option<bool>,
    pub emit_decorator_metadata: Option<bool>,
    pub import_helpers: Option<bool>,
    pub target: Option<String>,
    pub base_url: Option<String>,
    pub paths: Option<BTreeMap<String, Vec<String>>>,
}

/// Extract the typed compilerOptions view from a merged chain.
pub fn compiler_options(merged: &Value) -> CompilerOptions {
    let Some(block) = merged.get("compilerOptions") else {
        return CompilerOptions::default();
    };
    match serde_json::from_value(block.clone()) {
        Ok(options) => options,
        Err(error) => {
            tracing::warn!(%error, "ignoring malformed compilerOptions block");
            CompilerOptions::default()
        }
    }
}

/// Remove `//` and `/* */` comments outside of string literals.
fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut last_was_star = false;
                for next in chars.by_ref() {
                    if last_was_star && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    last_was_star = next == '*';
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Remove commas immediately preceding a closing `}` or `]`.
fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }

        if ch == ',' {
            let mut lookahead = chars.clone();
            let mut next_significant = None;
            while let Some(&next) = lookahead.peek() {
                if next.is_whitespace() {
                    lookahead.next();
                    continue;
                }
                next_significant = Some(next);
                break;
            }
            if matches!(next_significant, Some('}') | Some(']')) {
                continue;
            }
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).expect("failed to write test file");
    }

    #[test]
    fn parses_jsonc_with_comments_and_trailing_commas() {
        let input = r#"
        {
          // line comment
          "compilerOptions": {
            "target": "es2017", /* inline */
            "jsx": "react-jsx",
          },
          "include": ["src/**/*",],
        }
        "#;

        let document = parse_tsconfig(input).expect("should parse JSONC");
        assert_eq!(
            document.pointer("/compilerOptions/target"),
            Some(&json!("es2017"))
        );
        assert_eq!(document["include"], json!(["src/**/*"]));
    }

    #[test]
    fn slashes_inside_strings_survive() {
        let document = parse_tsconfig(r#"{"outDir": "dist//build"}"#).expect("should parse");
        assert_eq!(document["outDir"], json!("dist//build"));
    }

    #[test]
    fn document_without_extends_returns_itself() {
        let temp = TempDir::new().expect("temp dir");
        write_file(
            temp.path(),
            "tsconfig.json",
            r#"{"compilerOptions": {"target": "es2022"}}"#,
        );

        let merged = load_tsconfig(temp.path(), "tsconfig.json").expect("should load");
        assert_eq!(merged, json!({"compilerOptions": {"target": "es2022"}}));
    }

    #[test]
    fn extends_chain_merges_base_to_specific() {
        let temp = TempDir::new().expect("temp dir");
        write_file(
            temp.path(),
            "tsconfig.base.json",
            r#"{
              "compilerOptions": {"target": "es2015", "strict": true, "lib": ["es2015", "dom"]}
            }"#,
        );
        write_file(
            temp.path(),
            "tsconfig.json",
            r#"{
              "extends": "./tsconfig.base.json",
              "compilerOptions": {"target": "es2022", "lib": ["es2022"]}
            }"#,
        );

        let merged = load_tsconfig(temp.path(), "tsconfig.json").expect("should load");
        assert_eq!(merged.pointer("/compilerOptions/target"), Some(&json!("es2022")));
        assert_eq!(merged.pointer("/compilerOptions/strict"), Some(&json!(true)));
        // Sequence values come wholly from the most specific document.
        assert_eq!(
            merged.pointer("/compilerOptions/lib"),
            Some(&json!(["es2022"]))
        );
    }

    #[test]
    fn depth_three_chain_prefers_most_specific() {
        let temp = TempDir::new().expect("temp dir");
        write_file(
            temp.path(),
            "a.json",
            r#"{"compilerOptions": {"target": "es5", "strict": true, "jsx": "react"}}"#,
        );
        write_file(
            temp.path(),
            "b.json",
            r#"{"extends": "./a.json", "compilerOptions": {"target": "es2015"}}"#,
        );
        write_file(
            temp.path(),
            "c.json",
            r#"{"extends": "./b.json", "compilerOptions": {"jsx": "react-jsx"}}"#,
        );

        let merged = load_tsconfig(temp.path(), "c.json").expect("should load");
        // target: set in a and b, absent in c -> b wins over a.
        assert_eq!(merged.pointer("/compilerOptions/target"), Some(&json!("es2015")));
        // strict: only in a -> falls through.
        assert_eq!(merged.pointer("/compilerOptions/strict"), Some(&json!(true)));
        // jsx: in a and c -> c wins.
        assert_eq!(merged.pointer("/compilerOptions/jsx"), Some(&json!("react-jsx")));
    }

    #[test]
    fn bare_extends_resolves_under_node_modules() {
        let temp = TempDir::new().expect("temp dir");
        let package_dir = temp.path().join("node_modules/@tsconfig/node18");
        std::fs::create_dir_all(&package_dir).expect("create package dir");
        write_file(
            &package_dir,
            "tsconfig.json",
            r#"{"compilerOptions": {"target": "es2022", "strict": true}}"#,
        );
        write_file(
            temp.path(),
            "tsconfig.json",
            r#"{
              "extends": "@tsconfig/node18/tsconfig.json",
              "compilerOptions": {"strict": false}
            }"#,
        );

        let merged = load_tsconfig(temp.path(), "tsconfig.json").expect("should load");
        assert_eq!(merged.pointer("/compilerOptions/target"), Some(&json!("es2022")));
        assert_eq!(merged.pointer("/compilerOptions/strict"), Some(&json!(false)));
    }

    #[test]
    fn extends_cycle_fails_fast() {
        let temp = TempDir::new().expect("temp dir");
        write_file(temp.path(), "a.json", r#"{"extends": "./b.json"}"#);
        write_file(temp.path(), "b.json", r#"{"extends": "./a.json"}"#);

        let err = load_tsconfig(temp.path(), "a.json").expect_err("cycle should error");
        assert!(matches!(err, PackError::ExtendsCycle { .. }), "{err}");
    }

    #[test]
    fn missing_document_is_config_not_found() {
        let temp = TempDir::new().expect("temp dir");
        let err = load_tsconfig(temp.path(), "tsconfig.json").expect_err("should fail");
        assert!(matches!(err, PackError::ConfigNotFound { .. }), "{err}");
    }

    #[test]
    fn missing_parent_in_chain_is_config_not_found() {
        let temp = TempDir::new().expect("temp dir");
        write_file(
            temp.path(),
            "tsconfig.json",
            r#"{"extends": "./tsconfig.gone.json"}"#,
        );

        let err = load_tsconfig(temp.path(), "tsconfig.json").expect_err("should fail");
        assert!(matches!(err, PackError::ConfigNotFound { .. }), "{err}");
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let temp = TempDir::new().expect("temp dir");
        write_file(temp.path(), "tsconfig.json", "{not json");

        let err = load_tsconfig(temp.path(), "tsconfig.json").expect_err("should fail");
        assert!(matches!(err, PackError::ConfigParse { .. }), "{err}");
    }

    #[test]
    fn compiler_options_view_reads_bridge_fields() {
        let merged = json!({
            "compilerOptions": {
                "jsx": "react-jsxdev",
                "jsxImportSource": "preact",
                "experimentalDecorators": true,
                "target": "ES2020",
                "baseUrl": ".",
                "paths": {"@app/*": ["src/*"]}
            }
        });

        let options = compiler_options(&merged);
        assert_eq!(options.jsx.as_deref(), Some("react-jsxdev"));
        assert_eq!(options.jsx_import_source.as_deref(), Some("preact"));
        assert_eq!(options.experimental_decorators, Some(true));
        assert_eq!(options.target.as_deref(), Some("ES2020"));
        assert_eq!(
            options.paths.as_ref().and_then(|p| p.get("@app/*")).cloned(),
            Some(vec!["src/*".to_string()])
        );
    }

    #[test]
    fn malformed_compiler_options_fall_back_to_defaults() {
        let merged = json!({"compilerOptions": {"jsx": 42}});
        let options = compiler_options(&merged);
        assert!(options.jsx.is_none());
    }
}
