//! The package manifest (`package.json`).
//!
//! Only the fields the bundler front end cares about are modelled; the
//! `pack` options block stays an untyped value so its lenient validation
//! lives with the aggregator, and `exports` stays untyped because the
//! doctor only probes a handful of nested keys.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{PackError, Result};

pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PkgJson {
    pub name: Option<String>,
    pub version: Option<String>,
    /// `"type": "module"` makes `.js` mean ESM for this package.
    #[serde(rename = "type")]
    pub package_type: Option<String>,
    /// CommonJS bundle entry.
    pub main: Option<String>,
    /// ES Module bundle entry.
    pub module: Option<String>,
    /// Type declaration entry.
    pub types: Option<String>,
    pub files: Option<Vec<String>>,
    pub dependencies: Option<BTreeMap<String, String>>,
    pub exports: Option<Value>,
    /// tspack's own options block; validated leniently by the aggregator.
    pub pack: Option<Value>,
}

impl PkgJson {
    pub fn is_es_module(&self) -> bool {
        self.package_type.as_deref() == Some("module")
    }

    /// The root entry of the `exports` map (`exports["."]`), if declared.
    pub fn exports_root(&self) -> Option<&Value> {
        self.exports.as_ref()?.get(".")
    }

    /// Names of declared runtime dependencies.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .flat_map(|deps| deps.keys())
            .map(String::as_str)
    }
}

/// Read and parse `package.json` from the project root.
pub fn load_pkg_json(root_dir: &Path) -> Result<PkgJson> {
    let path = root_dir.join(MANIFEST_FILE);
    let source = std::fs::read_to_string(&path).map_err(|source| PackError::ConfigNotFound {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| PackError::ConfigParse { path, source })
}
