//! Module-path resolution for relative import specifiers.
//!
//! Only relative specifiers are handled here; bare package names defer to
//! the external bundler's own resolution. The probe order prefers
//! TypeScript-authored sources over compiled JavaScript siblings so
//! type-aware tooling always sees the source of truth.

use std::path::{Component, Path, PathBuf};

use crate::error::{PackError, Result};

/// Probe order for extension resolution. Position is correctness-relevant:
/// `.ts` before `.js` means an authored source shadows its build output.
pub const RESOLVE_EXTENSIONS: [&str; 6] = [".ts", ".tsx", ".mjs", ".js", ".cjs", ".jsx"];

/// Extensions recognised as script files, for candidate stripping and the
/// plugin's include filter.
const SCRIPT_EXTENSIONS: [&str; 8] = ["ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts"];

/// Resolve a relative `specifier` against the file importing it.
///
/// Returns `Ok(None)` for non-relative specifiers and for candidates with
/// no matching file — both mean "defer to the bundler", never an error.
/// Filesystem failures other than not-found (e.g. permission denied)
/// propagate as [`PackError::Resolution`].
pub fn resolve_relative(importer: &Path, specifier: &str) -> Result<Option<PathBuf>> {
    if !specifier.starts_with('.') {
        return Ok(None);
    }

    let importer_dir = importer.parent().unwrap_or_else(|| Path::new("."));
    let candidate = normalize_join(importer_dir, specifier);
    let stripped = strip_script_extension(&candidate);

    for ext in RESOLVE_EXTENSIONS {
        let probe = with_appended_extension(&stripped, ext);
        if probe_is_file(&probe)? {
            tracing::trace!(specifier, resolved = %probe.display(), "resolved relative import");
            return Ok(Some(probe));
        }
    }

    if probe_is_dir(&candidate)? {
        for ext in RESOLVE_EXTENSIONS {
            let probe = candidate.join(format!("index{ext}"));
            if probe_is_file(&probe)? {
                tracing::trace!(specifier, resolved = %probe.display(), "resolved to directory index");
                return Ok(Some(probe));
            }
        }
    }

    Ok(None)
}

/// Whether `path` names a script file the transform pipeline handles.
pub fn is_script_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

/// Join and collapse `.`/`..` components without touching the filesystem.
fn normalize_join(base: &Path, relative: &str) -> PathBuf {
    let mut normalized = PathBuf::from(base);
    for component in Path::new(relative).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Drop a literal script extension from the candidate, if it has one.
fn strip_script_extension(path: &Path) -> PathBuf {
    if is_script_path(path) {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}

fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut probe = path.as_os_str().to_os_string();
    probe.push(ext);
    PathBuf::from(probe)
}

fn probe_is_file(path: &Path) -> Result<bool> {
    probe_metadata(path).map(|meta| meta.is_some_and(|m| m.is_file()))
}

fn probe_is_dir(path: &Path) -> Result<bool> {
    probe_metadata(path).map(|meta| meta.is_some_and(|m| m.is_dir()))
}

/// Stat a candidate. Not-found is an ordinary miss; any other failure is a
/// genuine resolution error.
fn probe_metadata(path: &Path) -> Result<Option<std::fs::Metadata>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PackError::Resolution {
            path: path.to_path_buf(),
            source,
        }),
    }
}
