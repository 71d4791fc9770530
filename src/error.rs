//! Error taxonomy for configuration resolution and the bundling bridge.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by tspack's own subsystems.
///
/// Failures inside the external bundler stay opaque (`anyhow`) at the
/// driver boundary; everything tspack can diagnose precisely lives here.
#[derive(Debug, Error)]
pub enum PackError {
    /// A document in the tsconfig extends chain could not be read.
    #[error("configuration not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document in the tsconfig extends chain is not well-formed JSON.
    #[error("failed to parse configuration: {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The extends chain revisited a document it already loaded.
    #[error("tsconfig extends cycle detected at {path}")]
    ExtendsCycle { path: PathBuf },

    /// Aggregated build options failed schema validation.
    #[error("invalid build options: {0}")]
    Validation(String),

    /// A filesystem probe during module-path resolution failed for a
    /// reason other than the path not existing.
    #[error("failed to probe {path}")]
    Resolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external transform or minify service failed for one file or
    /// chunk. Fatal to the whole build.
    #[error("transform failed for {file}: {message}")]
    Transform { file: String, message: String },
}

pub type Result<T> = std::result::Result<T, PackError>;
