//! Configuration discovery and merging.
//!
//! Three layers feed a build: the `package.json` manifest, the tsconfig
//! `extends` chain, and command-line flags. Everything here is read-only
//! with respect to the filesystem and produces documents that are never
//! mutated after they are returned.

pub mod merge;
pub mod pack_config;
pub mod pkg_json;
pub mod tsconfig;

pub use merge::merge;
pub use pack_config::{
    DEFAULT_FORMATS, DEFAULT_INPUT_FILE, DEFAULT_TS_CONFIG, OutputFormat, PackConfig, aggregate,
};
pub use pkg_json::{PkgJson, load_pkg_json};
pub use tsconfig::{CompilerOptions, compiler_options, load_tsconfig};
