//! tspack — a preconfigured bundling front end for TypeScript libraries.
//!
//! The library discovers a package's declared build intent from three
//! sources (`package.json`, a tsconfig `extends` chain, and command-line
//! flags), merges them deterministically, and translates the result into
//! directives for an external module-graph bundler and syntax transformer.
//!
//! The bundler and the transformer themselves stay behind the
//! [`bundling::Bundler`] and [`bundling::TransformService`] traits; tspack
//! owns configuration resolution, relative module-path resolution, and the
//! plugin hooks that bridge the two.

pub mod bundling;
pub mod cli;
pub mod config;
pub mod doctor;
pub mod error;
pub mod tracing_config;

pub use error::{PackError, Result};
