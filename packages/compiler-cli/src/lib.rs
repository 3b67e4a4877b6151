#![deny(clippy::all)]

//! Native Feature Compiler CLI
//!
//! Configuration, manifest discovery and the commands behind `nfc`.

pub use native_feature_compiler as compiler;

pub mod config;
pub mod error;
pub mod manifest;
pub mod perform_generate;
pub mod sink;

#[cfg(test)]
mod test_support;

/// Version reported by `nfc --version`, taken from the compiler crate.
pub fn version() -> &'static str {
    compiler::VERSION.full.as_str()
}
