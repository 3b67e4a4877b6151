#![deny(clippy::all)]

//! Native Feature Compiler
//!
//! Merges build-time registration declarations and synthesizes the
//! initialization unit an ahead-of-time native image compiler loads before
//! analysis.

pub mod declarations;
pub mod error;
pub mod logging;
pub mod output;
pub mod registration;
pub mod sink;
pub mod synthesis;
pub mod testing;
pub mod validation;
mod version;

// Re-exports
pub use declarations::BuildDeclarations;
pub use error::{Result, SynthesisError};
pub use logging::{LogLevel, Logger};
pub use output::{deserialize, emit_listing, serialize, GeneratedUnit};
pub use registration::{merge, RegistrationPlan};
pub use sink::{ArtifactSink, MemorySink};
pub use synthesis::{FeatureSynthesizer, SynthesisOptions};
pub use version::{Version, VERSION};
