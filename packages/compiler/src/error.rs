//! Error types for synthesis.
//!
//! Everything here is a generation-time failure: it aborts the synthesis step
//! instead of being isolated inside the generated unit.

use crate::output::unit_format::UnitFormatError;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("invalid declaration: {0}")]
    Validation(#[from] ValidationError),

    #[error("routine `{routine}` is defined twice in unit `{unit}`")]
    DuplicateRoutine { routine: String, unit: String },

    #[error("routine `{0}` was reserved but never defined")]
    UndefinedRoutine(String),

    #[error("failed to encode the unit: {0}")]
    Format(#[from] UnitFormatError),

    #[error("failed to write artifact `{name}`")]
    Sink {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SynthesisError>;
