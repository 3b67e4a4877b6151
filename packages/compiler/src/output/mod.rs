//! Output Module
//!
//! The "class/method emitter": unit IR, builders, the binary artifact format,
//! the text listing and an evaluator for the IR.

pub mod evaluator;
pub mod listing;
pub mod unit_ast;
pub mod unit_builder;
pub mod unit_format;

pub use evaluator::{EvaluationError, HostEnvironment, HostFault, HostValue, Member, UnitEvaluator};
pub use listing::emit_listing;
pub use unit_ast::{GeneratedUnit, InvokeKind, MethodRef, Modifiers, Routine, ValueId};
pub use unit_builder::{BlockBuilder, RoutineBuilder, UnitBuilder};
pub use unit_format::{deserialize, serialize, UnitFormatError};
