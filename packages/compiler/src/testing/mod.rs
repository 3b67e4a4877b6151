//! Testing Module
//!
//! A recording hosted environment and helpers for running generated units
//! without an AOT compiler.

pub mod hosted;

pub use hosted::{HostEvent, HostedClass, RecordingHost, Registry};

use crate::output::evaluator::{EvaluationError, HostValue, UnitEvaluator};
use crate::output::unit_ast::GeneratedUnit;
use crate::synthesis::descriptors::BEFORE_ANALYSIS_ACCESS;
use crate::synthesis::ENTRY_POINT;

/// Runs the unit's entry point against `host` with a stand-in access object.
pub fn run_entry_point(
    unit: &GeneratedUnit,
    host: &mut RecordingHost,
) -> Result<HostValue, EvaluationError> {
    let access = HostValue::Object(BEFORE_ANALYSIS_ACCESS.to_string());
    UnitEvaluator::new(unit).run(host, ENTRY_POINT, vec![access])
}
