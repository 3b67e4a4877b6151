#![allow(dead_code)]

use native_feature_compiler::logging::NullLogger;
use native_feature_compiler::output::unit_ast::MethodRef;
use native_feature_compiler::testing::{run_entry_point, HostEvent, RecordingHost};
use native_feature_compiler::{BuildDeclarations, FeatureSynthesizer, GeneratedUnit, SynthesisOptions};

pub fn synthesize(decls: &BuildDeclarations) -> GeneratedUnit {
    synthesize_with(decls, &SynthesisOptions::default())
}

pub fn synthesize_with(decls: &BuildDeclarations, options: &SynthesisOptions) -> GeneratedUnit {
    let logger = NullLogger::new();
    FeatureSynthesizer::new(options, &logger)
        .synthesize(decls)
        .expect("synthesis should succeed")
}

/// Runs the entry point and returns everything the host recorded.
pub fn run(unit: &GeneratedUnit, host: &mut RecordingHost) -> Vec<HostEvent> {
    run_entry_point(unit, host).expect("entry point must not fail past its own region");
    host.events().to_vec()
}

/// Position of the first call to `method` in the routine named `routine`.
pub fn call_position(unit: &GeneratedUnit, routine: &str, method: &MethodRef) -> Option<usize> {
    unit.routine(routine)?
        .body
        .invoked_methods()
        .iter()
        .position(|m| *m == method)
}

pub fn calls_to(unit: &GeneratedUnit, routine: &str, method: &MethodRef) -> usize {
    unit.routine(routine)
        .map(|r| {
            r.body
                .invoked_methods()
                .iter()
                .filter(|m| **m == method)
                .count()
        })
        .unwrap_or(0)
}
