//! Feature Synthesis Module
//!
//! Turns merged registrations into one initialization unit: an entry point
//! that performs the general registrations, and one isolated worker routine
//! per reflective class record and per JNI class record.
//!
//! Generation itself either succeeds or fails as a whole. Failures at the
//! time the unit runs are confined to isolated regions inside the unit.

pub mod descriptors;
mod entry_point;
mod jni;
pub mod options;
mod reflection;
mod serialization;

pub use options::SynthesisOptions;
pub use serialization::SerializationWiring;

use crate::declarations::BuildDeclarations;
use crate::error::{Result, SynthesisError};
use crate::logging::Logger;
use crate::output::unit_ast::{GeneratedUnit, THROWABLE};
use crate::output::unit_builder::{BlockBuilder, UnitBuilder};
use crate::output::unit_format::serialize;
use crate::registration::{merge, RegistrationPlan};
use crate::sink::ArtifactSink;
use crate::validation::validate;
use descriptors::PRINT_STACK_TRACE;

/// Name of the generated entry point.
pub const ENTRY_POINT: &str = "beforeAnalysis";
/// Name of the routine declaring the serialization feature dependency.
pub const REQUIRED_FEATURES: &str = "getRequiredFeatures";
pub const CLASS_WORKER_PREFIX: &str = "registerClass";
pub const JNI_WORKER_PREFIX: &str = "registerJniAccessibleClass";

/// What an isolated region does with the failure it caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailurePolicy {
    /// Print the caught failure, then continue.
    Report,
    /// Drop the caught failure, then continue.
    Silent,
}

/// Emits `body` inside a region that catches every throwable.
pub(crate) fn isolated<F>(block: &mut BlockBuilder<'_>, policy: FailurePolicy, body: F) -> Result<()>
where
    F: FnOnce(&mut BlockBuilder<'_>) -> Result<()>,
{
    block.try_catch(THROWABLE, body, |handler, caught| {
        if policy == FailurePolicy::Report {
            handler.invoke_virtual(&PRINT_STACK_TRACE, caught, &[]);
        }
        Ok(())
    })
}

/// Generation state threaded through the emitters.
pub(crate) struct SynthesisState<'o> {
    pub options: &'o SynthesisOptions,
    pub unit: UnitBuilder,
    pub serialization: SerializationWiring,
    class_workers: usize,
    jni_workers: usize,
}

impl<'o> SynthesisState<'o> {
    fn new(options: &'o SynthesisOptions, unit: UnitBuilder) -> Self {
        SynthesisState {
            options,
            unit,
            serialization: SerializationWiring::default(),
            class_workers: 0,
            jni_workers: 0,
        }
    }

    pub fn worker_failure_policy(&self) -> FailurePolicy {
        if self.options.log_worker_failures {
            FailurePolicy::Report
        } else {
            FailurePolicy::Silent
        }
    }

    pub fn next_class_worker(&mut self) -> String {
        let name = format!("{}{}", CLASS_WORKER_PREFIX, self.class_workers);
        self.class_workers += 1;
        name
    }

    pub fn next_jni_worker(&mut self) -> String {
        let name = format!("{}{}", JNI_WORKER_PREFIX, self.jni_workers);
        self.jni_workers += 1;
        name
    }
}

pub struct FeatureSynthesizer<'a> {
    options: &'a SynthesisOptions,
    logger: &'a dyn Logger,
}

impl<'a> FeatureSynthesizer<'a> {
    pub fn new(options: &'a SynthesisOptions, logger: &'a dyn Logger) -> Self {
        FeatureSynthesizer { options, logger }
    }

    /// Validates and merges `decls`, then builds the unit.
    pub fn synthesize(&self, decls: &BuildDeclarations) -> Result<GeneratedUnit> {
        validate(decls).map_err(|e| {
            self.logger.error(&format!("rejected declarations: {}", e));
            SynthesisError::from(e)
        })?;
        self.logger.debug(&format!(
            "merging {} declaration items",
            decls.item_count()
        ));
        let plan = merge(decls);
        self.synthesize_plan(&plan)
    }

    pub fn synthesize_plan(&self, plan: &RegistrationPlan<'_>) -> Result<GeneratedUnit> {
        self.log_plan(plan);

        let mut unit = UnitBuilder::new(
            &self.options.unit_name,
            descriptors::OBJECT,
            &[descriptors::FEATURE],
        );
        unit.add_annotation(descriptors::AUTOMATIC_FEATURE);

        let mut state = SynthesisState::new(self.options, unit);
        entry_point::emit_entry_point(&mut state, plan)?;
        if state.serialization.required_features_declared() {
            self.logger.debug("declared serialization feature requirement");
        }

        let unit = state.unit.finish()?;
        self.logger.info(&format!(
            "generated {} with {} class workers and {} JNI workers",
            unit.name,
            plan.classes.len(),
            plan.jni_classes.len()
        ));
        Ok(unit)
    }

    /// Synthesizes the unit and hands its binary form to `sink`, named after
    /// the unit.
    pub fn generate(
        &self,
        decls: &BuildDeclarations,
        sink: &mut dyn ArtifactSink,
    ) -> Result<GeneratedUnit> {
        let unit = self.synthesize(decls)?;
        let bytes = serialize(&unit)?;
        sink.write(&unit.name, &bytes)
            .map_err(|source| SynthesisError::Sink {
                name: unit.name.clone(),
                source,
            })?;
        self.logger
            .debug(&format!("wrote {} ({} bytes)", unit.name, bytes.len()));
        Ok(unit)
    }

    fn log_plan(&self, plan: &RegistrationPlan<'_>) {
        if !self.logger.is_enabled(crate::logging::LogLevel::Debug) {
            return;
        }
        let counts = [
            ("unsafe-accessed fields", plan.unsafe_accessed_fields.len()),
            ("runtime-initialized classes", plan.runtime_initialized_classes.len()),
            ("runtime-initialized packages", plan.runtime_initialized_packages.len()),
            ("reinitialized classes", plan.runtime_reinitialized_classes.len()),
            ("proxy definitions", plan.proxy_definitions.len()),
            ("resources", plan.resources.len()),
            ("service descriptors", plan.service_descriptors.len()),
            ("resource pattern sets", plan.resource_patterns.len()),
            ("resource bundles", plan.resource_bundles.len()),
            ("cipher transformations", plan.cipher_transformations.len()),
            ("reflective classes", plan.classes.len()),
            ("JNI classes", plan.jni_classes.len()),
        ];
        for (category, count) in counts {
            if count > 0 {
                self.logger.debug(&format!("{}: {}", category, count));
            }
        }
    }
}
