//! Serialization wiring.
//!
//! A serialization-enabled class needs a constructor accessor that bypasses
//! its declared constructors. The unit also has to declare, once, that it
//! depends on the hosted serialization feature.

use super::descriptors::*;
use super::REQUIRED_FEATURES;
use crate::error::{Result, SynthesisError};
use crate::output::unit_ast::ValueId;
use crate::output::unit_builder::{BlockBuilder, RoutineBuilder, UnitBuilder};

#[derive(Debug, Default)]
pub struct SerializationWiring {
    required_features_declared: bool,
}

impl SerializationWiring {
    pub fn required_features_declared(&self) -> bool {
        self.required_features_declared
    }

    /// Adds the `getRequiredFeatures` routine unless an earlier worker
    /// already did. Returns whether the routine was added by this call.
    pub fn ensure_required_features(&mut self, unit: &mut UnitBuilder) -> Result<bool> {
        if self.required_features_declared {
            return Ok(false);
        }
        let routine = RoutineBuilder::new(REQUIRED_FEATURES, LIST, &[]).build(|body| {
            let feature = body.load_class(SERIALIZATION_FEATURE);
            let features = body.invoke_static(&SINGLETON_LIST, &[feature]);
            body.return_value(features);
            Ok::<(), SynthesisError>(())
        })?;
        unit.define_routine(routine)?;
        self.required_features_declared = true;
        Ok(true)
    }
}

/// Emits the accessor acquisition for `class` into a worker region.
/// `object_class` is the resolved root object type.
pub(crate) fn emit_constructor_accessor(
    tc: &mut BlockBuilder<'_>,
    class: ValueId,
    object_class: ValueId,
) -> Result<()> {
    let registry_class = tc.load_class(SERIALIZATION_REGISTRY);
    let support = tc.invoke_static(&IMAGE_SINGLETONS_LOOKUP, &[registry_class]);
    let factory = tc.invoke_static(&GET_REFLECTION_FACTORY, &[]);

    let constructor = tc.declare_variable(CONSTRUCTOR);
    let modifiers = tc.invoke_virtual(&GET_MODIFIERS, class, &[]);
    let is_abstract = tc.invoke_static(&IS_ABSTRACT, &[modifiers]);
    tc.if_true(
        is_abstract,
        |abstract_branch| {
            let stub = abstract_branch.load_class(STUB_FOR_ABSTRACT_CLASS);
            let stub_constructor =
                abstract_branch.invoke_virtual(&NEW_CONSTRUCTOR_FOR_SERIALIZATION, factory, &[stub]);
            abstract_branch.assign(constructor, stub_constructor);
            Ok::<(), SynthesisError>(())
        },
        |concrete_branch| {
            let own_constructor =
                concrete_branch.invoke_virtual(&NEW_CONSTRUCTOR_FOR_SERIALIZATION, factory, &[class]);
            concrete_branch.assign(constructor, own_constructor);
            Ok(())
        },
    )?;

    let constructor_class = tc.invoke_virtual(&GET_DECLARING_CLASS, constructor, &[]);
    let reflect_constructor = tc.load_class(CONSTRUCTOR);
    let accessor_name = tc.load_str(GET_CONSTRUCTOR_ACCESSOR);
    let no_params = tc.new_array(CLASS, 0);
    let lookup = tc.invoke_static(
        &LOOKUP_METHOD,
        &[reflect_constructor, accessor_name, no_params],
    );
    let no_args = tc.new_array(OBJECT, 0);
    let accessor = tc.invoke_virtual(&METHOD_INVOKE, lookup, &[constructor, no_args]);

    tc.invoke_virtual(
        &ADD_CONSTRUCTOR_ACCESSOR,
        support,
        &[class, constructor_class, accessor],
    );
    tc.invoke_static(&ADD_REFLECTIONS, &[class, object_class]);
    Ok(())
}
