//! Per-class reflective registration workers.

use super::descriptors::*;
use super::{isolated, serialization, SynthesisState};
use crate::error::{Result, SynthesisError};
use crate::output::unit_ast::{MethodRef, Modifiers, ValueId, VOID};
use crate::output::unit_builder::{BlockBuilder, RoutineBuilder};
use crate::registration::{ClassRegistrationRecord, MethodSignature};

/// Class resolved through the thread context class loader, without running
/// its initializer. Returns the class and the loader.
pub(crate) fn resolve_class(tc: &mut BlockBuilder<'_>, class_name: &str) -> (ValueId, ValueId) {
    let thread = tc.invoke_static(&CURRENT_THREAD, &[]);
    let loader = tc.invoke_virtual(&GET_CONTEXT_CLASS_LOADER, thread, &[]);
    let name = tc.load_str(class_name);
    let initialize = tc.load_bool(false);
    let class = tc.invoke_static(&FOR_NAME_WITH_LOADER, &[name, initialize, loader]);
    (class, loader)
}

/// Introspection arrays, fetched before any registration so that a failure
/// here leaves nothing registered.
pub(crate) struct Introspection {
    pub constructors: ValueId,
    pub methods: ValueId,
    pub fields: ValueId,
}

pub(crate) fn introspect(tc: &mut BlockBuilder<'_>, class: ValueId) -> Introspection {
    Introspection {
        constructors: tc.invoke_virtual(&GET_DECLARED_CONSTRUCTORS, class, &[]),
        methods: tc.invoke_virtual(&GET_DECLARED_METHODS, class, &[]),
        fields: tc.invoke_virtual(&GET_DECLARED_FIELDS, class, &[]),
    }
}

fn parameter_types(tc: &mut BlockBuilder<'_>, signature: &MethodSignature) -> ValueId {
    let mut types = Vec::with_capacity(signature.params.len());
    for param in &signature.params {
        types.push(tc.load_class(param));
    }
    tc.marshal_as_array(CLASS, &types)
}

fn register_one(tc: &mut BlockBuilder<'_>, register: &MethodRef, component: &str, member: ValueId) {
    let single = tc.marshal_as_array(component, &[member]);
    tc.invoke_static(register, &[single]);
}

/// Generates `registerClass<N>` for `record` and returns the reference the
/// entry point calls it through.
pub(crate) fn emit_class_worker(
    state: &mut SynthesisState<'_>,
    record: &ClassRegistrationRecord,
) -> Result<MethodRef> {
    let name = state.next_class_worker();
    state.unit.reserve_routine(&name)?;
    let builder = RoutineBuilder::new(&name, VOID, &[]).with_modifiers(Modifiers::PRIVATE | Modifiers::STATIC);
    let worker = builder.method_ref(&state.unit.binary_name());
    let policy = state.worker_failure_policy();

    let routine = builder.build(|body| {
        isolated(body, policy, |tc| {
            let (class, loader) = resolve_class(tc, &record.class_name);
            let members = introspect(tc, class);
            let object_class = if record.serialization() {
                let name = tc.load_str(OBJECT);
                let initialize = tc.load_bool(false);
                Some(tc.invoke_static(&FOR_NAME_WITH_LOADER, &[name, initialize, loader]))
            } else {
                None
            };

            if !record.weak() {
                register_one(tc, &REFLECTION_REGISTER_CLASSES, CLASS, class);
            }

            if record.allow_constructors() {
                tc.invoke_static(&REFLECTION_REGISTER_EXECUTABLES, &[members.constructors]);
            } else {
                for signature in &record.explicit_constructors {
                    let params = parameter_types(tc, signature);
                    let constructor = tc.invoke_virtual(&GET_DECLARED_CONSTRUCTOR, class, &[params]);
                    register_one(tc, &REFLECTION_REGISTER_EXECUTABLES, CONSTRUCTOR, constructor);
                }
            }

            if record.allow_methods() {
                tc.invoke_static(&REFLECTION_REGISTER_EXECUTABLES, &[members.methods]);
            } else {
                for signature in &record.explicit_methods {
                    let method_name = tc.load_str(&signature.name);
                    let params = parameter_types(tc, signature);
                    let method = tc.invoke_virtual(&GET_DECLARED_METHOD, class, &[method_name, params]);
                    register_one(tc, &REFLECTION_REGISTER_EXECUTABLES, METHOD, method);
                }
            }

            // Only the blanket path carries the writable and serialization flags.
            if record.allow_fields() {
                let writable = tc.load_bool(record.final_fields_writable());
                let serializable = tc.load_bool(record.serialization());
                tc.invoke_static(
                    &REFLECTION_REGISTER_FIELDS_WITH_FLAGS,
                    &[writable, serializable, members.fields],
                );
            } else {
                for field_name in &record.explicit_fields {
                    let field_name = tc.load_str(field_name);
                    let field = tc.invoke_virtual(&GET_DECLARED_FIELD, class, &[field_name]);
                    register_one(tc, &REFLECTION_REGISTER_FIELDS, FIELD, field);
                }
            }

            if let Some(object_class) = object_class {
                state.serialization.ensure_required_features(&mut state.unit)?;
                serialization::emit_constructor_accessor(tc, class, object_class)?;
            }
            Ok(())
        })?;
        body.return_void();
        Ok::<(), SynthesisError>(())
    })?;

    state.unit.define_routine(routine)?;
    Ok(worker)
}
