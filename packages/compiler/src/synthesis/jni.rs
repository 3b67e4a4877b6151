//! JNI registration workers. All-or-nothing per member kind; no explicit
//! member subsets and no serialization handling.

use super::descriptors::*;
use super::reflection::{introspect, resolve_class};
use super::{isolated, SynthesisState};
use crate::error::{Result, SynthesisError};
use crate::output::unit_ast::{MethodRef, Modifiers, VOID};
use crate::output::unit_builder::RoutineBuilder;
use crate::registration::JniClassRecord;

pub(crate) fn emit_jni_worker(state: &mut SynthesisState<'_>, record: &JniClassRecord) -> Result<MethodRef> {
    let name = state.next_jni_worker();
    state.unit.reserve_routine(&name)?;
    let builder = RoutineBuilder::new(&name, VOID, &[]).with_modifiers(Modifiers::PRIVATE | Modifiers::STATIC);
    let worker = builder.method_ref(&state.unit.binary_name());
    let policy = state.worker_failure_policy();

    let routine = builder.build(|body| {
        isolated(body, policy, |tc| {
            let (class, _) = resolve_class(tc, &record.class_name);
            let members = introspect(tc, class);

            let classes = tc.marshal_as_array(CLASS, &[class]);
            tc.invoke_static(&JNI_REGISTER_CLASSES, &[classes]);
            if record.constructors {
                tc.invoke_static(&JNI_REGISTER_EXECUTABLES, &[members.constructors]);
            }
            if record.methods {
                tc.invoke_static(&JNI_REGISTER_EXECUTABLES, &[members.methods]);
            }
            if record.fields {
                let writable = tc.load_bool(record.final_fields_writable);
                tc.invoke_static(&JNI_REGISTER_FIELDS, &[writable, members.fields]);
            }
            Ok(())
        })?;
        body.return_void();
        Ok::<(), SynthesisError>(())
    })?;

    state.unit.define_routine(routine)?;
    Ok(worker)
}
