//! Entry point emission.
//!
//! `beforeAnalysis` performs the general registrations in a fixed order,
//! calls every worker, and finally references the application class. Its
//! whole body sits in one reporting region so the unit never fails past its
//! own boundary.

use super::descriptors::*;
use super::{isolated, jni, reflection, FailurePolicy, SynthesisState, ENTRY_POINT};
use crate::error::{Result, SynthesisError};
use crate::output::unit_ast::{ValueId, VOID};
use crate::output::unit_builder::{BlockBuilder, RoutineBuilder};
use crate::registration::RegistrationPlan;

pub(crate) fn emit_entry_point(state: &mut SynthesisState<'_>, plan: &RegistrationPlan<'_>) -> Result<()> {
    state.unit.reserve_routine(ENTRY_POINT)?;

    let routine = RoutineBuilder::new(ENTRY_POINT, VOID, &[BEFORE_ANALYSIS_ACCESS]).build(|body| {
        let access = body.param(0);
        isolated(body, FailurePolicy::Report, |region| {
            emit_unsafe_fields(region, access, plan)?;
            emit_runtime_initialized_classes(region, state, plan)?;
            emit_runtime_initialized_packages(region, plan)?;
            emit_reinitialized_classes(region, state, plan)?;
            emit_proxies(region, plan);
            emit_resources(region, plan);
            emit_resource_patterns(region, plan)?;
            emit_resource_bundles(region, plan)?;
            emit_cipher_transformations(region, plan)?;

            for record in plan.classes.values() {
                let worker = reflection::emit_class_worker(state, record)?;
                region.invoke_static(&worker, &[]);
            }
            for record in &plan.jni_classes {
                let worker = jni::emit_jni_worker(state, record)?;
                region.invoke_static(&worker, &[]);
            }
            Ok(())
        })?;
        body.load_class(&state.options.application_class);
        body.return_void();
        Ok::<(), SynthesisError>(())
    })?;

    state.unit.define_routine(routine)
}

/// Class loader that loaded the unit itself.
fn unit_class_loader(region: &mut BlockBuilder<'_>, state: &SynthesisState<'_>) -> ValueId {
    let unit_class = region.load_class(&state.unit.binary_name());
    region.invoke_virtual(&GET_CLASS_LOADER, unit_class, &[])
}

fn emit_unsafe_fields(
    region: &mut BlockBuilder<'_>,
    access: ValueId,
    plan: &RegistrationPlan<'_>,
) -> Result<()> {
    for field in plan.unsafe_accessed_fields {
        isolated(region, FailurePolicy::Report, |tc| {
            let class_name = tc.load_str(&field.declaring_class);
            let class = tc.invoke_static(&FOR_NAME, &[class_name]);
            let field_name = tc.load_str(&field.field_name);
            let handle = tc.invoke_virtual(&GET_DECLARED_FIELD, class, &[field_name]);
            tc.invoke_interface(&REGISTER_AS_UNSAFE_ACCESSED, access, &[handle]);
            Ok(())
        })?;
    }
    Ok(())
}

/// Resolved classes are collected in a list, so a class that fails to
/// resolve is left out of the bulk call instead of passed as null.
fn emit_runtime_initialized_classes(
    region: &mut BlockBuilder<'_>,
    state: &SynthesisState<'_>,
    plan: &RegistrationPlan<'_>,
) -> Result<()> {
    if plan.runtime_initialized_classes.is_empty() {
        return Ok(());
    }
    let loader = unit_class_loader(region, state);
    let resolved = region.new_instance(ARRAY_LIST);
    for item in plan.runtime_initialized_classes {
        isolated(region, FailurePolicy::Report, |tc| {
            let name = tc.load_str(&item.class_name);
            let initialize = tc.load_bool(false);
            let class = tc.invoke_static(&FOR_NAME_WITH_LOADER, &[name, initialize, loader]);
            tc.invoke_interface(&LIST_ADD, resolved, &[class]);
            Ok(())
        })?;
    }
    let template = region.new_array(CLASS, 0);
    let classes = region.invoke_interface(&LIST_TO_ARRAY, resolved, &[template]);
    region.invoke_static(&INITIALIZE_CLASSES_AT_RUN_TIME, &[classes]);
    Ok(())
}

fn emit_runtime_initialized_packages(
    region: &mut BlockBuilder<'_>,
    plan: &RegistrationPlan<'_>,
) -> Result<()> {
    if plan.runtime_initialized_packages.is_empty() {
        return Ok(());
    }
    let packages = region.new_array(STRING, plan.runtime_initialized_packages.len() as u32);
    for (index, item) in plan.runtime_initialized_packages.iter().enumerate() {
        isolated(region, FailurePolicy::Report, |tc| {
            let name = tc.load_str(&item.package_name);
            tc.array_store(packages, index as u32, name);
            Ok(())
        })?;
    }
    region.invoke_static(&INITIALIZE_PACKAGES_AT_RUN_TIME, &[packages]);
    Ok(())
}

/// The initialization support singleton is acquired inside the category's
/// own region, so a missing singleton aborts only this category.
fn emit_reinitialized_classes(
    region: &mut BlockBuilder<'_>,
    state: &SynthesisState<'_>,
    plan: &RegistrationPlan<'_>,
) -> Result<()> {
    if plan.runtime_reinitialized_classes.is_empty() {
        return Ok(());
    }
    isolated(region, FailurePolicy::Report, |category| {
        let loader = unit_class_loader(category, state);
        let support_class = category.load_class(RUNTIME_CLASS_INITIALIZATION_SUPPORT);
        let support = category.invoke_static(&IMAGE_SINGLETONS_LOOKUP, &[support_class]);
        let originator = category.load_str(&state.options.reinitialization_originator);
        for item in plan.runtime_reinitialized_classes {
            isolated(category, FailurePolicy::Report, |tc| {
                let name = tc.load_str(&item.class_name);
                let initialize = tc.load_bool(false);
                let class = tc.invoke_static(&FOR_NAME_WITH_LOADER, &[name, initialize, loader]);
                tc.invoke_interface(&RERUN_INITIALIZATION, support, &[class, originator]);
                Ok(())
            })?;
        }
        Ok(())
    })
}

/// Not isolated per definition: a broken proxy definition falls through to
/// the entry point's outer region.
fn emit_proxies(region: &mut BlockBuilder<'_>, plan: &RegistrationPlan<'_>) {
    if plan.proxy_definitions.is_empty() {
        return;
    }
    let registry_class = region.load_class(DYNAMIC_PROXY_REGISTRY);
    let registry = region.invoke_static(&IMAGE_SINGLETONS_LOOKUP, &[registry_class]);
    for definition in plan.proxy_definitions {
        let mut interfaces = Vec::with_capacity(definition.classes.len());
        for interface in &definition.classes {
            let name = region.load_str(interface);
            interfaces.push(region.invoke_static(&FOR_NAME, &[name]));
        }
        let interfaces = region.marshal_as_array(CLASS, &interfaces);
        region.invoke_interface(&ADD_PROXY_CLASS, registry, &[interfaces]);
    }
}

fn emit_resources(region: &mut BlockBuilder<'_>, plan: &RegistrationPlan<'_>) {
    let descriptors = plan.service_descriptors.iter().map(String::as_str);
    for path in plan.resources.iter().copied().chain(descriptors) {
        let path = region.load_str(path);
        region.invoke_static(&REGISTER_RESOURCES, &[path]);
    }
}

/// One region covers the registry lookup and every pattern; excludes are
/// registered before includes.
fn emit_resource_patterns(region: &mut BlockBuilder<'_>, plan: &RegistrationPlan<'_>) -> Result<()> {
    if plan.resource_patterns.is_empty() {
        return Ok(());
    }
    isolated(region, FailurePolicy::Report, |tc| {
        let registry_class = tc.load_class(RESOURCES_REGISTRY);
        let registry = tc.invoke_static(&IMAGE_SINGLETONS_LOOKUP, &[registry_class]);
        for patterns in plan.resource_patterns {
            for pattern in &patterns.exclude_patterns {
                let pattern = tc.load_str(pattern);
                tc.invoke_interface(&IGNORE_RESOURCES, registry, &[pattern]);
            }
        }
        for patterns in plan.resource_patterns {
            for pattern in &patterns.include_patterns {
                let pattern = tc.load_str(pattern);
                tc.invoke_interface(&ADD_RESOURCES, registry, &[pattern]);
            }
        }
        Ok(())
    })
}

/// The localization capability is acquired in one reporting region for the
/// whole category; individual bundles that cannot be registered are skipped
/// without a report.
fn emit_resource_bundles(region: &mut BlockBuilder<'_>, plan: &RegistrationPlan<'_>) -> Result<()> {
    if plan.resource_bundles.is_empty() {
        return Ok(());
    }
    isolated(region, FailurePolicy::Report, |category| {
        let localization = category.load_class(LOCALIZATION_FEATURE);
        let string_class = category.load_class(STRING);
        let params = category.marshal_as_array(CLASS, &[string_class]);
        let method_name = category.load_str(ADD_BUNDLE_TO_CACHE);
        let register =
            category.invoke_virtual(&GET_DECLARED_METHOD, localization, &[method_name, params]);
        let accessible = category.load_bool(true);
        category.invoke_virtual(&SET_ACCESSIBLE, register, &[accessible]);
        let support = category.invoke_static(&IMAGE_SINGLETONS_LOOKUP, &[localization]);

        for bundle in plan.resource_bundles {
            isolated(category, FailurePolicy::Silent, |tc| {
                let name = tc.load_str(&bundle.bundle_name);
                let args = tc.marshal_as_array(OBJECT, &[name]);
                tc.invoke_virtual(&METHOD_INVOKE, register, &[support, args]);
                Ok(())
            })?;
        }
        Ok(())
    })
}

fn emit_cipher_transformations(
    region: &mut BlockBuilder<'_>,
    plan: &RegistrationPlan<'_>,
) -> Result<()> {
    for transformation in &plan.cipher_transformations {
        isolated(region, FailurePolicy::Silent, |tc| {
            let name = tc.load_str(transformation);
            tc.invoke_static(&CIPHER_GET_INSTANCE, &[name]);
            Ok(())
        })?;
    }
    Ok(())
}
