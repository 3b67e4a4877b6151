//! Registration Merger
//!
//! Folds reflective declarations into one record per class. Records keep the
//! order in which their class was first seen, which is the order workers are
//! generated in.

use crate::declarations::{
    BuildDeclarations, ProxyDefinition, ReflectiveClass, ReflectiveField, ReflectiveMethod,
    ResourceBundle, ResourcePatterns, RuntimeInitializedClass, RuntimeInitializedPackage,
    RuntimeReinitializedClass, ServiceProvider, UnsafeAccessedField,
};
use crate::registration::record::{
    ClassRegistrationRecord, JniClassRecord, MethodSignature, RegistrationFlags,
};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

#[derive(Debug, Default)]
pub struct RegistrationMerger {
    classes: IndexMap<String, ClassRegistrationRecord>,
}

impl RegistrationMerger {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, class_name: &str) -> &mut ClassRegistrationRecord {
        self.classes
            .entry(class_name.to_string())
            .or_insert_with(|| ClassRegistrationRecord::new(class_name, RegistrationFlags::empty()))
    }

    /// Unions `flags` into the record for `class_name`, creating it if needed.
    pub fn add_class(&mut self, class_name: &str, flags: RegistrationFlags) {
        self.record(class_name).flags |= flags;
    }

    pub fn add_reflective_class(&mut self, item: &ReflectiveClass) {
        let flags = RegistrationFlags::from_bools(
            item.constructors,
            item.methods,
            item.fields,
            item.final_fields_writable,
            item.weak,
            item.serialization,
        );
        for class_name in &item.class_names {
            self.add_class(class_name, flags);
        }
    }

    pub fn add_reflective_field(&mut self, item: &ReflectiveField) {
        self.record(&item.declaring_class)
            .explicit_fields
            .insert(item.name.clone());
    }

    pub fn add_reflective_method(&mut self, item: &ReflectiveMethod) {
        let signature = MethodSignature::new(&item.name, &item.params);
        let record = self.record(&item.declaring_class);
        if item.is_constructor() {
            record.explicit_constructors.insert(signature);
        } else {
            record.explicit_methods.insert(signature);
        }
    }

    /// Providers are instantiated through the service loader, so each needs
    /// its constructors.
    pub fn add_service_provider(&mut self, item: &ServiceProvider) {
        for provider in &item.providers {
            self.add_class(provider, RegistrationFlags::CONSTRUCTORS);
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn finish(self) -> IndexMap<String, ClassRegistrationRecord> {
        self.classes
    }
}

/// Everything the synthesizer needs, in emission order. Categories that need
/// no per-class merge are borrowed from the declarations as they are.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPlan<'d> {
    pub classes: IndexMap<String, ClassRegistrationRecord>,
    pub jni_classes: Vec<JniClassRecord>,
    pub unsafe_accessed_fields: &'d [UnsafeAccessedField],
    pub runtime_initialized_classes: &'d [RuntimeInitializedClass],
    pub runtime_initialized_packages: &'d [RuntimeInitializedPackage],
    pub runtime_reinitialized_classes: &'d [RuntimeReinitializedClass],
    pub proxy_definitions: &'d [ProxyDefinition],
    pub resources: Vec<&'d str>,
    pub service_descriptors: Vec<String>,
    pub resource_patterns: &'d [ResourcePatterns],
    pub resource_bundles: &'d [ResourceBundle],
    pub cipher_transformations: IndexSet<&'d str>,
}

impl<'d> RegistrationPlan<'d> {
    pub fn class_record(&self, class_name: &str) -> Option<&ClassRegistrationRecord> {
        self.classes.get(class_name)
    }

    pub fn requires_serialization(&self) -> bool {
        self.classes.values().any(|r| r.serialization())
    }
}

/// One JNI record per (declaration, class) pair, in declaration order.
pub fn jni_records(decls: &BuildDeclarations) -> Vec<JniClassRecord> {
    decls
        .jni_runtime_access
        .iter()
        .flat_map(|item| {
            item.class_names.iter().map(move |class_name| JniClassRecord {
                class_name: class_name.clone(),
                constructors: item.constructors,
                methods: item.methods,
                fields: item.fields,
                final_fields_writable: item.final_fields_writable,
            })
        })
        .collect()
}

/// Merges classes first, then fields, then methods, then service providers,
/// so later categories upgrade records created by earlier ones.
pub fn merge(decls: &BuildDeclarations) -> RegistrationPlan<'_> {
    let mut merger = RegistrationMerger::new();
    for item in &decls.reflective_classes {
        merger.add_reflective_class(item);
    }
    for item in &decls.reflective_fields {
        merger.add_reflective_field(item);
    }
    for item in &decls.reflective_methods {
        merger.add_reflective_method(item);
    }
    for item in &decls.service_providers {
        merger.add_service_provider(item);
    }

    RegistrationPlan {
        classes: merger.finish(),
        jni_classes: jni_records(decls),
        unsafe_accessed_fields: &decls.unsafe_accessed_fields,
        runtime_initialized_classes: &decls.runtime_initialized_classes,
        runtime_initialized_packages: &decls.runtime_initialized_packages,
        runtime_reinitialized_classes: &decls.runtime_reinitialized_classes,
        proxy_definitions: &decls.proxy_definitions,
        resources: decls
            .resources
            .iter()
            .flat_map(|r| r.resources.iter().map(String::as_str))
            .collect(),
        service_descriptors: decls
            .service_providers
            .iter()
            .map(ServiceProvider::service_descriptor_file)
            .collect(),
        resource_patterns: &decls.resource_patterns,
        resource_bundles: &decls.resource_bundles,
        cipher_transformations: decls
            .cipher_transformations
            .iter()
            .flat_map(|c| c.cipher_transformations.iter().map(String::as_str))
            .collect(),
    }
}
