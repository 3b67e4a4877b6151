//! Declaration Items
//!
//! One plain value type per requirement category contributed by upstream
//! build participants. Manifests carry them as camelCase JSON; omitted flags
//! default to `false` and omitted lists to empty.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Method name that marks a `ReflectiveMethod` as a constructor.
pub const CONSTRUCTOR_NAME: &str = "<init>";

fn to_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// Request to make one or more classes reflectively accessible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReflectiveClass {
    pub class_names: Vec<String>,
    pub constructors: bool,
    pub methods: bool,
    pub fields: bool,
    pub final_fields_writable: bool,
    pub weak: bool,
    pub serialization: bool,
}

impl ReflectiveClass {
    pub fn new<I, S>(class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReflectiveClass {
            class_names: to_strings(class_names),
            ..Default::default()
        }
    }

    pub fn with_constructors(mut self) -> Self {
        self.constructors = true;
        self
    }

    pub fn with_methods(mut self) -> Self {
        self.methods = true;
        self
    }

    pub fn with_fields(mut self) -> Self {
        self.fields = true;
        self
    }

    pub fn with_final_fields_writable(mut self) -> Self {
        self.final_fields_writable = true;
        self
    }

    pub fn weak(mut self) -> Self {
        self.weak = true;
        self
    }

    pub fn with_serialization(mut self) -> Self {
        self.serialization = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReflectiveField {
    pub declaring_class: String,
    pub name: String,
}

impl ReflectiveField {
    pub fn new(declaring_class: &str, name: &str) -> Self {
        ReflectiveField {
            declaring_class: declaring_class.to_string(),
            name: name.to_string(),
        }
    }
}

/// A single method or, when named `<init>`, a single constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReflectiveMethod {
    pub declaring_class: String,
    pub name: String,
    pub params: Vec<String>,
}

impl ReflectiveMethod {
    pub fn new(declaring_class: &str, name: &str, params: &[&str]) -> Self {
        ReflectiveMethod {
            declaring_class: declaring_class.to_string(),
            name: name.to_string(),
            params: to_strings(params.iter().copied()),
        }
    }

    pub fn constructor(declaring_class: &str, params: &[&str]) -> Self {
        ReflectiveMethod::new(declaring_class, CONSTRUCTOR_NAME, params)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JniRuntimeAccess {
    pub class_names: Vec<String>,
    pub constructors: bool,
    pub methods: bool,
    pub fields: bool,
    pub final_fields_writable: bool,
}

impl JniRuntimeAccess {
    pub fn new<I, S>(class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JniRuntimeAccess {
            class_names: to_strings(class_names),
            ..Default::default()
        }
    }

    pub fn with_constructors(mut self) -> Self {
        self.constructors = true;
        self
    }

    pub fn with_methods(mut self) -> Self {
        self.methods = true;
        self
    }

    pub fn with_fields(mut self) -> Self {
        self.fields = true;
        self
    }

    pub fn with_final_fields_writable(mut self) -> Self {
        self.final_fields_writable = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NativeImageResource {
    pub resources: Vec<String>,
}

impl NativeImageResource {
    pub fn new<I, S>(resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NativeImageResource {
            resources: to_strings(resources),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourcePatterns {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl ResourcePatterns {
    pub fn include(mut self, pattern: &str) -> Self {
        self.include_patterns.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.exclude_patterns.push(pattern.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceBundle {
    pub bundle_name: String,
}

impl ResourceBundle {
    pub fn new(bundle_name: &str) -> Self {
        ResourceBundle {
            bundle_name: bundle_name.to_string(),
        }
    }
}

/// Providers of a service interface. Implies constructor access for every
/// provider and registration of the service descriptor resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceProvider {
    pub service_interface: String,
    pub providers: Vec<String>,
}

impl ServiceProvider {
    pub fn new<I, S>(service_interface: &str, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ServiceProvider {
            service_interface: service_interface.to_string(),
            providers: to_strings(providers),
        }
    }

    pub fn service_descriptor_file(&self) -> String {
        format!("META-INF/services/{}", self.service_interface)
    }
}

/// Interface set of one dynamic proxy; order is significant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxyDefinition {
    pub classes: Vec<String>,
}

impl ProxyDefinition {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProxyDefinition {
            classes: to_strings(classes),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeInitializedClass {
    pub class_name: String,
}

impl RuntimeInitializedClass {
    pub fn new(class_name: &str) -> Self {
        RuntimeInitializedClass {
            class_name: class_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeInitializedPackage {
    pub package_name: String,
}

impl RuntimeInitializedPackage {
    pub fn new(package_name: &str) -> Self {
        RuntimeInitializedPackage {
            package_name: package_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeReinitializedClass {
    pub class_name: String,
}

impl RuntimeReinitializedClass {
    pub fn new(class_name: &str) -> Self {
        RuntimeReinitializedClass {
            class_name: class_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnsafeAccessedField {
    pub declaring_class: String,
    pub field_name: String,
}

impl UnsafeAccessedField {
    pub fn new(declaring_class: &str, field_name: &str) -> Self {
        UnsafeAccessedField {
            declaring_class: declaring_class.to_string(),
            field_name: field_name.to_string(),
        }
    }
}

/// Cipher transformations (e.g. `AES/GCM/NoPadding`) the application requests
/// at run time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CipherTransformation {
    pub cipher_transformations: IndexSet<String>,
}

impl CipherTransformation {
    pub fn new<I, S>(transformations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CipherTransformation {
            cipher_transformations: transformations.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything contributed to one build, one ordered list per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildDeclarations {
    pub reflective_classes: Vec<ReflectiveClass>,
    pub reflective_fields: Vec<ReflectiveField>,
    pub reflective_methods: Vec<ReflectiveMethod>,
    pub jni_runtime_access: Vec<JniRuntimeAccess>,
    pub resources: Vec<NativeImageResource>,
    pub resource_patterns: Vec<ResourcePatterns>,
    pub resource_bundles: Vec<ResourceBundle>,
    pub service_providers: Vec<ServiceProvider>,
    pub proxy_definitions: Vec<ProxyDefinition>,
    pub runtime_initialized_classes: Vec<RuntimeInitializedClass>,
    pub runtime_initialized_packages: Vec<RuntimeInitializedPackage>,
    pub runtime_reinitialized_classes: Vec<RuntimeReinitializedClass>,
    pub unsafe_accessed_fields: Vec<UnsafeAccessedField>,
    pub cipher_transformations: Vec<CipherTransformation>,
}

impl BuildDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every category of `other` behind the items already present.
    pub fn extend(&mut self, other: BuildDeclarations) {
        self.reflective_classes.extend(other.reflective_classes);
        self.reflective_fields.extend(other.reflective_fields);
        self.reflective_methods.extend(other.reflective_methods);
        self.jni_runtime_access.extend(other.jni_runtime_access);
        self.resources.extend(other.resources);
        self.resource_patterns.extend(other.resource_patterns);
        self.resource_bundles.extend(other.resource_bundles);
        self.service_providers.extend(other.service_providers);
        self.proxy_definitions.extend(other.proxy_definitions);
        self.runtime_initialized_classes
            .extend(other.runtime_initialized_classes);
        self.runtime_initialized_packages
            .extend(other.runtime_initialized_packages);
        self.runtime_reinitialized_classes
            .extend(other.runtime_reinitialized_classes);
        self.unsafe_accessed_fields.extend(other.unsafe_accessed_fields);
        self.cipher_transformations
            .extend(other.cipher_transformations);
    }

    pub fn item_count(&self) -> usize {
        self.reflective_classes.len()
            + self.reflective_fields.len()
            + self.reflective_methods.len()
            + self.jni_runtime_access.len()
            + self.resources.len()
            + self.resource_patterns.len()
            + self.resource_bundles.len()
            + self.service_providers.len()
            + self.proxy_definitions.len()
            + self.runtime_initialized_classes.len()
            + self.runtime_initialized_packages.len()
            + self.runtime_reinitialized_classes.len()
            + self.unsafe_accessed_fields.len()
            + self.cipher_transformations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}
