//! Declaration validation.
//!
//! A malformed declaration is a build-configuration bug, so validation runs
//! before merging and its errors abort synthesis.

use crate::declarations::BuildDeclarations;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const IDENTIFIER: &str = r"[\p{L}_$][\p{L}\p{N}_$]*";

/// Source-style names (`pkg.Outer$Inner`, `int[]`) and JVM array
/// descriptors (`[Ljava.lang.String;`, `[[I`).
static BINARY_NAME: Lazy<Regex> = Lazy::new(|| {
    let qualified = format!(r"{id}(?:\.{id})*", id = IDENTIFIER);
    Regex::new(&format!(
        r"^(?:{q}(?:\[\])*|\[+(?:L{q};|[ZBCSIJFD]))$",
        q = qualified
    ))
    .expect("binary name pattern")
});

static PACKAGE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*(?:\.[\p{L}_][\p{L}\p{N}_]*)*$").expect("package pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{category}: `{name}` is not a valid class name")]
    InvalidClassName { category: &'static str, name: String },

    #[error("runtime-initialized package `{0}` is not a valid package name")]
    InvalidPackageName(String),

    #[error("{category}: empty member name on `{class_name}`")]
    EmptyMemberName {
        category: &'static str,
        class_name: String,
    },

    #[error("proxy definition #{index} names no interfaces")]
    EmptyProxyDefinition { index: usize },

    #[error("{category}: empty value")]
    EmptyValue { category: &'static str },
}

pub fn is_binary_name(name: &str) -> bool {
    BINARY_NAME.is_match(name)
}

fn class_name(category: &'static str, name: &str) -> Result<(), ValidationError> {
    if is_binary_name(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidClassName {
            category,
            name: name.to_string(),
        })
    }
}

fn member_name(category: &'static str, owner: &str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        Err(ValidationError::EmptyMemberName {
            category,
            class_name: owner.to_string(),
        })
    } else {
        Ok(())
    }
}

fn non_empty(category: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::EmptyValue { category })
    } else {
        Ok(())
    }
}

/// Checks every declaration; reports the first violation in category order.
pub fn validate(decls: &BuildDeclarations) -> Result<(), ValidationError> {
    for item in &decls.reflective_classes {
        for name in &item.class_names {
            class_name("reflective class", name)?;
        }
    }
    for item in &decls.reflective_fields {
        class_name("reflective field", &item.declaring_class)?;
        member_name("reflective field", &item.declaring_class, &item.name)?;
    }
    for item in &decls.reflective_methods {
        class_name("reflective method", &item.declaring_class)?;
        member_name("reflective method", &item.declaring_class, &item.name)?;
        for param in &item.params {
            // Primitive names match the identifier grammar as well.
            class_name("reflective method parameter", param)?;
        }
    }
    for item in &decls.jni_runtime_access {
        for name in &item.class_names {
            class_name("JNI class", name)?;
        }
    }
    for item in &decls.resources {
        for path in &item.resources {
            non_empty("resource", path)?;
        }
    }
    for item in &decls.resource_patterns {
        for pattern in item.include_patterns.iter().chain(&item.exclude_patterns) {
            non_empty("resource pattern", pattern)?;
        }
    }
    for item in &decls.resource_bundles {
        non_empty("resource bundle", &item.bundle_name)?;
    }
    for item in &decls.service_providers {
        class_name("service interface", &item.service_interface)?;
        for provider in &item.providers {
            class_name("service provider", provider)?;
        }
    }
    for (index, item) in decls.proxy_definitions.iter().enumerate() {
        if item.classes.is_empty() {
            return Err(ValidationError::EmptyProxyDefinition { index });
        }
        for name in &item.classes {
            class_name("proxy interface", name)?;
        }
    }
    for item in &decls.runtime_initialized_classes {
        class_name("runtime-initialized class", &item.class_name)?;
    }
    for item in &decls.runtime_initialized_packages {
        if !PACKAGE_NAME.is_match(&item.package_name) {
            return Err(ValidationError::InvalidPackageName(
                item.package_name.clone(),
            ));
        }
    }
    for item in &decls.runtime_reinitialized_classes {
        class_name("runtime-reinitialized class", &item.class_name)?;
    }
    for item in &decls.unsafe_accessed_fields {
        class_name("unsafe-accessed field", &item.declaring_class)?;
        member_name("unsafe-accessed field", &item.declaring_class, &item.field_name)?;
    }
    for item in &decls.cipher_transformations {
        for transformation in &item.cipher_transformations {
            non_empty("cipher transformation", transformation)?;
        }
    }
    Ok(())
}
