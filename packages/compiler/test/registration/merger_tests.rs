//! Registration Merger Tests

use native_feature_compiler::declarations::{
    BuildDeclarations, JniRuntimeAccess, NativeImageResource, ReflectiveClass, ReflectiveField,
    ReflectiveMethod, ServiceProvider,
};
use native_feature_compiler::registration::{merge, MethodSignature, RegistrationFlags};

fn pkg_a_declarations() -> BuildDeclarations {
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.A"]).with_methods());
    decls
        .reflective_fields
        .push(ReflectiveField::new("pkg.A", "x"));
    decls
}

#[test]
fn should_merge_class_and_field_declarations_into_one_record() {
    let decls = pkg_a_declarations();
    let plan = merge(&decls);

    assert_eq!(plan.classes.len(), 1);
    let record = plan.class_record("pkg.A").unwrap();
    assert_eq!(record.flags, RegistrationFlags::METHODS);
    assert!(record.allow_methods());
    assert!(!record.weak());
    assert_eq!(
        record.explicit_fields.iter().cloned().collect::<Vec<_>>(),
        vec!["x".to_string()]
    );
}

#[test]
fn should_union_flags_across_declarations() {
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.A"]).with_constructors());
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.A"]).with_fields().with_serialization());

    let plan = merge(&decls);
    let record = plan.class_record("pkg.A").unwrap();
    assert!(record.allow_constructors());
    assert!(record.allow_fields());
    assert!(record.serialization());
    assert!(!record.allow_methods());
    assert!(plan.requires_serialization());
}

#[test]
fn should_be_idempotent_for_repeated_declarations() {
    let once = pkg_a_declarations();
    let mut twice = pkg_a_declarations();
    twice.extend(pkg_a_declarations());

    let merged_once = merge(&once);
    let merged_twice = merge(&twice);
    assert_eq!(merged_once.classes, merged_twice.classes);
}

#[test]
fn should_only_grow_records_when_declarations_are_added() {
    let base = pkg_a_declarations();
    let mut extended = pkg_a_declarations();
    extended
        .reflective_methods
        .push(ReflectiveMethod::new("pkg.A", "run", &["int"]));
    extended
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.A"]).weak());

    let before = merge(&base);
    let after = merge(&extended);
    let old = before.class_record("pkg.A").unwrap();
    let new = after.class_record("pkg.A").unwrap();

    assert!(new.flags.contains(old.flags));
    assert!(old.explicit_fields.is_subset(&new.explicit_fields));
    assert!(old.explicit_methods.is_subset(&new.explicit_methods));
    assert!(new
        .explicit_methods
        .contains(&MethodSignature::new("run", &["int".to_string()])));
}

#[test]
fn should_keep_first_seen_class_order_across_categories() {
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_methods
        .push(ReflectiveMethod::new("pkg.Method", "m", &[]));
    decls
        .reflective_fields
        .push(ReflectiveField::new("pkg.Field", "f"));
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.Second", "pkg.First"]));
    decls
        .service_providers
        .push(ServiceProvider::new("pkg.Service", ["pkg.Provider"]));

    let plan = merge(&decls);
    let order: Vec<&str> = plan.classes.keys().map(String::as_str).collect();
    assert_eq!(
        order,
        vec!["pkg.Second", "pkg.First", "pkg.Field", "pkg.Method", "pkg.Provider"]
    );
}

#[test]
fn should_route_constructor_methods_to_explicit_constructors() {
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_methods
        .push(ReflectiveMethod::constructor("pkg.A", &["java.lang.String"]));

    let plan = merge(&decls);
    let record = plan.class_record("pkg.A").unwrap();
    assert!(record.explicit_methods.is_empty());
    assert_eq!(record.explicit_constructors.len(), 1);
    assert!(!record.allow_constructors());
}

#[test]
fn should_grant_constructors_to_service_providers() {
    let mut decls = BuildDeclarations::new();
    decls.service_providers.push(ServiceProvider::new(
        "pkg.spi.Codec",
        ["pkg.impl.JsonCodec", "pkg.impl.XmlCodec"],
    ));

    let plan = merge(&decls);
    for provider in ["pkg.impl.JsonCodec", "pkg.impl.XmlCodec"] {
        let record = plan.class_record(provider).unwrap();
        assert_eq!(record.flags, RegistrationFlags::CONSTRUCTORS);
    }
    assert!(plan.class_record("pkg.spi.Codec").is_none());
    assert_eq!(
        plan.service_descriptors,
        vec!["META-INF/services/pkg.spi.Codec".to_string()]
    );
}

#[test]
fn should_upgrade_provider_records_from_earlier_categories() {
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.impl.JsonCodec"]).with_methods());
    decls
        .service_providers
        .push(ServiceProvider::new("pkg.spi.Codec", ["pkg.impl.JsonCodec"]));

    let plan = merge(&decls);
    let record = plan.class_record("pkg.impl.JsonCodec").unwrap();
    assert_eq!(
        record.flags,
        RegistrationFlags::METHODS | RegistrationFlags::CONSTRUCTORS
    );
}

#[test]
fn should_keep_one_jni_record_per_declared_class() {
    let mut decls = BuildDeclarations::new();
    decls
        .jni_runtime_access
        .push(JniRuntimeAccess::new(["pkg.Native", "pkg.Other"]).with_methods());
    decls
        .jni_runtime_access
        .push(JniRuntimeAccess::new(["pkg.Native"]).with_fields());

    let plan = merge(&decls);
    assert!(plan.classes.is_empty());
    let names: Vec<&str> = plan
        .jni_classes
        .iter()
        .map(|r| r.class_name.as_str())
        .collect();
    assert_eq!(names, vec!["pkg.Native", "pkg.Other", "pkg.Native"]);
    assert!(plan.jni_classes[0].methods);
    assert!(!plan.jni_classes[0].fields);
    assert!(plan.jni_classes[2].fields);
}

#[test]
fn should_flatten_resources_in_declaration_order() {
    let mut decls = BuildDeclarations::new();
    decls
        .resources
        .push(NativeImageResource::new(["a.txt", "b.txt"]));
    decls.resources.push(NativeImageResource::new(["c.txt"]));

    let plan = merge(&decls);
    assert_eq!(plan.resources, vec!["a.txt", "b.txt", "c.txt"]);
}
