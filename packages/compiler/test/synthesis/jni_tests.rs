//! JNI Worker Tests

use native_feature_compiler::declarations::*;
use native_feature_compiler::output::evaluator::Member;
use native_feature_compiler::synthesis::descriptors::*;
use native_feature_compiler::testing::{HostEvent, HostedClass, RecordingHost, Registry};

#[path = "support.rs"]
mod support;

use support::{calls_to, run, synthesize};

fn native_class() -> HostedClass {
    HostedClass::new("pkg.Native")
        .constructor(&["long"])
        .method("poll", &[])
        .field("handle")
}

#[test]
fn should_register_flagged_member_kinds_with_jni_registry() {
    let mut decls = BuildDeclarations::new();
    decls.jni_runtime_access.push(
        JniRuntimeAccess::new(["pkg.Native"])
            .with_methods()
            .with_fields()
            .with_final_fields_writable(),
    );

    let unit = synthesize(&decls);
    assert_eq!(
        unit.routine_names(),
        vec!["beforeAnalysis", "registerJniAccessibleClass0"]
    );

    let mut host = RecordingHost::new().with_class(native_class());
    let events = run(&unit, &mut host);
    assert_eq!(
        events,
        vec![
            HostEvent::RegisterClasses {
                registry: Registry::Jni,
                classes: vec!["pkg.Native".to_string()],
            },
            HostEvent::RegisterExecutables {
                registry: Registry::Jni,
                members: vec![Member::Method {
                    declaring_class: "pkg.Native".to_string(),
                    name: "poll".to_string(),
                    params: vec![],
                }],
            },
            HostEvent::RegisterFields {
                registry: Registry::Jni,
                fields: vec![Member::Field {
                    declaring_class: "pkg.Native".to_string(),
                    name: "handle".to_string(),
                }],
                final_fields_writable: true,
                serialization: false,
            },
        ]
    );
}

#[test]
fn should_keep_jni_and_reflection_registries_apart() {
    let mut decls = BuildDeclarations::new();
    decls
        .jni_runtime_access
        .push(JniRuntimeAccess::new(["pkg.Native"]).with_constructors());
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.Reflected"]));

    let unit = synthesize(&decls);
    assert_eq!(
        unit.routine_names(),
        vec!["beforeAnalysis", "registerClass0", "registerJniAccessibleClass0"]
    );
    assert_eq!(calls_to(&unit, "registerJniAccessibleClass0", &REFLECTION_REGISTER_CLASSES), 0);
    assert_eq!(calls_to(&unit, "registerClass0", &JNI_REGISTER_CLASSES), 0);

    let mut host = RecordingHost::new()
        .with_class(native_class())
        .with_class(HostedClass::new("pkg.Reflected"));
    run(&unit, &mut host);
    assert_eq!(host.registered_classes(Registry::Jni), vec!["pkg.Native".to_string()]);
    assert_eq!(
        host.registered_classes(Registry::Reflection),
        vec!["pkg.Reflected".to_string()]
    );
}

#[test]
fn should_register_class_only_when_no_member_kind_is_flagged() {
    let mut decls = BuildDeclarations::new();
    decls
        .jni_runtime_access
        .push(JniRuntimeAccess::new(["pkg.Native"]));

    let unit = synthesize(&decls);
    assert_eq!(calls_to(&unit, "registerJniAccessibleClass0", &JNI_REGISTER_EXECUTABLES), 0);
    assert_eq!(calls_to(&unit, "registerJniAccessibleClass0", &JNI_REGISTER_FIELDS), 0);
    assert_eq!(calls_to(&unit, "registerJniAccessibleClass0", &JNI_REGISTER_CLASSES), 1);
}

#[test]
fn should_emit_one_worker_per_declared_class() {
    let mut decls = BuildDeclarations::new();
    decls
        .jni_runtime_access
        .push(JniRuntimeAccess::new(["pkg.Native"]).with_methods());
    decls
        .jni_runtime_access
        .push(JniRuntimeAccess::new(["pkg.Native"]).with_fields());

    let unit = synthesize(&decls);
    assert_eq!(
        unit.routine_names(),
        vec![
            "beforeAnalysis",
            "registerJniAccessibleClass0",
            "registerJniAccessibleClass1"
        ]
    );
}
