//! Serialization Wiring Tests

use native_feature_compiler::declarations::*;
use native_feature_compiler::synthesis::descriptors::*;
use native_feature_compiler::synthesis::REQUIRED_FEATURES;
use native_feature_compiler::testing::{HostEvent, HostedClass, RecordingHost};

#[path = "support.rs"]
mod support;

use support::{calls_to, run, synthesize};

fn serializable(names: &[&str]) -> BuildDeclarations {
    let mut decls = BuildDeclarations::new();
    decls.reflective_classes.push(
        ReflectiveClass::new(names.iter().copied())
            .weak()
            .with_serialization(),
    );
    decls
}

#[test]
fn should_declare_required_features_once_for_many_classes() {
    let names: Vec<String> = (0..10).map(|i| format!("pkg.Value{}", i)).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let unit = synthesize(&serializable(&refs));

    let declared = unit
        .routine_names()
        .into_iter()
        .filter(|n| *n == REQUIRED_FEATURES)
        .count();
    assert_eq!(declared, 1);
    // Declared while the first serialization worker was generated.
    assert_eq!(&unit.routine_names()[..3], &["beforeAnalysis", "registerClass0", REQUIRED_FEATURES]);
    assert_eq!(unit.routine(REQUIRED_FEATURES).unwrap().return_type, LIST);

    let mut host = RecordingHost::new();
    for name in &names {
        host = host.with_class(HostedClass::new(name).constructor(&[]));
    }
    let events = run(&unit, &mut host);
    let accessors = events
        .iter()
        .filter(|e| matches!(e, HostEvent::ConstructorAccessor { .. }))
        .count();
    assert_eq!(accessors, 10);
}

#[test]
fn should_not_declare_required_features_without_serialization() {
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.A"]).with_fields());

    let unit = synthesize(&decls);
    assert!(unit.routine(REQUIRED_FEATURES).is_none());
    assert_eq!(calls_to(&unit, "registerClass0", &ADD_CONSTRUCTOR_ACCESSOR), 0);
}

#[test]
fn should_build_accessor_from_own_constructor_for_concrete_class() {
    let unit = synthesize(&serializable(&["pkg.Point"]));
    let mut host = RecordingHost::new().with_class(HostedClass::new("pkg.Point").field("x"));
    let events = run(&unit, &mut host);

    assert_eq!(
        events,
        vec![
            HostEvent::ConstructorAccessor {
                class_name: "pkg.Point".to_string(),
                constructor_class: "pkg.Point".to_string(),
            },
            HostEvent::SerializationReflections {
                class_name: "pkg.Point".to_string(),
                object_class: OBJECT.to_string(),
            },
        ]
    );
}

#[test]
fn should_build_accessor_from_stub_for_abstract_class() {
    let unit = synthesize(&serializable(&["pkg.Shape"]));
    let mut host = RecordingHost::new().with_class(HostedClass::new("pkg.Shape").abstract_class());
    let events = run(&unit, &mut host);

    assert_eq!(
        events[0],
        HostEvent::ConstructorAccessor {
            class_name: "pkg.Shape".to_string(),
            constructor_class: STUB_FOR_ABSTRACT_CLASS.to_string(),
        }
    );
}

#[test]
fn should_pass_serialization_flag_to_blanket_fields() {
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.Point"]).with_fields().with_serialization());

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new().with_class(HostedClass::new("pkg.Point").field("x"));
    let events = run(&unit, &mut host);

    assert!(events.iter().any(|e| matches!(
        e,
        HostEvent::RegisterFields {
            serialization: true,
            final_fields_writable: false,
            ..
        }
    )));
}
