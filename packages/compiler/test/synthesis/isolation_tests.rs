//! Failure Isolation Tests

use native_feature_compiler::declarations::*;
use native_feature_compiler::logging::{LogLevel, MemoryLogger, NullLogger};
use native_feature_compiler::testing::{run_entry_point, HostedClass, RecordingHost, Registry};
use native_feature_compiler::validation::ValidationError;
use native_feature_compiler::{FeatureSynthesizer, MemorySink, SynthesisError, SynthesisOptions};

#[path = "support.rs"]
mod support;

use support::{run, synthesize, synthesize_with};

fn fifty_classes() -> (BuildDeclarations, Vec<String>) {
    let names: Vec<String> = (0..50).map(|i| format!("pkg.C{}", i)).collect();
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_classes
        .push(ReflectiveClass::new(names.iter().cloned()).with_methods());
    (decls, names)
}

fn host_without(names: &[String], missing: &str) -> RecordingHost {
    names
        .iter()
        .filter(|n| n.as_str() != missing)
        .fold(RecordingHost::new(), |host, name| {
            host.with_class(HostedClass::new(name).method("call", &[]))
        })
}

#[test]
fn should_register_every_other_class_when_one_is_missing() {
    let (decls, names) = fifty_classes();
    let unit = synthesize(&decls);
    let mut host = host_without(&names, "pkg.C17");
    run(&unit, &mut host);

    let expected: Vec<String> = names.iter().filter(|n| *n != "pkg.C17").cloned().collect();
    assert_eq!(host.registered_classes(Registry::Reflection), expected);
    // Worker failures are dropped unless logging is enabled.
    assert!(host.reported_failures().is_empty());
}

#[test]
fn should_report_worker_failures_when_enabled() {
    let (decls, names) = fifty_classes();
    let options = SynthesisOptions::default().with_worker_failure_logging(true);
    let unit = synthesize_with(&decls, &options);
    let mut host = host_without(&names, "pkg.C17");
    run(&unit, &mut host);

    let failures = host.reported_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].message, "pkg.C17");
    assert_eq!(host.registered_classes(Registry::Reflection).len(), 49);
}

#[test]
fn should_complete_entry_point_when_every_worker_fails() {
    let (decls, _) = fifty_classes();
    let unit = synthesize(&decls);
    let mut host = RecordingHost::new();

    assert!(run_entry_point(&unit, &mut host).is_ok());
    assert!(host.take_events().is_empty());
    // A second run against the same host sees the same outcome.
    assert!(run_entry_point(&unit, &mut host).is_ok());
    assert!(host.events().is_empty());
}

#[test]
fn should_reject_invalid_declarations_before_generation() {
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["not a class"]));

    let logger = MemoryLogger::new(LogLevel::Debug);
    let options = SynthesisOptions::default();
    let mut sink = MemorySink::new();
    let result = FeatureSynthesizer::new(&options, &logger).generate(&decls, &mut sink);

    match result {
        Err(SynthesisError::Validation(ValidationError::InvalidClassName { name, .. })) => {
            assert_eq!(name, "not a class");
        }
        other => panic!("expected a validation error, got {:?}", other.map(|u| u.name)),
    }
    assert!(sink.is_empty());
    assert_eq!(logger.messages(LogLevel::Error).len(), 1);
}

#[test]
fn should_write_unit_to_sink_under_its_name() {
    let (decls, _) = fifty_classes();
    let logger = NullLogger::new();
    let options = SynthesisOptions::default().with_unit_name("app/generated/Registrations");
    let mut sink = MemorySink::new();
    let unit = FeatureSynthesizer::new(&options, &logger)
        .generate(&decls, &mut sink)
        .unwrap();

    assert_eq!(sink.names(), vec!["app/generated/Registrations"]);
    let bytes = sink.get("app/generated/Registrations").unwrap();
    assert_eq!(native_feature_compiler::deserialize(bytes).unwrap(), unit);
}

#[test]
fn should_log_generation_summary() {
    let (decls, _) = fifty_classes();
    let logger = MemoryLogger::new(LogLevel::Debug);
    let options = SynthesisOptions::default();
    FeatureSynthesizer::new(&options, &logger)
        .synthesize(&decls)
        .unwrap();

    assert_eq!(
        logger.messages(LogLevel::Info),
        vec!["generated io/quarkus/runner/AutoFeature with 50 class workers and 0 JNI workers".to_string()]
    );
    assert!(logger
        .messages(LogLevel::Debug)
        .contains(&"reflective classes: 50".to_string()));
}

#[test]
fn should_synthesize_array_descriptor_and_unicode_class_names() {
    let mut decls = BuildDeclarations::new();
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["[Ljava.lang.String;", "pkg.A", "com.example.Café"]));

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new()
        .with_class(HostedClass::new("pkg.A"))
        .with_class(HostedClass::new("com.example.Café"));
    run(&unit, &mut host);

    assert_eq!(
        host.registered_classes(Registry::Reflection),
        vec!["pkg.A".to_string(), "com.example.Café".to_string()]
    );
    assert!(host.reported_failures().is_empty());
}
