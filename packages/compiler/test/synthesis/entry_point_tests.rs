//! Entry Point Tests
//!
//! Runs generated units against the recording host and checks what the
//! entry point registers, and in which order.

use native_feature_compiler::declarations::*;
use native_feature_compiler::synthesis::descriptors::{
    LOCALIZATION_FEATURE, RESOURCES_REGISTRY, RUNTIME_CLASS_INITIALIZATION_SUPPORT,
};
use native_feature_compiler::testing::{HostEvent, HostedClass, RecordingHost, Registry};

#[path = "support.rs"]
mod support;

use support::{run, synthesize};

fn full_declarations() -> BuildDeclarations {
    let mut decls = BuildDeclarations::new();
    decls
        .unsafe_accessed_fields
        .push(UnsafeAccessedField::new("pkg.Holder", "counter"));
    decls
        .runtime_initialized_classes
        .push(RuntimeInitializedClass::new("pkg.Lazy"));
    decls
        .runtime_initialized_packages
        .push(RuntimeInitializedPackage::new("pkg.deferred"));
    decls
        .runtime_reinitialized_classes
        .push(RuntimeReinitializedClass::new("pkg.Reinit"));
    decls
        .proxy_definitions
        .push(ProxyDefinition::new(["pkg.Service"]));
    decls
        .resources
        .push(NativeImageResource::new(["config/app.properties"]));
    decls
        .service_providers
        .push(ServiceProvider::new("pkg.Service", ["pkg.ServiceImpl"]));
    decls.resource_patterns.push(
        ResourcePatterns::default()
            .include(r".*\.json")
            .exclude(r".*\.bak"),
    );
    decls.resource_bundles.push(ResourceBundle::new("messages"));
    decls
        .cipher_transformations
        .push(CipherTransformation::new(["AES/GCM/NoPadding"]));
    decls
}

fn full_host() -> RecordingHost {
    RecordingHost::new()
        .with_class(HostedClass::new("pkg.Holder").field("counter"))
        .with_class(HostedClass::new("pkg.Lazy"))
        .with_class(HostedClass::new("pkg.Reinit"))
        .with_class(HostedClass::new("pkg.Service"))
        .with_class(HostedClass::new("pkg.ServiceImpl").constructor(&[]))
        .with_bundle("messages")
        .with_cipher("AES/GCM/NoPadding")
}

#[test]
fn should_register_general_categories_in_order() {
    let unit = synthesize(&full_declarations());
    let mut host = full_host();
    let events = run(&unit, &mut host);

    let expected = vec![
        HostEvent::UnsafeAccessed {
            class_name: "pkg.Holder".to_string(),
            field: "counter".to_string(),
        },
        HostEvent::InitializeAtRunTime {
            classes: vec!["pkg.Lazy".to_string()],
        },
        HostEvent::InitializePackagesAtRunTime {
            packages: vec!["pkg.deferred".to_string()],
        },
        HostEvent::RerunInitialization {
            class_name: "pkg.Reinit".to_string(),
            originator: "Quarkus".to_string(),
        },
        HostEvent::ProxyClass {
            interfaces: vec!["pkg.Service".to_string()],
        },
        HostEvent::Resource("config/app.properties".to_string()),
        HostEvent::Resource("META-INF/services/pkg.Service".to_string()),
        HostEvent::ResourcePatternExcluded(r".*\.bak".to_string()),
        HostEvent::ResourcePatternIncluded(r".*\.json".to_string()),
        HostEvent::ResourceBundle("messages".to_string()),
        HostEvent::CipherRequested("AES/GCM/NoPadding".to_string()),
    ];
    assert_eq!(&events[..expected.len()], expected.as_slice());

    // The service provider worker runs after every general category.
    assert_eq!(
        events[expected.len()],
        HostEvent::RegisterClasses {
            registry: Registry::Reflection,
            classes: vec!["pkg.ServiceImpl".to_string()],
        }
    );
    assert!(host.reported_failures().is_empty());
}

#[test]
fn should_skip_unresolvable_runtime_initialized_classes() {
    let mut decls = BuildDeclarations::new();
    decls
        .runtime_initialized_classes
        .push(RuntimeInitializedClass::new("pkg.Known"));
    decls
        .runtime_initialized_classes
        .push(RuntimeInitializedClass::new("pkg.Missing"));
    decls
        .runtime_initialized_classes
        .push(RuntimeInitializedClass::new("pkg.AlsoKnown"));

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new()
        .with_class(HostedClass::new("pkg.Known"))
        .with_class(HostedClass::new("pkg.AlsoKnown"));
    let events = run(&unit, &mut host);

    assert_eq!(events.len(), 2);
    match &events[0] {
        HostEvent::FailureReported(fault) => {
            assert_eq!(fault.exception, "java.lang.ClassNotFoundException");
            assert_eq!(fault.message, "pkg.Missing");
        }
        other => panic!("expected a reported failure, got {:?}", other),
    }
    assert_eq!(
        events[1],
        HostEvent::InitializeAtRunTime {
            classes: vec!["pkg.Known".to_string(), "pkg.AlsoKnown".to_string()],
        }
    );
}

#[test]
fn should_continue_after_unresolvable_unsafe_field() {
    let mut decls = BuildDeclarations::new();
    decls
        .unsafe_accessed_fields
        .push(UnsafeAccessedField::new("pkg.Holder", "missing"));
    decls
        .unsafe_accessed_fields
        .push(UnsafeAccessedField::new("pkg.Holder", "counter"));

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new().with_class(HostedClass::new("pkg.Holder").field("counter"));
    let events = run(&unit, &mut host);

    assert!(matches!(&events[0], HostEvent::FailureReported(f) if f.exception == "java.lang.NoSuchFieldException"));
    assert_eq!(
        events[1],
        HostEvent::UnsafeAccessed {
            class_name: "pkg.Holder".to_string(),
            field: "counter".to_string(),
        }
    );
}

#[test]
fn should_skip_missing_bundles_silently() {
    let mut decls = BuildDeclarations::new();
    decls.resource_bundles.push(ResourceBundle::new("missing"));
    decls.resource_bundles.push(ResourceBundle::new("messages"));

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new().with_bundle("messages");
    let events = run(&unit, &mut host);

    assert_eq!(events, vec![HostEvent::ResourceBundle("messages".to_string())]);
}

#[test]
fn should_skip_unavailable_ciphers_silently() {
    let mut decls = BuildDeclarations::new();
    decls
        .cipher_transformations
        .push(CipherTransformation::new(["ROT13", "AES/CBC/PKCS5Padding"]));

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new().with_cipher("AES/CBC/PKCS5Padding");
    let events = run(&unit, &mut host);

    assert_eq!(
        events,
        vec![HostEvent::CipherRequested("AES/CBC/PKCS5Padding".to_string())]
    );
}

#[test]
fn should_report_missing_pattern_registry_and_continue() {
    let mut decls = BuildDeclarations::new();
    decls
        .resource_patterns
        .push(ResourcePatterns::default().include("a/.*"));
    decls.resource_bundles.push(ResourceBundle::new("messages"));

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new()
        .with_bundle("messages")
        .without_singleton(RESOURCES_REGISTRY);
    let events = run(&unit, &mut host);

    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], HostEvent::FailureReported(f) if f.exception == "java.lang.IllegalStateException"));
    assert_eq!(events[1], HostEvent::ResourceBundle("messages".to_string()));
}

#[test]
fn should_register_excludes_before_includes_across_pattern_sets() {
    let mut decls = BuildDeclarations::new();
    decls
        .resource_patterns
        .push(ResourcePatterns::default().include("a/.*").exclude("a/tmp/.*"));
    decls
        .resource_patterns
        .push(ResourcePatterns::default().include("b/.*").exclude("b/tmp/.*"));

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new();
    let events = run(&unit, &mut host);

    assert_eq!(
        events,
        vec![
            HostEvent::ResourcePatternExcluded("a/tmp/.*".to_string()),
            HostEvent::ResourcePatternExcluded("b/tmp/.*".to_string()),
            HostEvent::ResourcePatternIncluded("a/.*".to_string()),
            HostEvent::ResourcePatternIncluded("b/.*".to_string()),
        ]
    );
}

#[test]
fn should_let_broken_proxy_fall_through_to_outer_region() {
    let mut decls = BuildDeclarations::new();
    decls
        .proxy_definitions
        .push(ProxyDefinition::new(["pkg.Missing"]));
    decls
        .resources
        .push(NativeImageResource::new(["after-proxies.txt"]));
    decls.reflective_classes.push(ReflectiveClass::new(["pkg.A"]));

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new().with_class(HostedClass::new("pkg.A"));
    let events = run(&unit, &mut host);

    // The outer region reports once and skips everything after the proxies.
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], HostEvent::FailureReported(f) if f.message == "pkg.Missing"));
    assert!(host.registered_classes(Registry::Reflection).is_empty());
}

#[test]
fn should_rerun_initialization_with_configured_originator() {
    let mut decls = BuildDeclarations::new();
    decls
        .runtime_reinitialized_classes
        .push(RuntimeReinitializedClass::new("pkg.Missing"));
    decls
        .runtime_reinitialized_classes
        .push(RuntimeReinitializedClass::new("pkg.Reinit"));

    let mut options = native_feature_compiler::SynthesisOptions::default();
    options.reinitialization_originator = "Build".to_string();
    let unit = support::synthesize_with(&decls, &options);
    let mut host = RecordingHost::new().with_class(HostedClass::new("pkg.Reinit"));
    let events = run(&unit, &mut host);

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], HostEvent::FailureReported(_)));
    assert_eq!(
        events[1],
        HostEvent::RerunInitialization {
            class_name: "pkg.Reinit".to_string(),
            originator: "Build".to_string(),
        }
    );
}

#[test]
fn should_reference_application_class_last() {
    let unit = synthesize(&BuildDeclarations::new());
    let listing = native_feature_compiler::emit_listing(&unit);
    let entry = listing
        .split("routine beforeAnalysis")
        .nth(1)
        .expect("entry point is listed");
    let tail: Vec<&str> = entry.lines().rev().skip_while(|l| l.trim() == "}").take(2).collect();
    assert_eq!(tail[0].trim(), "return");
    assert!(tail[1].ends_with("= class io.quarkus.runner.ApplicationImpl"));
}

#[test]
fn should_confine_missing_localization_support_to_bundles() {
    let mut decls = BuildDeclarations::new();
    decls.resource_bundles.push(ResourceBundle::new("messages"));
    decls
        .cipher_transformations
        .push(CipherTransformation::new(["AES/GCM/NoPadding"]));
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.A"]).with_methods());

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new()
        .with_bundle("messages")
        .with_cipher("AES/GCM/NoPadding")
        .with_class(HostedClass::new("pkg.A").method("run", &[]))
        .without_singleton(LOCALIZATION_FEATURE);
    let events = run(&unit, &mut host);

    assert!(matches!(&events[0], HostEvent::FailureReported(f) if f.exception == "java.lang.IllegalStateException"));
    assert_eq!(host.reported_failures().len(), 1);
    assert!(!events.iter().any(|e| matches!(e, HostEvent::ResourceBundle(_))));
    assert!(events.contains(&HostEvent::CipherRequested("AES/GCM/NoPadding".to_string())));
    assert_eq!(
        host.registered_classes(Registry::Reflection),
        vec!["pkg.A".to_string()]
    );
}

#[test]
fn should_confine_missing_initialization_support_to_reinitialization() {
    let mut decls = BuildDeclarations::new();
    decls
        .runtime_reinitialized_classes
        .push(RuntimeReinitializedClass::new("pkg.Reinit"));
    decls
        .resources
        .push(NativeImageResource::new(["app.properties"]));
    decls
        .reflective_classes
        .push(ReflectiveClass::new(["pkg.A"]));

    let unit = synthesize(&decls);
    let mut host = RecordingHost::new()
        .with_class(HostedClass::new("pkg.Reinit"))
        .with_class(HostedClass::new("pkg.A"))
        .without_singleton(RUNTIME_CLASS_INITIALIZATION_SUPPORT);
    let events = run(&unit, &mut host);

    assert_eq!(host.reported_failures().len(), 1);
    assert!(!events
        .iter()
        .any(|e| matches!(e, HostEvent::RerunInitialization { .. })));
    assert!(events.contains(&HostEvent::Resource("app.properties".to_string())));
    assert_eq!(
        host.registered_classes(Registry::Reflection),
        vec!["pkg.A".to_string()]
    );
}
