//! Unit Format Tests

use native_feature_compiler::declarations::*;
use native_feature_compiler::logging::NullLogger;
use native_feature_compiler::output::unit_ast::{Block, Instruction, Modifiers, Routine, VOID};
use native_feature_compiler::output::unit_format::{UnitFormatError, MAGIC, VERSION};
use native_feature_compiler::{
    deserialize, emit_listing, serialize, FeatureSynthesizer, GeneratedUnit, SynthesisOptions,
};

fn busy_declarations() -> BuildDeclarations {
    let mut decls = BuildDeclarations::new();
    decls.reflective_classes.push(
        ReflectiveClass::new(["pkg.A", "pkg.B"])
            .with_methods()
            .with_serialization(),
    );
    decls
        .reflective_methods
        .push(ReflectiveMethod::new("pkg.C", "apply", &["int[]"]));
    decls
        .jni_runtime_access
        .push(JniRuntimeAccess::new(["pkg.Native"]).with_fields());
    decls
        .runtime_initialized_packages
        .push(RuntimeInitializedPackage::new("pkg.later"));
    decls.resource_bundles.push(ResourceBundle::new("messages"));
    decls
}

fn synthesize(decls: &BuildDeclarations) -> GeneratedUnit {
    let logger = NullLogger::new();
    let options = SynthesisOptions::default();
    FeatureSynthesizer::new(&options, &logger)
        .synthesize(decls)
        .unwrap()
}

#[test]
fn should_restore_synthesized_unit() {
    let unit = synthesize(&busy_declarations());
    let bytes = serialize(&unit).unwrap();
    assert_eq!(&bytes[..4], MAGIC);
    assert_eq!(deserialize(&bytes).unwrap(), unit);
}

#[test]
fn should_produce_identical_output_for_identical_input() {
    let first = synthesize(&busy_declarations());
    let second = synthesize(&busy_declarations());
    assert_eq!(serialize(&first).unwrap(), serialize(&second).unwrap());
    assert_eq!(emit_listing(&first), emit_listing(&second));
}

#[test]
fn should_reject_wrong_magic() {
    let mut bytes = serialize(&synthesize(&BuildDeclarations::new())).unwrap();
    bytes[0] = b'X';
    assert!(matches!(deserialize(&bytes), Err(UnitFormatError::InvalidMagic)));
}

#[test]
fn should_reject_unsupported_version() {
    let mut bytes = serialize(&synthesize(&BuildDeclarations::new())).unwrap();
    bytes[4..8].copy_from_slice(&(VERSION + 1).to_le_bytes());
    assert!(matches!(
        deserialize(&bytes),
        Err(UnitFormatError::UnsupportedVersion(v)) if v == VERSION + 1
    ));
}

#[test]
fn should_reject_truncated_data() {
    let bytes = serialize(&synthesize(&busy_declarations())).unwrap();
    let truncated = &bytes[..bytes.len() / 2];
    assert!(matches!(
        deserialize(truncated),
        Err(UnitFormatError::UnexpectedEof | UnitFormatError::LengthOutOfBounds { .. })
    ));
}

#[test]
fn should_reject_empty_input() {
    assert!(matches!(deserialize(&[]), Err(UnitFormatError::UnexpectedEof)));
}

#[test]
fn should_restore_more_routines_than_fit_in_sixteen_bits() {
    let mut unit = synthesize(&BuildDeclarations::new());
    for index in 0..65_536 {
        unit.routines.push(Routine {
            name: format!("registerClass{}", index),
            modifiers: Modifiers::PRIVATE | Modifiers::STATIC,
            params: Vec::new(),
            return_type: VOID.to_string(),
            value_count: 0,
            body: Block::new(vec![Instruction::Return { value: None }]),
        });
    }
    assert_eq!(unit.routines.len(), 65_537);

    let decoded = deserialize(&serialize(&unit).unwrap()).unwrap();
    assert_eq!(decoded.routines.len(), 65_537);
    assert_eq!(decoded, unit);
}

#[test]
fn should_reject_trailing_bytes() {
    let mut bytes = serialize(&synthesize(&busy_declarations())).unwrap();
    bytes.extend_from_slice(b"garbage");
    assert!(matches!(
        deserialize(&bytes),
        Err(UnitFormatError::TrailingData(7))
    ));
}

#[test]
fn should_reject_string_length_beyond_input() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(b"abc");
    assert!(matches!(
        deserialize(&bytes),
        Err(UnitFormatError::LengthOutOfBounds { len, remaining: 3 }) if len == u32::MAX
    ));
}
