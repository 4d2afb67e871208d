//! End-to-end synthesis tests: generate a wrapper, parse it back, check shape.

use cmp_synth::cmp_classfile::{
    AccessFlags, ClassVersion, Instruction, MethodDescriptor, MethodRef, MethodSpec, ValueKind,
};
use cmp_synth::{
    BeanClass, BeanMethod, Error, GeneratorError, MemberSink, ModuleSynthesizer,
    NoLifecycleMethods, ParsedClass, SynthesisFailure, SynthesisPhase,
};

fn foo() -> BeanClass {
    BeanClass::named("com.example.Foo")
}

fn generate(bean: &BeanClass, surrogate_identity: bool) -> ParsedClass {
    let mut synth = ModuleSynthesizer::new("com.example.FooImpl", bean).unwrap();
    synth.set_surrogate_identity_required(surrogate_identity);
    let artifact = synth.generate().unwrap();
    ParsedClass::parse(artifact.as_bytes()).unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_plain_wrapper() {
    let class = generate(&foo(), false);

    assert_eq!(class.this_class, "com/example/FooImpl");
    assert_eq!(class.super_class.as_deref(), Some("com/example/Foo"));
    assert_eq!(class.interfaces, vec!["javax/ejb/EntityBean".to_string()]);
    assert_eq!(class.version, ClassVersion { major: 49, minor: 0 });
    assert_eq!(class.access, AccessFlags::PUBLIC | AccessFlags::SUPER);
    assert!(class.fields.is_empty());
    assert_eq!(class.constructors().count(), 1);
    assert_eq!(class.methods.len(), 1);
    assert!(class.attributes.is_empty());
}

#[test]
fn test_surrogate_identity_field() {
    let class = generate(&foo(), true);

    assert_eq!(class.fields.len(), 1);
    let field = class.field("OpenEJB_pk").unwrap();
    assert_eq!(field.access, AccessFlags::PUBLIC);
    assert_eq!(field.descriptor, "Ljava/lang/Long;");
    // No ConstantValue initializer.
    assert!(field.attributes.is_empty());
}

#[test]
fn test_self_inheritance_rejected() {
    let err = ModuleSynthesizer::new("com.example.Foo", &foo()).unwrap_err();
    assert!(matches!(err, Error::InvalidName { .. }));
}

#[test]
fn test_failing_generator_yields_no_artifact() {
    fn unavailable(_: &mut MemberSink<'_>) -> Result<(), GeneratorError> {
        Err("persistence mapping unavailable".into())
    }

    let mut synth =
        ModuleSynthesizer::with_generator("com.example.FooImpl", &foo(), unavailable).unwrap();
    let err = synth.generate().unwrap_err();
    match &err {
        Error::Synthesis {
            step: SynthesisPhase::MethodsEmitted,
            source: SynthesisFailure::Generator(cause),
        } => assert_eq!(cause.to_string(), "persistence mapping unavailable"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
}

// =============================================================================
// Structural properties
// =============================================================================

#[test]
fn test_constructor_forwards_to_parent() {
    let class = generate(&foo(), true);
    let ctor = class.method("<init>", "()V").unwrap();
    assert_eq!(ctor.access, AccessFlags::PUBLIC);

    let code = ctor.code.as_ref().unwrap();
    assert_eq!(code.max_stack, 1);
    assert_eq!(code.max_locals, 1);
    assert_eq!(code.bytecode.len(), 5);
    assert_eq!(code.bytecode[0], 0x2a);
    assert_eq!(code.bytecode[1], 0xb7);
    assert_eq!(code.bytecode[4], 0xb1);
    assert_eq!(
        code.instructions.as_deref(),
        Some(
            &[
                Instruction::Load {
                    kind: ValueKind::Reference,
                    index: 0
                },
                Instruction::InvokeSpecial(MethodRef::no_arg_constructor("com/example/Foo")),
                Instruction::Return(None),
            ][..]
        )
    );
}

#[test]
fn test_output_is_deterministic() {
    let bean = foo()
        .with_method(BeanMethod::new("ejbCreate", &["int", "java.lang.String"]))
        .with_method(BeanMethod::new("ejbCreateByKey", &["long"]));
    let run = || {
        let mut synth = ModuleSynthesizer::new("com.example.FooImpl", &bean).unwrap();
        synth.set_surrogate_identity_required(true);
        synth.generate().unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(first.sha256_hex(), second.sha256_hex());
}

#[test]
fn test_nested_package_and_default_package_names() {
    let bean = BeanClass::named("Account");
    let mut synth =
        ModuleSynthesizer::with_generator("org.acme.cmp.gen.Account_Impl", &bean, NoLifecycleMethods)
            .unwrap();
    let artifact = synth.generate().unwrap();
    assert_eq!(artifact.relative_path(), "org/acme/cmp/gen/Account_Impl.class");
    let class = ParsedClass::parse(artifact.as_bytes()).unwrap();
    assert_eq!(class.super_class.as_deref(), Some("Account"));
}

// =============================================================================
// Lifecycle and flags
// =============================================================================

#[test]
fn test_second_generate_rejected() {
    let mut synth = ModuleSynthesizer::new("com.example.FooImpl", &foo()).unwrap();
    synth.generate().unwrap();
    let err = synth.generate().unwrap_err();
    assert!(matches!(
        err,
        Error::Synthesis {
            step: SynthesisPhase::HeaderEmitted,
            source: SynthesisFailure::OutOfOrder { .. }
        }
    ));
}

#[test]
fn test_flag_change_after_generate_does_not_alter_artifact() {
    let mut synth = ModuleSynthesizer::new("com.example.FooImpl", &foo()).unwrap();
    let artifact = synth.generate().unwrap();
    let before = artifact.as_bytes().to_vec();

    synth.set_surrogate_identity_required(true);
    assert!(synth.is_surrogate_identity_required());
    assert_eq!(artifact.as_bytes(), &before[..]);
    assert!(ParsedClass::parse(&before).unwrap().fields.is_empty());
}

#[test]
fn test_post_create_methods_added() {
    let bean = foo()
        .with_method(BeanMethod::new("ejbCreate", &["int"]).returning("java.lang.Integer"))
        .with_method(BeanMethod::new("ejbCreateNamed", &["java.lang.String"]))
        .with_method(BeanMethod::new("ejbPostCreateNamed", &["java.lang.String"]));
    let class = generate(&bean, false);

    let post_create = class.method("ejbPostCreate", "(I)V").unwrap();
    assert_eq!(post_create.access, AccessFlags::PUBLIC);
    let code = post_create.code.as_ref().unwrap();
    assert_eq!(code.instructions.as_deref(), Some(&[Instruction::Return(None)][..]));
    assert_eq!(code.max_locals, 2);
    assert!(class
        .method("ejbPostCreateNamed", "(Ljava/lang/String;)V")
        .is_none());
}

#[test]
fn test_unknown_parameter_type_fails_generation() {
    let bean = foo().with_method(BeanMethod::new("ejbCreate", &["com..Broken"]));
    let mut synth = ModuleSynthesizer::new("com.example.FooImpl", &bean).unwrap();
    let err = synth.generate().unwrap_err();
    assert!(matches!(
        err.synthesis_failure(),
        Some(SynthesisFailure::Generator(_))
    ));
}

#[test]
fn test_existing_post_create_spelled_differently_is_not_overridden() {
    let bean = foo()
        .with_method(BeanMethod::new("ejbCreate", &["long[]"]))
        .with_method(BeanMethod::new("ejbPostCreate", &["long []"]));
    let class = generate(&bean, false);
    assert!(class.method("ejbPostCreate", "([J)V").is_none());
    assert_eq!(class.methods.len(), 1);
}

#[test]
fn test_bodiless_collaborator_method_yields_no_artifact() {
    fn bodiless(sink: &mut MemberSink<'_>) -> Result<(), GeneratorError> {
        sink.add_method(MethodSpec::new(
            AccessFlags::PUBLIC,
            "ejbLoad",
            MethodDescriptor::no_args_void(),
        ))?;
        Ok(())
    }

    let mut synth =
        ModuleSynthesizer::with_generator("com.example.FooImpl", &foo(), bodiless).unwrap();
    let err = synth.generate().unwrap_err();
    assert!(matches!(
        err,
        Error::Synthesis {
            step: SynthesisPhase::MethodsEmitted,
            ..
        }
    ));
    assert!(err.to_string().contains("has no code"));
}

#[test]
fn test_independent_synthesizers_on_threads() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let bean = BeanClass::named(format!("com.example.Bean{i}"))
                    .with_method(BeanMethod::new("ejbCreate", &["int"]));
                let mut synth =
                    ModuleSynthesizer::new(&format!("com.example.Bean{i}Impl"), &bean).unwrap();
                synth.set_surrogate_identity_required(i % 2 == 0);
                synth.generate().unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let artifact = handle.join().unwrap();
        let class = ParsedClass::parse(artifact.as_bytes()).unwrap();
        assert_eq!(class.this_class, format!("com/example/Bean{i}Impl"));
        assert_eq!(class.fields.len(), usize::from(i % 2 == 0));
    }
}
