//! In-memory class under construction and its serializer.
//!
//! A [`ClassBuilder`] owns the header (version, access, this/super,
//! interfaces) plus the field and method tables. [`ClassBuilder::to_bytes`]
//! lays the constant pool out in a fixed order, so identical builders always
//! serialize to identical bytes.

use serde::Serialize;

use crate::access::AccessFlags;
use crate::constant_pool::ConstantPool;
use crate::descriptor::{FieldType, MethodDescriptor};
use crate::encoding::ByteWriter;
use crate::error::{ClassFileError, Result};
use crate::instruction::{compute_max_stack, Instruction};
use crate::names::{validate_internal_name, validate_member_name};

pub const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

impl ClassVersion {
    /// 49.0, the first version with annotations and no StackMapTable requirement.
    pub const JAVA_5: Self = Self {
        major: 49,
        minor: 0,
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub access: AccessFlags,
    pub name: String,
    pub field_type: FieldType,
}

impl FieldSpec {
    pub fn new(access: AccessFlags, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            access,
            name: name.into(),
            field_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub access: AccessFlags,
    pub name: String,
    pub descriptor: MethodDescriptor,
    /// `None` for abstract and native methods.
    pub code: Option<Vec<Instruction>>,
}

impl MethodSpec {
    pub fn new(access: AccessFlags, name: impl Into<String>, descriptor: MethodDescriptor) -> Self {
        Self {
            access,
            name: name.into(),
            descriptor,
            code: None,
        }
    }

    pub fn with_code(mut self, code: Vec<Instruction>) -> Self {
        self.code = Some(code);
        self
    }

    fn is_static(&self) -> bool {
        self.access.contains(AccessFlags::STATIC)
    }

    fn display_name(&self) -> String {
        format!("{}{}", self.name, self.descriptor)
    }
}

#[derive(Debug, Clone)]
pub struct ClassBuilder {
    version: ClassVersion,
    access: AccessFlags,
    this_class: String,
    super_class: String,
    interfaces: Vec<String>,
    fields: Vec<FieldSpec>,
    methods: Vec<MethodSpec>,
}

impl ClassBuilder {
    /// Start a class named `this_class` extending `super_class`; both are
    /// internal names.
    pub fn new(this_class: impl Into<String>, super_class: impl Into<String>) -> Result<Self> {
        let this_class = this_class.into();
        let super_class = super_class.into();
        validate_internal_name(&this_class)?;
        validate_internal_name(&super_class)?;
        if this_class == super_class {
            return Err(ClassFileError::SelfInheritance(this_class));
        }
        Ok(Self {
            version: ClassVersion::JAVA_5,
            access: AccessFlags::PUBLIC | AccessFlags::SUPER,
            this_class,
            super_class,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        })
    }

    pub fn version(&self) -> ClassVersion {
        self.version
    }

    pub fn set_version(&mut self, version: ClassVersion) {
        self.version = version;
    }

    pub fn access(&self) -> AccessFlags {
        self.access
    }

    pub fn set_access(&mut self, access: AccessFlags) {
        self.access = access;
    }

    pub fn this_class(&self) -> &str {
        &self.this_class
    }

    pub fn super_class(&self) -> &str {
        &self.super_class
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodSpec] {
        &self.methods
    }

    pub fn add_interface(&mut self, internal_name: impl Into<String>) -> Result<()> {
        let name = internal_name.into();
        validate_internal_name(&name)?;
        if self.interfaces.contains(&name) {
            return Err(ClassFileError::DuplicateInterface(name));
        }
        self.interfaces.push(name);
        Ok(())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn has_method(&self, name: &str, descriptor: &MethodDescriptor) -> bool {
        self.methods
            .iter()
            .any(|m| m.name == name && &m.descriptor == descriptor)
    }

    pub fn add_field(&mut self, field: FieldSpec) -> Result<()> {
        validate_member_name(&field.name, false)?;
        if self.has_field(&field.name) {
            return Err(ClassFileError::DuplicateField(field.name));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Append a method. Its body must agree with its flags: concrete methods
    /// carry code ending in the return their descriptor calls for.
    pub fn add_method(&mut self, method: MethodSpec) -> Result<()> {
        validate_member_name(&method.name, true)?;
        validate_body(&method)?;
        if self.has_method(&method.name, &method.descriptor) {
            return Err(ClassFileError::DuplicateMethod {
                name: method.name,
                descriptor: method.descriptor.descriptor(),
            });
        }
        self.methods.push(method);
        Ok(())
    }

    /// Serialize to a complete class file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut pool = ConstantPool::new();
        let this_index = pool.class(&self.this_class)?;
        let super_index = pool.class(&self.super_class)?;
        let interface_indices = self
            .interfaces
            .iter()
            .map(|name| pool.class(name))
            .collect::<Result<Vec<u16>>>()?;

        let mut members = ByteWriter::new();
        members.emit_u16(self.fields.len() as u16);
        for field in &self.fields {
            members.emit_u16(field.access.bits());
            members.emit_u16(pool.utf8(&field.name)?);
            members.emit_u16(pool.utf8(&field.field_type.descriptor())?);
            members.emit_u16(0);
        }

        members.emit_u16(self.methods.len() as u16);
        for method in &self.methods {
            members.emit_u16(method.access.bits());
            members.emit_u16(pool.utf8(&method.name)?);
            members.emit_u16(pool.utf8(&method.descriptor.descriptor())?);
            match &method.code {
                Some(code) => {
                    members.emit_u16(1);
                    write_code_attribute(method, code, &mut pool, &mut members)?;
                }
                None => members.emit_u16(0),
            }
        }

        let mut out = ByteWriter::with_capacity(members.len() + 256);
        out.emit_u32(MAGIC);
        out.emit_u16(self.version.minor);
        out.emit_u16(self.version.major);
        out.emit_u16(pool.count());
        pool.write_to(&mut out);
        out.emit_u16(self.access.bits());
        out.emit_u16(this_index);
        out.emit_u16(super_index);
        out.emit_u16(interface_indices.len() as u16);
        for index in interface_indices {
            out.emit_u16(index);
        }
        out.emit_bytes(members.as_slice());
        // class attributes
        out.emit_u16(0);
        Ok(out.into_bytes())
    }
}

fn validate_body(method: &MethodSpec) -> Result<()> {
    if method.name == "<init>" && method.descriptor.return_type.is_some() {
        return Err(ClassFileError::NonVoidConstructor(method.display_name()));
    }
    match (&method.code, method.access.has_body()) {
        (None, true) => Err(ClassFileError::MissingCode(method.display_name())),
        (Some(_), false) => Err(ClassFileError::UnexpectedCode(method.display_name())),
        (None, false) => Ok(()),
        (Some(code), true) => match code.last() {
            None => Err(ClassFileError::EmptyCode(method.display_name())),
            Some(last) if *last == Instruction::return_for(&method.descriptor) => Ok(()),
            Some(_) => Err(ClassFileError::MissingReturn(method.display_name())),
        },
    }
}

fn write_code_attribute(
    method: &MethodSpec,
    code: &[Instruction],
    pool: &mut ConstantPool,
    out: &mut ByteWriter,
) -> Result<()> {
    let name = method.display_name();
    let mut bytecode = ByteWriter::new();
    for insn in code {
        insn.encode(pool, &mut bytecode)?;
    }
    if bytecode.len() > u16::MAX as usize {
        return Err(ClassFileError::CodeTooLarge {
            method: name,
            length: bytecode.len(),
        });
    }

    let max_stack = compute_max_stack(&name, code)?;
    let receiver = if method.is_static() { 0 } else { 1 };
    let declared = receiver + method.descriptor.parameter_slots() as u32;
    let touched = code.iter().map(Instruction::locals_touched).max().unwrap_or(0);
    let max_locals = u16::try_from(declared.max(touched))
        .map_err(|_| ClassFileError::FrameTooLarge(name.clone()))?;

    // max_stack, max_locals, code_length, code, exception_table_length, attributes_count
    let attribute_length = 2 + 2 + 4 + bytecode.len() as u32 + 2 + 2;
    out.emit_u16(pool.utf8("Code")?);
    out.emit_u32(attribute_length);
    out.emit_u16(max_stack);
    out.emit_u16(max_locals);
    out.emit_u32(bytecode.len() as u32);
    out.emit_bytes(bytecode.as_slice());
    out.emit_u16(0);
    out.emit_u16(0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{MethodRef, ValueKind};

    fn builder() -> ClassBuilder {
        ClassBuilder::new("com/example/FooImpl", "com/example/Foo").unwrap()
    }

    #[test]
    fn test_self_inheritance_rejected() {
        let err = ClassBuilder::new("Foo", "Foo").unwrap_err();
        assert_eq!(err, ClassFileError::SelfInheritance("Foo".into()));
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut b = builder();
        let field = FieldSpec::new(AccessFlags::PUBLIC, "id", FieldType::Int);
        b.add_field(field.clone()).unwrap();
        assert_eq!(b.add_field(field), Err(ClassFileError::DuplicateField("id".into())));

        let method = MethodSpec::new(AccessFlags::PUBLIC, "run", MethodDescriptor::no_args_void())
            .with_code(vec![Instruction::Return(None)]);
        b.add_method(method.clone()).unwrap();
        assert!(matches!(
            b.add_method(method),
            Err(ClassFileError::DuplicateMethod { .. })
        ));
        // Same name, different descriptor is an overload.
        let overload =
            MethodSpec::new(AccessFlags::PUBLIC, "run", MethodDescriptor::new(vec![FieldType::Int], None))
                .with_code(vec![Instruction::Return(None)]);
        assert!(b.add_method(overload).is_ok());

        b.add_interface("javax/ejb/EntityBean").unwrap();
        assert!(b.add_interface("javax/ejb/EntityBean").is_err());
    }

    #[test]
    fn test_minimal_class_layout() {
        let bytes = builder().to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
        // minor 0, major 49
        assert_eq!(&bytes[4..8], &[0, 0, 0, 49]);
        // two Utf8 + two Class entries
        assert_eq!(u16::from_be_bytes([bytes[8], bytes[9]]), 5);
    }

    #[test]
    fn test_identical_builders_serialize_identically() {
        let make = || {
            let mut b = builder();
            b.add_interface("javax/ejb/EntityBean").unwrap();
            b.add_method(
                MethodSpec::new(AccessFlags::PUBLIC, "<init>", MethodDescriptor::no_args_void())
                    .with_code(vec![
                        Instruction::Load { kind: ValueKind::Reference, index: 0 },
                        Instruction::InvokeSpecial(MethodRef::no_arg_constructor("com/example/Foo")),
                        Instruction::Return(None),
                    ]),
            )
            .unwrap();
            b.to_bytes().unwrap()
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn test_empty_code_rejected() {
        let mut b = builder();
        let err = b
            .add_method(
                MethodSpec::new(AccessFlags::PUBLIC, "noop", MethodDescriptor::no_args_void())
                    .with_code(Vec::new()),
            )
            .unwrap_err();
        assert_eq!(err, ClassFileError::EmptyCode("noop()V".into()));
        assert!(b.methods().is_empty());
    }

    #[test]
    fn test_concrete_method_without_code_rejected() {
        let mut b = builder();
        let err = b
            .add_method(MethodSpec::new(
                AccessFlags::PUBLIC,
                "ejbLoad",
                MethodDescriptor::no_args_void(),
            ))
            .unwrap_err();
        assert_eq!(err, ClassFileError::MissingCode("ejbLoad()V".into()));
        assert!(b.to_bytes().is_ok());
    }

    #[test]
    fn test_abstract_and_native_bodies() {
        let mut b = builder();
        let abstract_flags = AccessFlags::PUBLIC | AccessFlags::ABSTRACT;
        b.add_method(MethodSpec::new(abstract_flags, "ejbStore", MethodDescriptor::no_args_void()))
            .unwrap();
        let err = b
            .add_method(
                MethodSpec::new(
                    AccessFlags::PUBLIC | AccessFlags::NATIVE,
                    "ejbRemove",
                    MethodDescriptor::no_args_void(),
                )
                .with_code(vec![Instruction::Return(None)]),
            )
            .unwrap_err();
        assert_eq!(err, ClassFileError::UnexpectedCode("ejbRemove()V".into()));
    }

    #[test]
    fn test_code_must_end_with_matching_return() {
        let mut b = builder();
        let int_getter = MethodDescriptor::new(vec![], Some(FieldType::Int));

        let falls_off = MethodSpec::new(AccessFlags::PUBLIC, "getId", int_getter.clone())
            .with_code(vec![Instruction::Load { kind: ValueKind::Int, index: 1 }]);
        assert_eq!(
            b.add_method(falls_off),
            Err(ClassFileError::MissingReturn("getId()I".into()))
        );

        let wrong_kind = MethodSpec::new(AccessFlags::PUBLIC, "getId", int_getter.clone())
            .with_code(vec![Instruction::AconstNull, Instruction::Return(Some(ValueKind::Reference))]);
        assert_eq!(
            b.add_method(wrong_kind),
            Err(ClassFileError::MissingReturn("getId()I".into()))
        );

        let void_return = MethodSpec::new(AccessFlags::PUBLIC, "getId", int_getter)
            .with_code(vec![Instruction::Return(None)]);
        assert!(b.add_method(void_return).is_err());
        assert!(b.methods().is_empty());
    }

    #[test]
    fn test_non_void_constructor_rejected() {
        let mut b = builder();
        let err = b
            .add_method(
                MethodSpec::new(
                    AccessFlags::PUBLIC,
                    "<init>",
                    MethodDescriptor::new(vec![], Some(FieldType::Int)),
                )
                .with_code(vec![
                    Instruction::Load { kind: ValueKind::Int, index: 1 },
                    Instruction::Return(Some(ValueKind::Int)),
                ]),
            )
            .unwrap_err();
        assert_eq!(err, ClassFileError::NonVoidConstructor("<init>()I".into()));
    }
}
