//! The straight-line instruction subset the synthesizer emits.
//!
//! There are no branches, so `max_stack` is a single forward scan.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::constant_pool::ConstantPool;
use crate::descriptor::{FieldType, MethodDescriptor};
use crate::encoding::ByteWriter;
use crate::error::{ClassFileError, Result};

pub mod opcodes {
    pub const ACONST_NULL: u8 = 0x01;
    pub const ILOAD: u8 = 0x15;
    pub const ALOAD: u8 = 0x19;
    pub const ILOAD_0: u8 = 0x1a;
    pub const ALOAD_3: u8 = 0x2d;
    pub const POP: u8 = 0x57;
    pub const DUP: u8 = 0x59;
    pub const IRETURN: u8 = 0xac;
    pub const ARETURN: u8 = 0xb0;
    pub const RETURN: u8 = 0xb1;
    pub const GETFIELD: u8 = 0xb4;
    pub const PUTFIELD: u8 = 0xb5;
    pub const INVOKEVIRTUAL: u8 = 0xb6;
    pub const INVOKESPECIAL: u8 = 0xb7;
    pub const WIDE: u8 = 0xc4;
}

/// Computational category of a local or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    Int,
    Long,
    Float,
    Double,
    Reference,
}

impl ValueKind {
    pub fn of(ty: &FieldType) -> Self {
        match ty {
            FieldType::Boolean
            | FieldType::Byte
            | FieldType::Char
            | FieldType::Short
            | FieldType::Int => ValueKind::Int,
            FieldType::Long => ValueKind::Long,
            FieldType::Float => ValueKind::Float,
            FieldType::Double => ValueKind::Double,
            FieldType::Object(_) | FieldType::Array(_) => ValueKind::Reference,
        }
    }

    pub fn slots(self) -> u16 {
        match self {
            ValueKind::Long | ValueKind::Double => 2,
            _ => 1,
        }
    }

    /// Offset from the `i`-prefixed opcode of a load/return family.
    fn family_offset(self) -> u8 {
        match self {
            ValueKind::Int => 0,
            ValueKind::Long => 1,
            ValueKind::Float => 2,
            ValueKind::Double => 3,
            ValueKind::Reference => 4,
        }
    }

    pub(crate) fn from_family_offset(offset: u8) -> Option<Self> {
        match offset {
            0 => Some(ValueKind::Int),
            1 => Some(ValueKind::Long),
            2 => Some(ValueKind::Float),
            3 => Some(ValueKind::Double),
            4 => Some(ValueKind::Reference),
            _ => None,
        }
    }

    fn prefix(self) -> char {
        match self {
            ValueKind::Int => 'i',
            ValueKind::Long => 'l',
            ValueKind::Float => 'f',
            ValueKind::Double => 'd',
            ValueKind::Reference => 'a',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub owner: String,
    pub name: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub owner: String,
    pub name: String,
    pub descriptor: MethodDescriptor,
}

impl MethodRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, descriptor: MethodDescriptor) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            descriptor,
        }
    }

    /// `<owner>.<init>()V`
    pub fn no_arg_constructor(owner: impl Into<String>) -> Self {
        Self::new(owner, "<init>", MethodDescriptor::no_args_void())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    AconstNull,
    Load { kind: ValueKind, index: u16 },
    Dup,
    Pop,
    GetField(FieldRef),
    PutField(FieldRef),
    InvokeSpecial(MethodRef),
    InvokeVirtual(MethodRef),
    /// `return` when `None`, otherwise the typed return.
    Return(Option<ValueKind>),
}

impl Instruction {
    pub fn load(ty: &FieldType, index: u16) -> Self {
        Instruction::Load {
            kind: ValueKind::of(ty),
            index,
        }
    }

    /// The return instruction matching a method's return type.
    pub fn return_for(descriptor: &MethodDescriptor) -> Self {
        Instruction::Return(descriptor.return_type.as_ref().map(ValueKind::of))
    }

    /// Operand stack slots consumed and produced.
    pub fn stack_effect(&self) -> (u16, u16) {
        match self {
            Instruction::AconstNull => (0, 1),
            Instruction::Load { kind, .. } => (0, kind.slots()),
            Instruction::Dup => (1, 2),
            Instruction::Pop => (1, 0),
            Instruction::GetField(field) => (1, field.field_type.slot_size()),
            Instruction::PutField(field) => (1 + field.field_type.slot_size(), 0),
            Instruction::InvokeSpecial(method) | Instruction::InvokeVirtual(method) => (
                1 + method.descriptor.parameter_slots(),
                method.descriptor.return_slots(),
            ),
            Instruction::Return(kind) => (kind.map_or(0, ValueKind::slots), 0),
        }
    }

    /// One past the highest local slot this instruction touches.
    pub fn locals_touched(&self) -> u32 {
        match self {
            Instruction::Load { kind, index } => *index as u32 + kind.slots() as u32,
            _ => 0,
        }
    }

    pub fn encode(&self, pool: &mut ConstantPool, out: &mut ByteWriter) -> Result<()> {
        match self {
            Instruction::AconstNull => out.emit_u8(opcodes::ACONST_NULL),
            Instruction::Load { kind, index } => {
                let family = kind.family_offset();
                if *index <= 3 {
                    out.emit_u8(opcodes::ILOAD_0 + family * 4 + *index as u8);
                } else if *index <= u8::MAX as u16 {
                    out.emit_u8(opcodes::ILOAD + family);
                    out.emit_u8(*index as u8);
                } else {
                    out.emit_u8(opcodes::WIDE);
                    out.emit_u8(opcodes::ILOAD + family);
                    out.emit_u16(*index);
                }
            }
            Instruction::Dup => out.emit_u8(opcodes::DUP),
            Instruction::Pop => out.emit_u8(opcodes::POP),
            Instruction::GetField(field) | Instruction::PutField(field) => {
                let opcode = if matches!(self, Instruction::GetField(_)) {
                    opcodes::GETFIELD
                } else {
                    opcodes::PUTFIELD
                };
                let index =
                    pool.field_ref(&field.owner, &field.name, &field.field_type.descriptor())?;
                out.emit_u8(opcode);
                out.emit_u16(index);
            }
            Instruction::InvokeSpecial(method) | Instruction::InvokeVirtual(method) => {
                let opcode = if matches!(self, Instruction::InvokeSpecial(_)) {
                    opcodes::INVOKESPECIAL
                } else {
                    opcodes::INVOKEVIRTUAL
                };
                let index =
                    pool.method_ref(&method.owner, &method.name, &method.descriptor.descriptor())?;
                out.emit_u8(opcode);
                out.emit_u16(index);
            }
            Instruction::Return(None) => out.emit_u8(opcodes::RETURN),
            Instruction::Return(Some(kind)) => out.emit_u8(opcodes::IRETURN + kind.family_offset()),
        }
        Ok(())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::AconstNull => f.write_str("aconst_null"),
            Instruction::Load { kind, index } if *index <= 3 => {
                write!(f, "{}load_{}", kind.prefix(), index)
            }
            Instruction::Load { kind, index } => write!(f, "{}load {}", kind.prefix(), index),
            Instruction::Dup => f.write_str("dup"),
            Instruction::Pop => f.write_str("pop"),
            Instruction::GetField(r) => write!(f, "getfield {}.{}:{}", r.owner, r.name, r.field_type),
            Instruction::PutField(r) => write!(f, "putfield {}.{}:{}", r.owner, r.name, r.field_type),
            Instruction::InvokeSpecial(r) => {
                write!(f, "invokespecial {}.{}:{}", r.owner, r.name, r.descriptor)
            }
            Instruction::InvokeVirtual(r) => {
                write!(f, "invokevirtual {}.{}:{}", r.owner, r.name, r.descriptor)
            }
            Instruction::Return(None) => f.write_str("return"),
            Instruction::Return(Some(kind)) => write!(f, "{}return", kind.prefix()),
        }
    }
}

impl Serialize for Instruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Maximum operand stack depth reached by `code`.
pub fn compute_max_stack(method: &str, code: &[Instruction]) -> Result<u16> {
    let mut depth: u32 = 0;
    let mut max: u32 = 0;
    for (index, insn) in code.iter().enumerate() {
        let (pops, pushes) = insn.stack_effect();
        depth = depth
            .checked_sub(pops as u32)
            .ok_or_else(|| ClassFileError::StackUnderflow {
                method: method.to_string(),
                index,
            })?;
        depth += pushes as u32;
        max = max.max(depth);
    }
    u16::try_from(max).map_err(|_| ClassFileError::FrameTooLarge(method.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(insn: Instruction) -> Vec<u8> {
        let mut pool = ConstantPool::new();
        let mut out = ByteWriter::new();
        insn.encode(&mut pool, &mut out).unwrap();
        out.into_bytes()
    }

    #[test]
    fn test_load_forms() {
        assert_eq!(encode(Instruction::Load { kind: ValueKind::Reference, index: 0 }), vec![0x2a]);
        assert_eq!(encode(Instruction::Load { kind: ValueKind::Reference, index: 3 }), vec![opcodes::ALOAD_3]);
        assert_eq!(encode(Instruction::Load { kind: ValueKind::Long, index: 1 }), vec![0x1f]);
        assert_eq!(encode(Instruction::Load { kind: ValueKind::Int, index: 7 }), vec![0x15, 7]);
        assert_eq!(
            encode(Instruction::Load { kind: ValueKind::Double, index: 300 }),
            vec![0xc4, 0x18, 0x01, 0x2c]
        );
    }

    #[test]
    fn test_return_forms() {
        assert_eq!(encode(Instruction::Return(None)), vec![0xb1]);
        assert_eq!(encode(Instruction::Return(Some(ValueKind::Int))), vec![0xac]);
        assert_eq!(encode(Instruction::Return(Some(ValueKind::Reference))), vec![opcodes::ARETURN]);
        let desc = MethodDescriptor::new(vec![], Some(FieldType::Double));
        assert_eq!(Instruction::return_for(&desc), Instruction::Return(Some(ValueKind::Double)));
    }

    #[test]
    fn test_invokespecial_references_pool() {
        let mut pool = ConstantPool::new();
        let mut out = ByteWriter::new();
        Instruction::InvokeSpecial(MethodRef::no_arg_constructor("Foo"))
            .encode(&mut pool, &mut out)
            .unwrap();
        let bytes = out.into_bytes();
        assert_eq!(bytes[0], opcodes::INVOKESPECIAL);
        let index = u16::from_be_bytes([bytes[1], bytes[2]]);
        assert!(matches!(
            pool.get(index),
            Some(crate::constant_pool::Constant::Methodref { .. })
        ));
    }

    #[test]
    fn test_forwarding_constructor_stack() {
        let code = vec![
            Instruction::Load { kind: ValueKind::Reference, index: 0 },
            Instruction::InvokeSpecial(MethodRef::no_arg_constructor("Foo")),
            Instruction::Return(None),
        ];
        assert_eq!(compute_max_stack("<init>", &code).unwrap(), 1);
    }

    #[test]
    fn test_wide_values_count_twice() {
        let setter = FieldRef {
            owner: "Foo".into(),
            name: "id".into(),
            field_type: FieldType::Long,
        };
        let code = vec![
            Instruction::Load { kind: ValueKind::Reference, index: 0 },
            Instruction::Load { kind: ValueKind::Long, index: 1 },
            Instruction::PutField(setter),
            Instruction::Return(None),
        ];
        assert_eq!(compute_max_stack("setId", &code).unwrap(), 3);
        assert_eq!(code[1].locals_touched(), 3);
    }

    #[test]
    fn test_underflow_is_rejected() {
        let err = compute_max_stack("broken", &[Instruction::Pop]).unwrap_err();
        assert_eq!(
            err,
            ClassFileError::StackUnderflow {
                method: "broken".into(),
                index: 0
            }
        );
    }

    #[test]
    fn test_display() {
        let insn = Instruction::InvokeSpecial(MethodRef::no_arg_constructor("com/example/Foo"));
        assert_eq!(insn.to_string(), "invokespecial com/example/Foo.<init>:()V");
        assert_eq!(Instruction::Load { kind: ValueKind::Reference, index: 0 }.to_string(), "aload_0");
    }
}
