//! Class-file parser used to verify generated output and by `inspect`.
//!
//! Every constant tag is understood well enough to skip it, but only the
//! instruction subset in [`crate::instruction`] is decoded; other bodies keep
//! their raw bytes with `instructions: None`.

use serde::Serialize;

use crate::access::AccessFlags;
use crate::constant_pool::tags;
use crate::descriptor::{FieldType, MethodDescriptor};
use crate::encoding::{decode_modified_utf8, ByteReader};
use crate::error::{ClassFileError, Result};
use crate::instruction::{opcodes, FieldRef, Instruction, MethodRef, ValueKind};
use crate::writer::{ClassVersion, MAGIC};

#[derive(Debug, Clone, Serialize)]
pub struct ParsedClass {
    pub version: ClassVersion,
    pub access: AccessFlags,
    pub this_class: String,
    /// `None` only for `java/lang/Object`.
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ParsedField>,
    pub methods: Vec<ParsedMethod>,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedField {
    pub access: AccessFlags,
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedMethod {
    pub access: AccessFlags,
    pub name: String,
    pub descriptor: String,
    pub code: Option<ParsedCode>,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedCode {
    pub max_stack: u16,
    pub max_locals: u16,
    #[serde(serialize_with = "hex_bytes")]
    pub bytecode: Vec<u8>,
    pub instructions: Option<Vec<Instruction>>,
}

fn hex_bytes<S: serde::Serializer>(bytes: &[u8], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(bytes))
}

impl ParsedClass {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut r = ByteReader::new(bytes);
        let magic = r.read_u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::BadMagic(magic));
        }
        let minor = r.read_u16()?;
        let major = r.read_u16()?;
        let pool = RawPool::parse(&mut r)?;

        let access = AccessFlags::from_bits(r.read_u16()?);
        let this_class = pool.class_name(r.read_u16()?)?;
        let super_index = r.read_u16()?;
        let super_class = if super_index == 0 {
            None
        } else {
            Some(pool.class_name(super_index)?)
        };
        let interface_count = r.read_u16()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(pool.class_name(r.read_u16()?)?);
        }

        let field_count = r.read_u16()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let access = AccessFlags::from_bits(r.read_u16()?);
            let name = pool.utf8(r.read_u16()?)?;
            let descriptor = pool.utf8(r.read_u16()?)?;
            let attributes = skip_attributes(&mut r, &pool)?;
            fields.push(ParsedField {
                access,
                name,
                descriptor,
                attributes,
            });
        }

        let method_count = r.read_u16()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            let access = AccessFlags::from_bits(r.read_u16()?);
            let name = pool.utf8(r.read_u16()?)?;
            let descriptor = pool.utf8(r.read_u16()?)?;
            let mut code = None;
            let mut attributes = Vec::new();
            for _ in 0..r.read_u16()? {
                let attr_name = pool.utf8(r.read_u16()?)?;
                let length = r.read_u32()? as usize;
                let body = r.read_bytes(length)?;
                if attr_name == "Code" {
                    code = Some(parse_code(body, &pool)?);
                }
                attributes.push(attr_name);
            }
            methods.push(ParsedMethod {
                access,
                name,
                descriptor,
                code,
                attributes,
            });
        }

        let attributes = skip_attributes(&mut r, &pool)?;
        if r.remaining() != 0 {
            return Err(ClassFileError::TrailingBytes(r.remaining()));
        }

        Ok(Self {
            version: ClassVersion { major, minor },
            access,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    pub fn field(&self, name: &str) -> Option<&ParsedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&ParsedMethod> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &ParsedMethod> {
        self.methods.iter().filter(|m| m.name == "<init>")
    }
}

fn skip_attributes(r: &mut ByteReader<'_>, pool: &RawPool) -> Result<Vec<String>> {
    let count = r.read_u16()?;
    let mut names = Vec::with_capacity(count as usize);
    for _ in 0..count {
        names.push(pool.utf8(r.read_u16()?)?);
        let length = r.read_u32()? as usize;
        r.read_bytes(length)?;
    }
    Ok(names)
}

fn parse_code(body: &[u8], pool: &RawPool) -> Result<ParsedCode> {
    let mut r = ByteReader::new(body);
    let max_stack = r.read_u16()?;
    let max_locals = r.read_u16()?;
    let code_length = r.read_u32()? as usize;
    let bytecode = r.read_bytes(code_length)?.to_vec();
    let exception_entries = r.read_u16()? as usize;
    r.read_bytes(exception_entries * 8)?;
    skip_attributes(&mut r, pool)?;
    let instructions = match decode_instructions(&bytecode, pool) {
        Ok(insns) => Some(insns),
        Err(ClassFileError::UnsupportedOpcode { .. }) => None,
        Err(e) => return Err(e),
    };
    Ok(ParsedCode {
        max_stack,
        max_locals,
        bytecode,
        instructions,
    })
}

fn decode_instructions(code: &[u8], pool: &RawPool) -> Result<Vec<Instruction>> {
    let mut r = ByteReader::new(code);
    let mut out = Vec::new();
    while r.remaining() > 0 {
        let offset = r.offset();
        let opcode = r.read_u8()?;
        let insn = match opcode {
            opcodes::ACONST_NULL => Instruction::AconstNull,
            opcodes::ILOAD..=opcodes::ALOAD => Instruction::Load {
                kind: load_kind(opcode - opcodes::ILOAD, offset)?,
                index: r.read_u8()? as u16,
            },
            opcodes::ILOAD_0..=opcodes::ALOAD_3 => {
                let rel = opcode - opcodes::ILOAD_0;
                Instruction::Load {
                    kind: load_kind(rel / 4, offset)?,
                    index: (rel % 4) as u16,
                }
            }
            opcodes::WIDE => {
                let inner = r.read_u8()?;
                if !(opcodes::ILOAD..=opcodes::ALOAD).contains(&inner) {
                    return Err(ClassFileError::UnsupportedOpcode {
                        opcode: inner,
                        offset,
                    });
                }
                Instruction::Load {
                    kind: load_kind(inner - opcodes::ILOAD, offset)?,
                    index: r.read_u16()?,
                }
            }
            opcodes::DUP => Instruction::Dup,
            opcodes::POP => Instruction::Pop,
            opcodes::GETFIELD | opcodes::PUTFIELD => {
                let (owner, name, descriptor) = pool.member_ref(r.read_u16()?)?;
                let field = FieldRef {
                    owner,
                    name,
                    field_type: FieldType::parse(&descriptor)?,
                };
                if opcode == opcodes::GETFIELD {
                    Instruction::GetField(field)
                } else {
                    Instruction::PutField(field)
                }
            }
            opcodes::INVOKEVIRTUAL | opcodes::INVOKESPECIAL => {
                let (owner, name, descriptor) = pool.member_ref(r.read_u16()?)?;
                let method = MethodRef::new(owner, name, MethodDescriptor::parse(&descriptor)?);
                if opcode == opcodes::INVOKESPECIAL {
                    Instruction::InvokeSpecial(method)
                } else {
                    Instruction::InvokeVirtual(method)
                }
            }
            opcodes::IRETURN..=opcodes::ARETURN => Instruction::Return(Some(load_kind(
                opcode - opcodes::IRETURN,
                offset,
            )?)),
            opcodes::RETURN => Instruction::Return(None),
            other => {
                return Err(ClassFileError::UnsupportedOpcode {
                    opcode: other,
                    offset,
                })
            }
        };
        out.push(insn);
    }
    Ok(out)
}

fn load_kind(family: u8, offset: usize) -> Result<ValueKind> {
    ValueKind::from_family_offset(family).ok_or(ClassFileError::UnsupportedOpcode {
        opcode: family,
        offset,
    })
}

#[derive(Debug, Clone)]
enum RawConstant {
    Utf8(String),
    Class(u16),
    MemberRef { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
    Other,
}

/// Constant pool as read from disk; slot 0 and the slot after each
/// Long/Double hold `None`.
struct RawPool {
    entries: Vec<Option<RawConstant>>,
}

impl RawPool {
    fn parse(r: &mut ByteReader<'_>) -> Result<Self> {
        let count = r.read_u16()?;
        let mut entries: Vec<Option<RawConstant>> = vec![None];
        let mut index: u16 = 1;
        while index < count {
            let tag = r.read_u8()?;
            let (constant, slots) = match tag {
                tags::UTF8 => {
                    let len = r.read_u16()? as usize;
                    let bytes = r.read_bytes(len)?;
                    let s = decode_modified_utf8(bytes)
                        .ok_or(ClassFileError::MalformedUtf8(index))?;
                    (RawConstant::Utf8(s), 1)
                }
                tags::INTEGER | tags::FLOAT => {
                    r.read_u32()?;
                    (RawConstant::Other, 1)
                }
                tags::LONG | tags::DOUBLE => {
                    r.read_i64()?;
                    (RawConstant::Other, 2)
                }
                tags::CLASS => (RawConstant::Class(r.read_u16()?), 1),
                tags::STRING | tags::METHOD_TYPE | tags::MODULE | tags::PACKAGE => {
                    r.read_u16()?;
                    (RawConstant::Other, 1)
                }
                tags::FIELDREF | tags::METHODREF | tags::INTERFACE_METHODREF => (
                    RawConstant::MemberRef {
                        class: r.read_u16()?,
                        name_and_type: r.read_u16()?,
                    },
                    1,
                ),
                tags::NAME_AND_TYPE => (
                    RawConstant::NameAndType {
                        name: r.read_u16()?,
                        descriptor: r.read_u16()?,
                    },
                    1,
                ),
                tags::METHOD_HANDLE => {
                    r.read_u8()?;
                    r.read_u16()?;
                    (RawConstant::Other, 1)
                }
                tags::DYNAMIC | tags::INVOKE_DYNAMIC => {
                    r.read_u32()?;
                    (RawConstant::Other, 1)
                }
                _ => return Err(ClassFileError::UnknownConstantTag { tag, index }),
            };
            entries.push(Some(constant));
            if slots == 2 {
                entries.push(None);
            }
            index = index.saturating_add(slots);
        }
        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&RawConstant> {
        self.entries
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(ClassFileError::BadConstantIndex(index))
    }

    fn utf8(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            RawConstant::Utf8(s) => Ok(s.clone()),
            _ => Err(ClassFileError::BadConstantIndex(index)),
        }
    }

    fn class_name(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            RawConstant::Class(name) => self.utf8(*name),
            _ => Err(ClassFileError::BadConstantIndex(index)),
        }
    }

    fn member_ref(&self, index: u16) -> Result<(String, String, String)> {
        let (class, name_and_type) = match self.get(index)? {
            RawConstant::MemberRef {
                class,
                name_and_type,
            } => (*class, *name_and_type),
            _ => return Err(ClassFileError::BadConstantIndex(index)),
        };
        let owner = self.class_name(class)?;
        match self.get(name_and_type)? {
            RawConstant::NameAndType { name, descriptor } => {
                Ok((owner, self.utf8(*name)?, self.utf8(*descriptor)?))
            }
            _ => Err(ClassFileError::BadConstantIndex(name_and_type)),
        }
    }
}
