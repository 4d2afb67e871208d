//! Deduplicating constant pool builder.
//!
//! Entries are numbered from 1 in insertion order. `CONSTANT_Long` takes two
//! slots, so the slot after it is never handed out.

use std::collections::HashMap;
use tracing::trace;

use crate::encoding::{encode_modified_utf8, ByteWriter};
use crate::error::{ClassFileError, Result};

pub mod tags {
    pub const UTF8: u8 = 1;
    pub const INTEGER: u8 = 3;
    pub const FLOAT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const DOUBLE: u8 = 6;
    pub const CLASS: u8 = 7;
    pub const STRING: u8 = 8;
    pub const FIELDREF: u8 = 9;
    pub const METHODREF: u8 = 10;
    pub const INTERFACE_METHODREF: u8 = 11;
    pub const NAME_AND_TYPE: u8 = 12;
    pub const METHOD_HANDLE: u8 = 15;
    pub const METHOD_TYPE: u8 = 16;
    pub const DYNAMIC: u8 = 17;
    pub const INVOKE_DYNAMIC: u8 = 18;
    pub const MODULE: u8 = 19;
    pub const PACKAGE: u8 = 20;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Long(i64),
    Class { name: u16 },
    String { value: u16 },
    Fieldref { class: u16, name_and_type: u16 },
    Methodref { class: u16, name_and_type: u16 },
    InterfaceMethodref { class: u16, name_and_type: u16 },
    NameAndType { name: u16, descriptor: u16 },
}

impl Constant {
    fn slots(&self) -> u16 {
        match self {
            Constant::Long(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConstantPool {
    entries: Vec<(u16, Constant)>,
    index: HashMap<Constant, u16>,
    next: u16,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            next: 1,
        }
    }

    /// Value for the class file's `constant_pool_count` field.
    pub fn count(&self) -> u16 {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .ok()
            .map(|pos| &self.entries[pos].1)
    }

    fn insert(&mut self, constant: Constant) -> Result<u16> {
        if let Some(&existing) = self.index.get(&constant) {
            return Ok(existing);
        }
        let slots = constant.slots();
        if self.next as u32 + slots as u32 > u16::MAX as u32 {
            return Err(ClassFileError::ConstantPoolOverflow);
        }
        let index = self.next;
        self.next += slots;
        trace!(index, ?constant, "constant pool entry added");
        self.index.insert(constant.clone(), index);
        self.entries.push((index, constant));
        Ok(index)
    }

    pub fn utf8(&mut self, value: &str) -> Result<u16> {
        let encoded_len = encode_modified_utf8(value).len();
        if encoded_len > u16::MAX as usize {
            return Err(ClassFileError::Utf8TooLong(encoded_len));
        }
        self.insert(Constant::Utf8(value.to_string()))
    }

    pub fn integer(&mut self, value: i32) -> Result<u16> {
        self.insert(Constant::Integer(value))
    }

    pub fn long(&mut self, value: i64) -> Result<u16> {
        self.insert(Constant::Long(value))
    }

    /// `CONSTANT_Class` for an internal name.
    pub fn class(&mut self, internal_name: &str) -> Result<u16> {
        let name = self.utf8(internal_name)?;
        self.insert(Constant::Class { name })
    }

    pub fn string(&mut self, value: &str) -> Result<u16> {
        let value = self.utf8(value)?;
        self.insert(Constant::String { value })
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16> {
        let name = self.utf8(name)?;
        let descriptor = self.utf8(descriptor)?;
        self.insert(Constant::NameAndType { name, descriptor })
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.insert(Constant::Fieldref {
            class,
            name_and_type,
        })
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> Result<u16> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.insert(Constant::Methodref {
            class,
            name_and_type,
        })
    }

    pub fn interface_method_ref(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16> {
        let class = self.class(owner)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.insert(Constant::InterfaceMethodref {
            class,
            name_and_type,
        })
    }

    /// Write every entry (without the leading count).
    pub fn write_to(&self, out: &mut ByteWriter) {
        for (_, constant) in &self.entries {
            match constant {
                Constant::Utf8(value) => {
                    let bytes = encode_modified_utf8(value);
                    out.emit_u8(tags::UTF8);
                    out.emit_u16(bytes.len() as u16);
                    out.emit_bytes(&bytes);
                }
                Constant::Integer(value) => {
                    out.emit_u8(tags::INTEGER);
                    out.emit_i32(*value);
                }
                Constant::Long(value) => {
                    out.emit_u8(tags::LONG);
                    out.emit_i64(*value);
                }
                Constant::Class { name } => {
                    out.emit_u8(tags::CLASS);
                    out.emit_u16(*name);
                }
                Constant::String { value } => {
                    out.emit_u8(tags::STRING);
                    out.emit_u16(*value);
                }
                Constant::Fieldref {
                    class,
                    name_and_type,
                } => {
                    out.emit_u8(tags::FIELDREF);
                    out.emit_u16(*class);
                    out.emit_u16(*name_and_type);
                }
                Constant::Methodref {
                    class,
                    name_and_type,
                } => {
                    out.emit_u8(tags::METHODREF);
                    out.emit_u16(*class);
                    out.emit_u16(*name_and_type);
                }
                Constant::InterfaceMethodref {
                    class,
                    name_and_type,
                } => {
                    out.emit_u8(tags::INTERFACE_METHODREF);
                    out.emit_u16(*class);
                    out.emit_u16(*name_and_type);
                }
                Constant::NameAndType { name, descriptor } => {
                    out.emit_u8(tags::NAME_AND_TYPE);
                    out.emit_u16(*name);
                    out.emit_u16(*descriptor);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_deduplicated() {
        let mut pool = ConstantPool::new();
        let a = pool.class("com/example/Foo").unwrap();
        let b = pool.class("com/example/Foo").unwrap();
        assert_eq!(a, b);
        // Utf8 at 1, Class at 2.
        assert_eq!(a, 2);
        assert_eq!(pool.count(), 3);
    }

    #[test]
    fn test_method_ref_shares_class_entry() {
        let mut pool = ConstantPool::new();
        let class = pool.class("Foo").unwrap();
        let method = pool.method_ref("Foo", "<init>", "()V").unwrap();
        match pool.get(method) {
            Some(Constant::Methodref { class: c, .. }) => assert_eq!(*c, class),
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_long_takes_two_slots() {
        let mut pool = ConstantPool::new();
        let long = pool.long(42).unwrap();
        let next = pool.utf8("after").unwrap();
        assert_eq!(long, 1);
        assert_eq!(next, 3);
        assert!(pool.get(2).is_none());
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut pool = ConstantPool::new();
        for i in 0..(u16::MAX as i32 - 1) {
            pool.integer(i).unwrap();
        }
        assert_eq!(pool.count(), u16::MAX);
        assert_eq!(pool.integer(-1), Err(ClassFileError::ConstantPoolOverflow));
    }

    #[test]
    fn test_utf8_encoding_on_the_wire() {
        let mut pool = ConstantPool::new();
        pool.utf8("Code").unwrap();
        let mut out = ByteWriter::new();
        pool.write_to(&mut out);
        assert_eq!(out.into_bytes(), vec![1, 0, 4, b'C', b'o', b'd', b'e']);
    }
}
