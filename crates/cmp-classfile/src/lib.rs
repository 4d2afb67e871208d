//! CMP Class File
//!
//! A small, dependency-light model of the JVM class-file format, sized for
//! synthesizing container wrapper classes.
//!
//! # Features
//!
//! - **Builder**: [`ClassBuilder`] collects header, fields and methods
//! - **Serializer**: deterministic constant pool layout, `Code` attributes
//!   with computed `max_stack`/`max_locals`
//! - **Reader**: [`ParsedClass`] parses class files back for verification
//!   and inspection
//!
//! # Example
//!
//! ```
//! use cmp_classfile::{AccessFlags, ClassBuilder, Instruction, MethodDescriptor, MethodRef, MethodSpec, ParsedClass};
//!
//! let mut class = ClassBuilder::new("com/example/FooImpl", "com/example/Foo")?;
//! class.add_method(
//!     MethodSpec::new(AccessFlags::PUBLIC, "<init>", MethodDescriptor::no_args_void()).with_code(vec![
//!         Instruction::load(&cmp_classfile::FieldType::object("com/example/FooImpl"), 0),
//!         Instruction::InvokeSpecial(MethodRef::no_arg_constructor("com/example/Foo")),
//!         Instruction::Return(None),
//!     ]),
//! )?;
//! let bytes = class.to_bytes()?;
//! let parsed = ParsedClass::parse(&bytes)?;
//! assert_eq!(parsed.super_class.as_deref(), Some("com/example/Foo"));
//! # Ok::<(), cmp_classfile::ClassFileError>(())
//! ```

pub mod access;
pub mod constant_pool;
pub mod descriptor;
pub mod encoding;
pub mod error;
pub mod instruction;
pub mod names;
pub mod reader;
pub mod writer;

pub use access::AccessFlags;
pub use descriptor::{FieldType, MethodDescriptor};
pub use error::{ClassFileError, Result};
pub use instruction::{FieldRef, Instruction, MethodRef, ValueKind};
pub use reader::{ParsedClass, ParsedCode, ParsedField, ParsedMethod};
pub use writer::{ClassBuilder, ClassVersion, FieldSpec, MethodSpec};
