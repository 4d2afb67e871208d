//! Errors raised while building, serializing or reading class files.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassFileError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassFileError {
    #[error("invalid class name '{name}': {reason}")]
    InvalidClassName { name: String, reason: &'static str },

    #[error("invalid member name '{name}': {reason}")]
    InvalidMemberName { name: String, reason: &'static str },

    #[error("invalid type '{input}': {reason}")]
    InvalidType { input: String, reason: &'static str },

    #[error("invalid descriptor '{descriptor}': {reason}")]
    InvalidDescriptor {
        descriptor: String,
        reason: &'static str,
    },

    #[error("class '{0}' cannot be its own superclass")]
    SelfInheritance(String),

    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    #[error("duplicate method {name}{descriptor}")]
    DuplicateMethod { name: String, descriptor: String },

    #[error("duplicate interface '{0}'")]
    DuplicateInterface(String),

    #[error("constant pool overflow: more than 65535 slots")]
    ConstantPoolOverflow,

    #[error("string constant too long: {0} bytes of modified UTF-8")]
    Utf8TooLong(usize),

    #[error("code of method {method} too large: {length} bytes")]
    CodeTooLarge { method: String, length: usize },

    #[error("method {0} has an empty code body")]
    EmptyCode(String),

    #[error("method {0} is neither abstract nor native but has no code")]
    MissingCode(String),

    #[error("abstract or native method {0} cannot have code")]
    UnexpectedCode(String),

    #[error("code of method {0} does not end with a return matching its descriptor")]
    MissingReturn(String),

    #[error("constructor {0} must return void")]
    NonVoidConstructor(String),

    #[error("operand stack underflow at instruction {index} of {method}")]
    StackUnderflow { method: String, index: usize },

    #[error("method {0} needs more than 65535 stack or local slots")]
    FrameTooLarge(String),

    #[error("unexpected end of class file at offset {offset}")]
    UnexpectedEof { offset: usize },

    #[error("bad magic number {0:#010x}")]
    BadMagic(u32),

    #[error("invalid constant pool index {0}")]
    BadConstantIndex(u16),

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },

    #[error("malformed modified UTF-8 in constant {0}")]
    MalformedUtf8(u16),

    #[error("unsupported opcode {opcode:#04x} at offset {offset}")]
    UnsupportedOpcode { opcode: u8, offset: usize },

    #[error("{0} trailing bytes after end of class file")]
    TrailingBytes(usize),
}
