//! Field and method descriptors (JVMS 4.3).

use serde::Serialize;
use std::fmt;

use crate::error::{ClassFileError, Result};
use crate::names::{
    to_internal_name, to_qualified_name, validate_internal_name, validate_qualified_name,
};

const MAX_ARRAY_DIMENSIONS: usize = 255;

/// A value type as it appears in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum FieldType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    /// Reference type, holding the internal class name.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    /// Reference to a class given in internal form (`java/lang/Long`).
    pub fn object(internal_name: impl Into<String>) -> Self {
        FieldType::Object(internal_name.into())
    }

    pub fn array_of(component: FieldType) -> Self {
        FieldType::Array(Box::new(component))
    }

    /// Local-variable and operand-stack slots taken by a value of this type.
    pub fn slot_size(&self) -> u16 {
        match self {
            FieldType::Long | FieldType::Double => 2,
            _ => 1,
        }
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            FieldType::Boolean => out.push('Z'),
            FieldType::Byte => out.push('B'),
            FieldType::Char => out.push('C'),
            FieldType::Short => out.push('S'),
            FieldType::Int => out.push('I'),
            FieldType::Long => out.push('J'),
            FieldType::Float => out.push('F'),
            FieldType::Double => out.push('D'),
            FieldType::Object(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            FieldType::Array(component) => {
                out.push('[');
                component.write_descriptor(out);
            }
        }
    }

    /// Convert a Java source type name (`int`, `java.lang.String`, `long[][]`).
    pub fn from_java_name(name: &str) -> Result<Self> {
        let invalid = |reason| ClassFileError::InvalidType {
            input: name.to_string(),
            reason,
        };
        let mut base = name.trim();
        let mut dimensions = 0;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped.trim_end();
            dimensions += 1;
        }
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return Err(invalid("more than 255 array dimensions"));
        }
        let mut ty = match base {
            "boolean" => FieldType::Boolean,
            "byte" => FieldType::Byte,
            "char" => FieldType::Char,
            "short" => FieldType::Short,
            "int" => FieldType::Int,
            "long" => FieldType::Long,
            "float" => FieldType::Float,
            "double" => FieldType::Double,
            "void" => return Err(invalid("void is not a value type")),
            other => {
                validate_qualified_name(other)
                    .map_err(|_| invalid("not a primitive or class name"))?;
                FieldType::Object(to_internal_name(other))
            }
        };
        for _ in 0..dimensions {
            ty = FieldType::array_of(ty);
        }
        Ok(ty)
    }

    /// Parse a complete field descriptor such as `Ljava/lang/Long;`.
    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut cursor = DescriptorCursor::new(descriptor);
        let ty = cursor.field_type()?;
        if !cursor.at_end() {
            return Err(cursor.error("trailing characters"));
        }
        Ok(ty)
    }

    /// Java source spelling, the inverse of [`FieldType::from_java_name`].
    pub fn java_name(&self) -> String {
        match self {
            FieldType::Boolean => "boolean".into(),
            FieldType::Byte => "byte".into(),
            FieldType::Char => "char".into(),
            FieldType::Short => "short".into(),
            FieldType::Int => "int".into(),
            FieldType::Long => "long".into(),
            FieldType::Float => "float".into(),
            FieldType::Double => "double".into(),
            FieldType::Object(name) => to_qualified_name(name),
            FieldType::Array(component) => format!("{}[]", component.java_name()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

/// Parameter and return types of a method; `return_type == None` is `void`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn new(parameters: Vec<FieldType>, return_type: Option<FieldType>) -> Self {
        Self {
            parameters,
            return_type,
        }
    }

    /// `()V`
    pub fn no_args_void() -> Self {
        Self::new(Vec::new(), None)
    }

    pub fn parameter_slots(&self) -> u16 {
        self.parameters.iter().map(FieldType::slot_size).sum()
    }

    pub fn return_slots(&self) -> u16 {
        self.return_type.as_ref().map_or(0, FieldType::slot_size)
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::from("(");
        for p in &self.parameters {
            p.write_descriptor(&mut out);
        }
        out.push(')');
        match &self.return_type {
            Some(ty) => ty.write_descriptor(&mut out),
            None => out.push('V'),
        }
        out
    }

    pub fn parse(descriptor: &str) -> Result<Self> {
        let mut cursor = DescriptorCursor::new(descriptor);
        if !cursor.eat('(') {
            return Err(cursor.error("method descriptor must start with '('"));
        }
        let mut parameters = Vec::new();
        while !cursor.eat(')') {
            if cursor.at_end() {
                return Err(cursor.error("unterminated parameter list"));
            }
            parameters.push(cursor.field_type()?);
        }
        let return_type = if cursor.eat('V') {
            None
        } else {
            Some(cursor.field_type()?)
        };
        if !cursor.at_end() {
            return Err(cursor.error("trailing characters"));
        }
        Ok(Self::new(parameters, return_type))
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

struct DescriptorCursor<'a> {
    input: &'a str,
    rest: &'a str,
}

impl<'a> DescriptorCursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, rest: input }
    }

    fn at_end(&self) -> bool {
        self.rest.is_empty()
    }

    fn eat(&mut self, c: char) -> bool {
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn error(&self, reason: &'static str) -> ClassFileError {
        ClassFileError::InvalidDescriptor {
            descriptor: self.input.to_string(),
            reason,
        }
    }

    fn field_type(&mut self) -> Result<FieldType> {
        let mut dimensions = 0;
        while self.eat('[') {
            dimensions += 1;
        }
        if dimensions > MAX_ARRAY_DIMENSIONS {
            return Err(self.error("more than 255 array dimensions"));
        }
        let rest: &'a str = self.rest;
        let mut chars = rest.chars();
        let tag = chars.next().ok_or_else(|| self.error("missing type"))?;
        let rest: &'a str = chars.as_str();
        self.rest = rest;
        let mut ty = match tag {
            'Z' => FieldType::Boolean,
            'B' => FieldType::Byte,
            'C' => FieldType::Char,
            'S' => FieldType::Short,
            'I' => FieldType::Int,
            'J' => FieldType::Long,
            'F' => FieldType::Float,
            'D' => FieldType::Double,
            'L' => {
                let end = rest
                    .find(';')
                    .ok_or_else(|| self.error("unterminated class type"))?;
                let name = &rest[..end];
                validate_internal_name(name).map_err(|_| self.error("invalid class name"))?;
                self.rest = &rest[end + 1..];
                FieldType::Object(name.to_string())
            }
            _ => return Err(self.error("unknown type tag")),
        };
        for _ in 0..dimensions {
            ty = FieldType::array_of(ty);
        }
        Ok(ty)
    }
}
