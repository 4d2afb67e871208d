//! Qualified (`com.example.Foo`) and internal (`com/example/Foo`) class names.

use crate::error::{ClassFileError, Result};

/// True when `segment` is a Java identifier (Unicode letters, digits, `_`, `$`).
pub fn is_java_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Validate a dot-separated binary class name such as `com.example.FooImpl`.
pub fn validate_qualified_name(name: &str) -> Result<()> {
    validate_segments(name, '.')
}

/// Validate a slash-separated internal class name such as `com/example/FooImpl`.
pub fn validate_internal_name(name: &str) -> Result<()> {
    validate_segments(name, '/')
}

fn validate_segments(name: &str, separator: char) -> Result<()> {
    let invalid = |reason| ClassFileError::InvalidClassName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    for segment in name.split(separator) {
        if segment.is_empty() {
            return Err(invalid("empty package or class segment"));
        }
        if !is_java_identifier(segment) {
            return Err(invalid("segment is not a Java identifier"));
        }
    }
    Ok(())
}

pub fn to_internal_name(qualified: &str) -> String {
    qualified.replace('.', "/")
}

pub fn to_qualified_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// Validate an unqualified field or method name (JVMS 4.2.2).
pub fn validate_member_name(name: &str, is_method: bool) -> Result<()> {
    let invalid = |reason| ClassFileError::InvalidMemberName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if is_method && (name == "<init>" || name == "<clinit>") {
        return Ok(());
    }
    if name.contains(['.', ';', '[', '/']) {
        return Err(invalid("contains one of . ; [ /"));
    }
    if is_method && name.contains(['<', '>']) {
        return Err(invalid("method names may only contain < > as <init> or <clinit>"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_names() {
        assert!(validate_qualified_name("com.example.FooImpl").is_ok());
        assert!(validate_qualified_name("Foo").is_ok());
        assert!(validate_qualified_name("a.b.Outer$Inner").is_ok());
        assert!(validate_qualified_name("").is_err());
        assert!(validate_qualified_name("com..Foo").is_err());
        assert!(validate_qualified_name("com.example.").is_err());
        assert!(validate_qualified_name("com/example/Foo").is_err());
        assert!(validate_qualified_name("com.1example.Foo").is_err());
        assert!(validate_qualified_name("com.exa mple").is_err());
    }

    #[test]
    fn test_internal_conversion() {
        assert_eq!(to_internal_name("com.example.FooImpl"), "com/example/FooImpl");
        assert_eq!(to_qualified_name("javax/ejb/EntityBean"), "javax.ejb.EntityBean");
        assert!(validate_internal_name("javax/ejb/EntityBean").is_ok());
        assert!(validate_internal_name("javax.ejb.EntityBean").is_err());
    }

    #[test]
    fn test_member_names() {
        assert!(validate_member_name("OpenEJB_pk", false).is_ok());
        assert!(validate_member_name("<init>", true).is_ok());
        assert!(validate_member_name("<init>", false).is_err());
        assert!(validate_member_name("ejb<Create>", true).is_err());
        assert!(validate_member_name("a;b", false).is_err());
    }
}
