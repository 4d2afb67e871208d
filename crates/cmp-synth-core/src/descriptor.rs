//! Base module descriptors.
//!
//! The synthesizer only needs three things from the bean class it wraps: its
//! qualified name, its public methods (for post-create generation) and
//! whether the persistence layer found it lacking a natural primary key.

use serde::{Deserialize, Serialize};
use std::fmt;

use cmp_classfile::names::{to_internal_name, validate_qualified_name};
use cmp_classfile::ClassFileError;

use crate::error::{Error, Result};

/// A runtime-queryable view of the user's bean class.
pub trait BaseModule {
    /// Fully qualified name, `None` when the class cannot be named.
    fn qualified_name(&self) -> Option<&str>;

    /// Public methods, inherited ones included, in declaration order.
    fn methods(&self) -> &[BeanMethod] {
        &[]
    }

    /// Set when the mapping layer discovered no usable primary key.
    fn missing_identity(&self) -> bool {
        false
    }
}

impl<T: BaseModule + ?Sized> BaseModule for &T {
    fn qualified_name(&self) -> Option<&str> {
        (**self).qualified_name()
    }

    fn methods(&self) -> &[BeanMethod] {
        (**self).methods()
    }

    fn missing_identity(&self) -> bool {
        (**self).missing_identity()
    }
}

/// A public method signature using Java source type names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanMethod {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default = "void_type")]
    pub return_type: String,
}

fn void_type() -> String {
    "void".to_string()
}

impl BeanMethod {
    pub fn new(name: impl Into<String>, parameters: &[&str]) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            return_type: void_type(),
        }
    }

    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }
}

/// Serializable bean class description, as read from JSON.
///
/// ```json
/// { "name": "com.example.Foo",
///   "methods": [{ "name": "ejbCreate", "parameters": ["int"], "return_type": "java.lang.Integer" }],
///   "unknown_primary_key": false }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanClass {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub methods: Vec<BeanMethod>,
    #[serde(default, alias = "unknownPk")]
    pub unknown_primary_key: bool,
}

impl BeanClass {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: BeanMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_unknown_primary_key(mut self, unknown: bool) -> Self {
        self.unknown_primary_key = unknown;
        self
    }
}

impl BaseModule for BeanClass {
    fn qualified_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn methods(&self) -> &[BeanMethod] {
        &self.methods
    }

    fn missing_identity(&self) -> bool {
        self.unknown_primary_key
    }
}

/// A resolved class name, kept in both spellings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleDescriptor {
    qualified_name: String,
    internal_name: String,
}

impl ModuleDescriptor {
    pub fn parse(qualified_name: &str) -> std::result::Result<Self, ClassFileError> {
        validate_qualified_name(qualified_name)?;
        Ok(Self {
            qualified_name: qualified_name.to_string(),
            internal_name: to_internal_name(qualified_name),
        })
    }

    /// Resolve a base module's name, mapping every failure to
    /// [`Error::UnresolvableBaseModule`].
    pub fn resolve(base: &dyn BaseModule) -> Result<Self> {
        let name = base
            .qualified_name()
            .ok_or_else(|| Error::UnresolvableBaseModule {
                reason: "base module has no name".to_string(),
            })?;
        Self::parse(name).map_err(|e| Error::UnresolvableBaseModule {
            reason: e.to_string(),
        })
    }

    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }
}

impl fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name)
    }
}
