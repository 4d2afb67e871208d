//! Surrogate primary key support.

use cmp_classfile::{AccessFlags, FieldSpec, FieldType};

/// Field the persistence layer maps when a bean has no natural key.
pub const SURROGATE_IDENTITY_FIELD: &str = "OpenEJB_pk";

/// Internal name of the boxed 64-bit key type.
pub const SURROGATE_IDENTITY_TYPE: &str = "java/lang/Long";

/// Whether the generated class carries the surrogate key field.
///
/// Decided once when synthesis starts; later flag changes do not reach an
/// in-progress class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurrogateIdentity {
    #[default]
    NotRequired,
    Required,
}

impl SurrogateIdentity {
    pub fn from_required(required: bool) -> Self {
        if required {
            SurrogateIdentity::Required
        } else {
            SurrogateIdentity::NotRequired
        }
    }

    pub fn is_required(self) -> bool {
        self == SurrogateIdentity::Required
    }

    /// `public java.lang.Long OpenEJB_pk;`, no initializer.
    pub fn field(self) -> Option<FieldSpec> {
        match self {
            SurrogateIdentity::NotRequired => None,
            SurrogateIdentity::Required => Some(FieldSpec::new(
                AccessFlags::PUBLIC,
                SURROGATE_IDENTITY_FIELD,
                FieldType::object(SURROGATE_IDENTITY_TYPE),
            )),
        }
    }
}
