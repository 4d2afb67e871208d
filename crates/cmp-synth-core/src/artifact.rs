//! The finalized output of a synthesis.

use sha2::{Digest, Sha256};

/// Immutable class-file bytes plus the class they define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassArtifact {
    class_name: String,
    bytes: Box<[u8]>,
}

impl ClassArtifact {
    pub(crate) fn new(class_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            class_name: class_name.into(),
            bytes: bytes.into_boxed_slice(),
        }
    }

    /// Qualified name of the generated class.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes.into_vec()
    }

    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    /// Path a class loader expects, e.g. `com/example/FooImpl.class`.
    pub fn relative_path(&self) -> String {
        format!("{}.class", self.class_name.replace('.', "/"))
    }
}

impl AsRef<[u8]> for ClassArtifact {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
