//! The collaborator seam for lifecycle methods.
//!
//! After the forwarding constructor is in place the synthesizer lends the
//! class under construction to a [`LifecycleMethodGenerator`] through a
//! [`MemberSink`]. The sink can read the class names and append members; it
//! has no way to change the header or remove anything already emitted.

use cmp_classfile::{ClassBuilder, ClassFileError, FieldSpec, MethodDescriptor, MethodSpec};

/// Error type returned by generators.
pub type GeneratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Interface every synthesized wrapper declares, in internal form.
pub const LIFECYCLE_CONTRACT_INTERFACE: &str = "javax/ejb/EntityBean";

/// The complete declared interface set, in declaration order.
pub const CONTRACT_INTERFACES: &[&str] = &[LIFECYCLE_CONTRACT_INTERFACE];

/// Append-only view over a class under construction.
pub struct MemberSink<'a> {
    builder: &'a mut ClassBuilder,
}

impl<'a> MemberSink<'a> {
    pub(crate) fn new(builder: &'a mut ClassBuilder) -> Self {
        Self { builder }
    }

    /// Internal name of the class being generated.
    pub fn class_name(&self) -> &str {
        self.builder.this_class()
    }

    /// Internal name of the base class.
    pub fn super_class(&self) -> &str {
        self.builder.super_class()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.builder.has_field(name)
    }

    pub fn has_method(&self, name: &str, descriptor: &MethodDescriptor) -> bool {
        self.builder.has_method(name, descriptor)
    }

    pub fn add_field(&mut self, field: FieldSpec) -> Result<(), ClassFileError> {
        self.builder.add_field(field)
    }

    pub fn add_method(&mut self, method: MethodSpec) -> Result<(), ClassFileError> {
        self.builder.add_method(method)
    }
}

/// Contributes lifecycle methods to a generated wrapper.
///
/// Called exactly once per synthesis, after the constructor is emitted and
/// before the class is finalized. Returning an error aborts synthesis.
pub trait LifecycleMethodGenerator {
    fn generate(&mut self, sink: &mut MemberSink<'_>) -> Result<(), GeneratorError>;
}

impl<F> LifecycleMethodGenerator for F
where
    F: FnMut(&mut MemberSink<'_>) -> Result<(), GeneratorError>,
{
    fn generate(&mut self, sink: &mut MemberSink<'_>) -> Result<(), GeneratorError> {
        self(sink)
    }
}

/// Generator that adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLifecycleMethods;

impl LifecycleMethodGenerator for NoLifecycleMethods {
    fn generate(&mut self, _sink: &mut MemberSink<'_>) -> Result<(), GeneratorError> {
        Ok(())
    }
}
