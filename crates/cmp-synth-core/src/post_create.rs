//! Default lifecycle generator: missing `ejbPostCreate` callbacks.
//!
//! A CMP bean declares `ejbCreate<Suffix>(..)` methods and the container
//! requires a matching `ejbPostCreate<Suffix>(..)` with the same parameters.
//! Beans that omit one get an empty implementation in the wrapper.

use cmp_classfile::{AccessFlags, ClassFileError, FieldType, Instruction, MethodDescriptor, MethodSpec};
use thiserror::Error;
use tracing::debug;

use crate::descriptor::{BaseModule, BeanMethod};
use crate::lifecycle::{GeneratorError, LifecycleMethodGenerator, MemberSink};

const CREATE_PREFIX: &str = "ejbCreate";
const POST_CREATE_PREFIX: &str = "ejbPostCreate";

#[derive(Debug, Clone, Default)]
pub struct PostCreateGenerator {
    methods: Vec<BeanMethod>,
}

impl PostCreateGenerator {
    pub fn new(base: &dyn BaseModule) -> Self {
        Self {
            methods: base.methods().to_vec(),
        }
    }

    /// Post-create methods the base class is missing, in declaration order.
    pub fn missing_methods(&self) -> Result<Vec<(String, MethodDescriptor)>, GeneratorError> {
        let mut missing: Vec<(String, MethodDescriptor)> = Vec::new();
        for method in &self.methods {
            let Some(suffix) = method.name.strip_prefix(CREATE_PREFIX) else {
                continue;
            };
            let parameters = parameter_types(&method.parameters).map_err(|e| {
                GeneratorError::from(UnknownParameterType {
                    method: method.name.clone(),
                    source: e,
                })
            })?;
            let post_create = format!("{POST_CREATE_PREFIX}{suffix}");
            if self.declares(&post_create, &parameters) {
                continue;
            }
            let descriptor = MethodDescriptor::new(parameters, None);
            if !missing
                .iter()
                .any(|(n, d)| *n == post_create && *d == descriptor)
            {
                missing.push((post_create, descriptor));
            }
        }
        Ok(missing)
    }

    /// Whether the base declares `name` with these resolved parameter types.
    /// Candidates whose types do not resolve never match.
    fn declares(&self, name: &str, parameters: &[FieldType]) -> bool {
        self.methods
            .iter()
            .filter(|m| m.name == name)
            .any(|m| parameter_types(&m.parameters).is_ok_and(|types| types == parameters))
    }
}

fn parameter_types(names: &[String]) -> Result<Vec<FieldType>, ClassFileError> {
    names.iter().map(|n| FieldType::from_java_name(n)).collect()
}

impl LifecycleMethodGenerator for PostCreateGenerator {
    fn generate(&mut self, sink: &mut MemberSink<'_>) -> Result<(), GeneratorError> {
        for (name, descriptor) in self.missing_methods()? {
            if sink.has_method(&name, &descriptor) {
                continue;
            }
            debug!(class = sink.class_name(), method = %name, %descriptor, "adding post-create method");
            sink.add_method(
                MethodSpec::new(AccessFlags::PUBLIC, name, descriptor)
                    .with_code(vec![Instruction::Return(None)]),
            )?;
        }
        Ok(())
    }
}

/// A create method names a parameter type that has no descriptor.
#[derive(Debug, Error)]
#[error("{method}: {source}")]
pub struct UnknownParameterType {
    pub method: String,
    #[source]
    pub source: ClassFileError,
}
