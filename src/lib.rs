//! CMP entity bean wrapper synthesis
//!
//! Generates the JVM class an EJB container loads in place of a CMP 1.x bean:
//!
//! - **Synthesis**: [`ModuleSynthesizer`] builds the wrapper from a bean description
//! - **Class files**: [`cmp_classfile`] writes and reads the class-file format
//! - **Requests**: [`request`] loads JSON synthesis requests and writes artifacts
//!
//! The `cmp-synth` binary exposes the same operations on the command line.

pub mod request;

pub use cmp_classfile;
pub use cmp_classfile::ParsedClass;
pub use cmp_synth_core::{
    BaseModule, BeanClass, BeanMethod, ClassArtifact, Error, GeneratorError, LifecycleMethodGenerator,
    MemberSink, ModuleDescriptor, ModuleSynthesizer, NoLifecycleMethods, PostCreateGenerator,
    SurrogateIdentity, SynthesisFailure, SynthesisPhase,
};
pub use request::SynthesisRequest;
