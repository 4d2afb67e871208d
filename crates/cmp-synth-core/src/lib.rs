//! Synthesis of CMP entity bean wrapper classes.
//!
//! Given a user bean class and a target name, [`ModuleSynthesizer`] emits a
//! JVM class that extends the bean, implements `javax.ejb.EntityBean`,
//! optionally carries the `OpenEJB_pk` surrogate key, and forwards its no-arg
//! constructor to the bean.
//!
//! ```
//! use cmp_synth_core::{BeanClass, BeanMethod, ModuleSynthesizer};
//!
//! let bean = BeanClass::named("com.example.Foo")
//!     .with_method(BeanMethod::new("ejbCreate", &["int"]));
//! let mut synth = ModuleSynthesizer::new("com.example.FooImpl", &bean)?;
//! synth.set_surrogate_identity_required(true);
//! let artifact = synth.generate()?;
//! assert_eq!(&artifact.as_bytes()[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
//! # Ok::<(), cmp_synth_core::Error>(())
//! ```

pub mod artifact;
pub mod descriptor;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod phase;
pub mod post_create;
pub mod synthesizer;

pub use artifact::ClassArtifact;
pub use descriptor::{BaseModule, BeanClass, BeanMethod, ModuleDescriptor};
pub use error::{Error, Result, SynthesisFailure};
pub use identity::{SurrogateIdentity, SURROGATE_IDENTITY_FIELD, SURROGATE_IDENTITY_TYPE};
pub use lifecycle::{
    GeneratorError, LifecycleMethodGenerator, MemberSink, NoLifecycleMethods,
    CONTRACT_INTERFACES, LIFECYCLE_CONTRACT_INTERFACE,
};
pub use phase::SynthesisPhase;
pub use post_create::{PostCreateGenerator, UnknownParameterType};
pub use synthesizer::ModuleSynthesizer;
