//! Wrapper class synthesis.
//!
//! [`ModuleSynthesizer`] produces one class that extends the user's bean,
//! declares `javax.ejb.EntityBean`, optionally carries the surrogate key
//! field, forwards its no-arg constructor to the bean, and lets a
//! [`LifecycleMethodGenerator`] append the remaining container callbacks.
//!
//! The steps run in a fixed order tracked by [`SynthesisPhase`]. Each public
//! step method checks its transition before touching the class, so calling
//! them out of order or running [`ModuleSynthesizer::generate`] twice fails
//! with [`SynthesisFailure::OutOfOrder`]. A failing step discards the class;
//! later steps report [`SynthesisFailure::Aborted`].

use cmp_classfile::{
    AccessFlags, ClassBuilder, ClassVersion, Instruction, MethodDescriptor, MethodRef, MethodSpec,
    ValueKind,
};
use tracing::{debug, info, warn};

use crate::artifact::ClassArtifact;
use crate::descriptor::{BaseModule, ModuleDescriptor};
use crate::error::{Error, Result, SynthesisFailure};
use crate::identity::SurrogateIdentity;
use crate::lifecycle::{LifecycleMethodGenerator, MemberSink, CONTRACT_INTERFACES};
use crate::phase::SynthesisPhase;
use crate::post_create::PostCreateGenerator;

pub const CONSTRUCTOR_NAME: &str = "<init>";

#[derive(Debug)]
pub struct ModuleSynthesizer<G = PostCreateGenerator> {
    target: ModuleDescriptor,
    parent: ModuleDescriptor,
    surrogate_identity: bool,
    /// Snapshot of `surrogate_identity` taken at header emission.
    decided_identity: Option<SurrogateIdentity>,
    generator: G,
    builder: Option<ClassBuilder>,
    phase: SynthesisPhase,
}

impl ModuleSynthesizer<PostCreateGenerator> {
    /// Synthesizer using the default post-create generator for `base`.
    pub fn new(target: &str, base: &dyn BaseModule) -> Result<Self> {
        let generator = PostCreateGenerator::new(base);
        Self::with_generator(target, base, generator)
    }
}

impl<G: LifecycleMethodGenerator> ModuleSynthesizer<G> {
    pub fn with_generator(target: &str, base: &dyn BaseModule, generator: G) -> Result<Self> {
        let target_descriptor = ModuleDescriptor::parse(target).map_err(|e| Error::InvalidName {
            name: target.to_string(),
            reason: e.to_string(),
        })?;
        let parent = ModuleDescriptor::resolve(base)?;
        if target_descriptor == parent {
            return Err(Error::InvalidName {
                name: target.to_string(),
                reason: "target is the base module itself".to_string(),
            });
        }

        let builder = ClassBuilder::new(target_descriptor.internal_name(), parent.internal_name())
            .map_err(|e| Error::InvalidName {
                name: target.to_string(),
                reason: e.to_string(),
            })?;

        debug!(class = %target_descriptor, parent = %parent, "synthesizer created");
        Ok(Self {
            target: target_descriptor,
            parent,
            surrogate_identity: base.missing_identity(),
            decided_identity: None,
            generator,
            builder: Some(builder),
            phase: SynthesisPhase::Empty,
        })
    }

    pub fn target(&self) -> &ModuleDescriptor {
        &self.target
    }

    pub fn parent(&self) -> &ModuleDescriptor {
        &self.parent
    }

    pub fn phase(&self) -> SynthesisPhase {
        self.phase
    }

    /// Whether the next synthesis will add the surrogate key field.
    ///
    /// Changing it once the header is emitted has no effect on the class.
    pub fn set_surrogate_identity_required(&mut self, required: bool) {
        if self.phase != SynthesisPhase::Empty && required != self.surrogate_identity {
            warn!(
                class = %self.target,
                phase = %self.phase,
                required,
                "surrogate identity flag changed after synthesis started; output unaffected"
            );
        }
        self.surrogate_identity = required;
    }

    pub fn is_surrogate_identity_required(&self) -> bool {
        self.surrogate_identity
    }

    /// The identity decision used for the class, once the header is emitted.
    pub fn surrogate_identity(&self) -> Option<SurrogateIdentity> {
        self.decided_identity
    }

    /// Run every step and return the finished class.
    pub fn generate(&mut self) -> Result<ClassArtifact> {
        self.emit_header()?;
        self.emit_surrogate_field()?;
        self.emit_constructor()?;
        self.emit_lifecycle_methods()?;
        self.finalize()
    }

    // ========================================================================
    // Steps
    // ========================================================================

    /// Version, access flags, parent and the contract interfaces.
    pub fn emit_header(&mut self) -> Result<()> {
        let step = SynthesisPhase::HeaderEmitted;
        self.begin(step)?;
        let builder = self.builder_mut(step)?;

        if builder.super_class().is_empty() || builder.super_class() == builder.this_class() {
            let parent = builder.super_class().to_string();
            return Err(self.abort(step, SynthesisFailure::UnresolvableParent(parent)));
        }
        builder.set_version(ClassVersion::JAVA_5);
        builder.set_access(AccessFlags::PUBLIC | AccessFlags::SUPER);
        for interface in CONTRACT_INTERFACES {
            if let Err(e) = builder.add_interface(*interface) {
                return Err(self.abort(step, e));
            }
        }

        let identity = SurrogateIdentity::from_required(self.surrogate_identity);
        debug!(
            class = %self.target,
            surrogate_identity = identity.is_required(),
            "surrogate identity decided"
        );
        self.decided_identity = Some(identity);
        self.complete(step);
        Ok(())
    }

    /// The surrogate key field, when the identity decision requires one.
    pub fn emit_surrogate_field(&mut self) -> Result<()> {
        let step = SynthesisPhase::FieldsEmitted;
        self.begin(step)?;
        let identity = self.decided_identity.unwrap_or_default();
        let builder = self.builder_mut(step)?;
        if let Some(field) = identity.field() {
            if let Err(e) = builder.add_field(field) {
                return Err(self.abort(step, e));
            }
        }
        self.complete(step);
        Ok(())
    }

    /// `public <init>()V` calling the parent's no-arg constructor.
    pub fn emit_constructor(&mut self) -> Result<()> {
        let step = SynthesisPhase::ConstructorEmitted;
        self.begin(step)?;
        let builder = self.builder_mut(step)?;
        let constructor = forwarding_constructor(builder.super_class());
        if let Err(e) = builder.add_method(constructor) {
            return Err(self.abort(step, e));
        }
        self.complete(step);
        Ok(())
    }

    /// Hand the class to the lifecycle generator for the duration of one call.
    pub fn emit_lifecycle_methods(&mut self) -> Result<()> {
        let step = SynthesisPhase::MethodsEmitted;
        self.begin(step)?;
        let Some(builder) = self.builder.as_mut() else {
            return Err(Error::synthesis(step, SynthesisFailure::Aborted));
        };
        let before = builder.methods().len() + builder.fields().len();
        let result = self.generator.generate(&mut MemberSink::new(builder));
        let after = builder.methods().len() + builder.fields().len();
        if let Err(e) = result {
            return Err(self.abort(step, SynthesisFailure::Generator(e)));
        }
        debug!(class = %self.target, added = after - before, "lifecycle members added");
        self.complete(step);
        Ok(())
    }

    /// Serialize the class. The builder is released whether or not this succeeds.
    pub fn finalize(&mut self) -> Result<ClassArtifact> {
        let step = SynthesisPhase::Finalized;
        self.begin(step)?;
        let Some(builder) = self.builder.take() else {
            return Err(Error::synthesis(step, SynthesisFailure::Aborted));
        };
        let bytes = match builder.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.abort(step, e)),
        };
        let artifact = ClassArtifact::new(self.target.qualified_name(), bytes);
        self.complete(step);
        info!(
            class = artifact.class_name(),
            parent = %self.parent,
            bytes = artifact.len(),
            sha256 = %artifact.sha256_hex(),
            "class synthesized"
        );
        Ok(artifact)
    }

    fn begin(&self, step: SynthesisPhase) -> Result<()> {
        self.phase
            .check_transition(step)
            .map_err(|e| Error::synthesis(step, e))
    }

    fn builder_mut(&mut self, step: SynthesisPhase) -> Result<&mut ClassBuilder> {
        self.builder
            .as_mut()
            .ok_or_else(|| Error::synthesis(step, SynthesisFailure::Aborted))
    }

    fn complete(&mut self, step: SynthesisPhase) {
        debug!(class = %self.target, phase = %step, "{} complete", step.step_name());
        self.phase = step;
    }

    fn abort(&mut self, step: SynthesisPhase, failure: impl Into<SynthesisFailure>) -> Error {
        self.builder = None;
        let error = Error::synthesis(step, failure);
        debug!(class = %self.target, error = %error, "synthesis aborted");
        error
    }
}

fn forwarding_constructor(parent: &str) -> MethodSpec {
    MethodSpec::new(
        AccessFlags::PUBLIC,
        CONSTRUCTOR_NAME,
        MethodDescriptor::no_args_void(),
    )
    .with_code(vec![
        Instruction::Load {
            kind: ValueKind::Reference,
            index: 0,
        },
        Instruction::InvokeSpecial(MethodRef::no_arg_constructor(parent)),
        Instruction::Return(None),
    ])
}
