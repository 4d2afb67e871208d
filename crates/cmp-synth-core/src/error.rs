//! Error types for wrapper synthesis.

use cmp_classfile::ClassFileError;
use thiserror::Error;

use crate::lifecycle::GeneratorError;
use crate::phase::SynthesisPhase;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The target name is empty, malformed, or collides with the base module.
    #[error("invalid target name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The base module descriptor does not yield a usable class name.
    #[error("cannot resolve base module: {reason}")]
    UnresolvableBaseModule { reason: String },

    /// A synthesis step failed; no artifact was produced.
    #[error("synthesis failed during {}: {source}", .step.step_name())]
    Synthesis {
        step: SynthesisPhase,
        #[source]
        source: SynthesisFailure,
    },
}

impl Error {
    pub(crate) fn synthesis(step: SynthesisPhase, source: impl Into<SynthesisFailure>) -> Self {
        Error::Synthesis {
            step,
            source: source.into(),
        }
    }

    /// The underlying failure when this is a [`Error::Synthesis`].
    pub fn synthesis_failure(&self) -> Option<&SynthesisFailure> {
        match self {
            Error::Synthesis { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SynthesisFailure {
    #[error(transparent)]
    ClassFile(#[from] ClassFileError),

    #[error("lifecycle method generator failed: {0}")]
    Generator(#[source] GeneratorError),

    #[error("cannot move from phase {current} to {attempted}")]
    OutOfOrder {
        current: SynthesisPhase,
        attempted: SynthesisPhase,
    },

    #[error("parent class '{0}' cannot be resolved")]
    UnresolvableParent(String),

    /// An earlier step failed and discarded the class under construction.
    #[error("an earlier synthesis step failed; start over with a new synthesizer")]
    Aborted,
}
