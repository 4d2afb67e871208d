//! The fixed emission order, as an explicit state machine.

use serde::Serialize;
use std::fmt;

use crate::error::SynthesisFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SynthesisPhase {
    #[default]
    Empty,
    HeaderEmitted,
    FieldsEmitted,
    ConstructorEmitted,
    MethodsEmitted,
    Finalized,
}

impl SynthesisPhase {
    pub fn next(self) -> Option<Self> {
        match self {
            SynthesisPhase::Empty => Some(SynthesisPhase::HeaderEmitted),
            SynthesisPhase::HeaderEmitted => Some(SynthesisPhase::FieldsEmitted),
            SynthesisPhase::FieldsEmitted => Some(SynthesisPhase::ConstructorEmitted),
            SynthesisPhase::ConstructorEmitted => Some(SynthesisPhase::MethodsEmitted),
            SynthesisPhase::MethodsEmitted => Some(SynthesisPhase::Finalized),
            SynthesisPhase::Finalized => None,
        }
    }

    /// Check that `attempted` is the only legal successor of `self`.
    pub fn check_transition(self, attempted: Self) -> Result<(), SynthesisFailure> {
        if self.next() == Some(attempted) {
            Ok(())
        } else {
            Err(SynthesisFailure::OutOfOrder {
                current: self,
                attempted,
            })
        }
    }

    /// Name of the step that produces this phase.
    pub fn step_name(self) -> &'static str {
        match self {
            SynthesisPhase::Empty => "setup",
            SynthesisPhase::HeaderEmitted => "header emission",
            SynthesisPhase::FieldsEmitted => "field emission",
            SynthesisPhase::ConstructorEmitted => "constructor emission",
            SynthesisPhase::MethodsEmitted => "lifecycle method generation",
            SynthesisPhase::Finalized => "finalization",
        }
    }
}

impl fmt::Display for SynthesisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SynthesisPhase::Empty => "Empty",
            SynthesisPhase::HeaderEmitted => "HeaderEmitted",
            SynthesisPhase::FieldsEmitted => "FieldsEmitted",
            SynthesisPhase::ConstructorEmitted => "ConstructorEmitted",
            SynthesisPhase::MethodsEmitted => "MethodsEmitted",
            SynthesisPhase::Finalized => "Finalized",
        };
        f.write_str(name)
    }
}
