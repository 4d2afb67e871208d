//! JSON synthesis requests and artifact output.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use cmp_synth_core::{BeanClass, ClassArtifact, ModuleSynthesizer};

/// Everything needed for one synthesis.
///
/// ```json
/// {
///   "target": "com.example.FooImpl",
///   "base": { "name": "com.example.Foo", "methods": [] },
///   "surrogate_identity": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub target: String,
    pub base: BeanClass,
    /// Overrides the bean's `unknown_primary_key` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surrogate_identity: Option<bool>,
}

impl SynthesisRequest {
    pub fn new(target: impl Into<String>, base: BeanClass) -> Self {
        Self {
            target: target.into(),
            base,
            surrogate_identity: None,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse synthesis request")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid request in {}", path.display()))
    }

    /// Run the default synthesizer for this request.
    pub fn synthesize(&self) -> Result<ClassArtifact> {
        let mut synth = ModuleSynthesizer::new(&self.target, &self.base)
            .with_context(|| format!("Cannot synthesize {}", self.target))?;
        if let Some(required) = self.surrogate_identity {
            synth.set_surrogate_identity_required(required);
        }
        synth
            .generate()
            .with_context(|| format!("Failed to generate {}", self.target))
    }
}

pub fn load_bean_class(path: &Path) -> Result<BeanClass> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bean description {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid bean description in {}", path.display()))
}

/// Write `artifact` to `out`. A directory gets the class's package path
/// appended, creating intermediate directories.
pub fn write_artifact(artifact: &ClassArtifact, out: &Path) -> Result<PathBuf> {
    let path = if out.is_dir() {
        out.join(artifact.relative_path())
    } else {
        out.to_path_buf()
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&path, artifact.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
