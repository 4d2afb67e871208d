//! Generate command - synthesize a wrapper class and write it to disk

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use cmp_synth::request::{load_bean_class, write_artifact};
use cmp_synth::{BeanClass, SynthesisRequest};

use super::output;

#[derive(Parser, Debug)]
pub struct GenerateCmd {
    /// Fully qualified name of the class to generate, e.g. com.example.FooImpl
    #[arg(long, required_unless_present = "request")]
    pub target: Option<String>,

    /// Fully qualified name of the bean class (no method list)
    #[arg(long, conflicts_with_all = ["base_spec", "request"])]
    pub base: Option<String>,

    /// JSON bean description with name, public methods and unknown_primary_key
    #[arg(long, value_name = "JSON", conflicts_with = "request")]
    pub base_spec: Option<PathBuf>,

    /// JSON request bundling target, base and surrogate_identity
    #[arg(long, value_name = "JSON", conflicts_with = "target")]
    pub request: Option<PathBuf>,

    /// Add (or with =false, omit) the public java.lang.Long OpenEJB_pk field,
    /// overriding the bean's unknown_primary_key
    #[arg(long, value_name = "BOOL", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub surrogate_identity: Option<bool>,

    /// Output file, or an existing directory to receive <package>/<Class>.class
    #[arg(long, short)]
    pub out: PathBuf,
}

impl GenerateCmd {
    pub fn execute(&self, json_output: bool) -> Result<()> {
        let request = self.build_request()?;
        let artifact = request.synthesize()?;
        let path = write_artifact(&artifact, &self.out)?;
        info!(path = %path.display(), "class written");
        println!("{}", output::format_generated(&artifact, &path, json_output));
        Ok(())
    }

    fn build_request(&self) -> Result<SynthesisRequest> {
        let mut request = match (&self.request, &self.target) {
            (Some(path), _) => SynthesisRequest::load(path)?,
            (None, Some(target)) => {
                let base = match (&self.base, &self.base_spec) {
                    (Some(name), _) => BeanClass::named(name.clone()),
                    (None, Some(path)) => load_bean_class(path)?,
                    (None, None) => bail!("either --base or --base-spec is required"),
                };
                SynthesisRequest::new(target.clone(), base)
            }
            (None, None) => bail!("either --target or --request is required"),
        };
        if let Some(required) = self.surrogate_identity {
            request.surrogate_identity = Some(required);
        }
        Ok(request)
    }
}
