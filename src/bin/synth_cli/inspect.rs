//! Inspect command - parse a class file and print its structure

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use cmp_synth::ParsedClass;

use super::output;

#[derive(Parser, Debug)]
pub struct InspectCmd {
    /// Path to a .class file
    pub path: PathBuf,

    /// Include decoded method bodies
    #[arg(long)]
    pub code: bool,
}

impl InspectCmd {
    pub fn execute(&self, json_output: bool, verbose: bool) -> Result<()> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let class = ParsedClass::parse(&bytes)
            .with_context(|| format!("{} is not a valid class file", self.path.display()))?;

        if json_output {
            println!("{}", serde_json::to_string_pretty(&class)?);
        } else {
            print!("{}", output::format_class(&class, self.code || verbose));
        }
        Ok(())
    }
}
