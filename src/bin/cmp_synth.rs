//! cmp-synth: generate and inspect CMP entity bean wrapper classes
//!
//! ## Example Usage
//!
//! ```bash
//! # Wrap a bean with no natural primary key
//! cmp-synth generate --target com.example.FooImpl --base com.example.Foo \
//!     --surrogate-identity --out classes/
//!
//! # Use a JSON bean description so missing ejbPostCreate methods are added
//! cmp-synth generate --target com.example.FooImpl --base-spec foo.json --out classes/
//!
//! # Dump a class file
//! cmp-synth inspect classes/com/example/FooImpl.class --code
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod synth_cli;

use synth_cli::{generate::GenerateCmd, inspect::InspectCmd};

#[derive(Parser)]
#[command(
    name = "cmp-synth",
    author,
    version,
    about = "CMP entity bean wrapper generator",
    long_about = "Generates the JVM class an EJB container loads for a CMP 1.x entity bean.\n\n\
                  The class extends the bean, implements javax.ejb.EntityBean and can carry \
                  the OpenEJB_pk surrogate key."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a wrapper class for a bean
    Generate(GenerateCmd),

    /// Print the structure of a class file
    Inspect(InspectCmd),
}

fn main() -> Result<()> {
    let Cli {
        command,
        json,
        verbose,
    } = Cli::parse();

    init_tracing(verbose);

    match command {
        Commands::Generate(cmd) => cmd.execute(json),
        Commands::Inspect(cmd) => cmd.execute(json, verbose > 0),
    }
}

/// Logs go to stderr so `--json` output stays parseable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
