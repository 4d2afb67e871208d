//! Subcommands for the cmp-synth CLI

pub mod generate;
pub mod inspect;
pub mod output;
