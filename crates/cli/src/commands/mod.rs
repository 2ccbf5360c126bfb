//! CLI subcommands.

pub mod discover;
pub mod migrate;
