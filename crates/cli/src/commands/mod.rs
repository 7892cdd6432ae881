//! Subcommand implementations

pub mod excluded;
pub mod reconstruct;
pub mod show;
