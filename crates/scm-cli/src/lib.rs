//! Admin command-line interface for the datanode registry.

pub mod commands;
pub mod runtime;
