//! Commands built into every CLI.

pub mod config;
