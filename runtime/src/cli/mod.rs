//! CLI subcommand implementations for the japa binary.

pub mod countries_cmd;
pub mod doctor;
pub mod output;
pub mod requirements_cmd;
pub mod roadmap_cmd;
pub mod serve;
