#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

//! `sandboxd` — a network-reachable service that lets a caller read files,
//! write files, list directories, and run a constrained set of shell
//! commands, all confined to a single workspace directory.

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod gateway;
pub mod workspace;

pub use config::Config;
pub use error::AgentError;
