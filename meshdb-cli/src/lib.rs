//! MeshDB command-line interface
//!
//! The `meshdb` binary opens a file-backed [`meshdb_core::Engine`] and maps
//! each subcommand onto one engine operation.

pub mod commands;
pub mod config;
pub mod logging;
