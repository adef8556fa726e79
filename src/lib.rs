//! Task management REST service library.
//!
//! Exports the validator, repository and HTTP router for the binary and
//! for integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod server;
pub mod types;
pub mod validation;
