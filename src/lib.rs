//! `insight-engines` library crate.
//!
//! The binary (`insight`) is a thin wrapper around this library so that:
//!
//! - the analytic engines are testable without spawning a server
//! - modules are reusable (e.g., batch jobs, other front-ends)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod engines;
pub mod error;
pub mod math;
pub mod models;
pub mod server;
