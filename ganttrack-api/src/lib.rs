//! # Ganttrack API Library
//!
//! Library crate backing the Ganttrack API server binary. Exposes the
//! router, configuration, and error types so integration tests can
//! build the application in-process.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
