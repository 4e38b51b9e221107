//! Collection Console - a web front-end for backend collections
//!
//! Lets an operator list, create, inspect and delete collections on a
//! PocketBase-style backend through its HTTP administration API. The console
//! stores nothing itself: every request authenticates as admin, forwards one
//! call to the backend and renders the result.

pub mod backend;
pub mod config;
pub mod web;

use thiserror::Error;

/// Top-level error type for the console
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Backend error: {0}")]
    Backend(#[from] backend::BackendError),

    #[error("Validation error: {0}")]
    Validation(#[from] backend::ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
