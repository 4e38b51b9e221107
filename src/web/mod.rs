//! Web UI for collection administration
//!
//! Provides a server-side rendered interface for:
//! - Listing collections
//! - Creating collections with the configured default schema
//! - Inspecting and deleting a single collection

mod error;
mod routes;
mod server;
mod templates;

pub use error::WebError;
pub use server::{AppState, WebServer};
