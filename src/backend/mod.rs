//! Client for the backend's HTTP administration API
//!
//! Every operation performs exactly one outbound request. Authentication
//! yields a [`SessionToken`] that the caller passes into each subsequent
//! call; nothing is cached between calls.

mod client;
mod types;

pub use client::BackendClient;
pub use types::*;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Backend-related errors
///
/// Transport failures are folded into the same variant as application-level
/// rejections for the operation that produced them.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Backend request failed: {0}")]
    Remote(String),
}

impl BackendError {
    /// Whether this error came from an authentication endpoint
    pub fn is_auth(&self) -> bool {
        matches!(self, BackendError::Auth(_))
    }
}

/// Operations against the backend service
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Authenticate as an administrator
    async fn authenticate_admin(&self, credentials: &Credentials)
        -> Result<SessionToken, BackendError>;

    /// Authenticate as an end user of the `users` collection
    async fn authenticate_user(&self, credentials: &Credentials) -> Result<UserAuth, BackendError>;

    /// List collection names in backend order
    async fn list_collections(&self, token: &SessionToken) -> Result<Vec<String>, BackendError>;

    /// Create a new collection
    async fn create_collection(
        &self,
        token: &SessionToken,
        descriptor: &CollectionDescriptor,
    ) -> Result<(), BackendError>;

    /// Fetch a collection definition as an untyped JSON object
    async fn get_collection(
        &self,
        token: &SessionToken,
        name: &str,
    ) -> Result<Map<String, Value>, BackendError>;

    /// Delete a collection by name
    async fn delete_collection(&self, token: &SessionToken, name: &str) -> Result<(), BackendError>;

    /// Check whether a user with the given email exists.
    ///
    /// Fetches the user list and scans it locally, so the cost grows with the
    /// total number of users.
    async fn user_exists(&self, token: &SessionToken, email: &str) -> Result<bool, BackendError>;

    /// Create a user, returning the new record id
    async fn create_user(
        &self,
        token: &SessionToken,
        descriptor: &UserDescriptor,
    ) -> Result<String, BackendError>;
}
