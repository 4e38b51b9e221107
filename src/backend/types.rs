//! Request and response shapes for the backend API

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors detected locally before any backend call is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Identity and secret used for a single authentication call
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identity: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Bearer token returned by a successful authentication
#[derive(Debug, Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Definition of a collection to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub collection_type: String,
    #[serde(default)]
    pub schema: Vec<FieldDescriptor>,
}

impl CollectionDescriptor {
    /// Build a descriptor, rejecting an empty name
    pub fn new(
        name: impl Into<String>,
        collection_type: impl Into<String>,
        schema: Vec<FieldDescriptor>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::Empty("Collection name"));
        }

        Ok(Self {
            name,
            collection_type: collection_type.into(),
            schema,
        })
    }
}

/// A single schema field.
///
/// `options` is interpreted only by the backend and passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            options: Map::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// A new end user for the `users` collection
#[derive(Debug, Clone)]
pub struct UserDescriptor {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirm: SecretString,
    pub verified: bool,
}

impl UserDescriptor {
    /// Build a descriptor whose confirmation matches the password
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        verified: bool,
    ) -> Self {
        let password = SecretString::from(password.into());
        Self {
            username: username.into(),
            email: email.into(),
            password_confirm: password.clone(),
            password,
            verified,
        }
    }
}

/// Record of an authenticated end user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub collection_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub verified: bool,
}

/// Result of end-user authentication
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub token: SessionToken,
    pub record: UserRecord,
}

// ============== Wire types ==============

#[derive(Serialize)]
pub(crate) struct PasswordAuthRequest<'a> {
    pub identity: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a Credentials> for PasswordAuthRequest<'a> {
    fn from(credentials: &'a Credentials) -> Self {
        Self {
            identity: &credentials.identity,
            password: credentials.password.expose_secret(),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct AdminAuthResponse {
    pub token: String,
}

#[derive(Deserialize)]
pub(crate) struct UserAuthResponse {
    pub token: String,
    pub record: UserRecord,
}

#[derive(Deserialize)]
pub(crate) struct CollectionListResponse {
    pub items: Vec<CollectionListItem>,
}

#[derive(Deserialize)]
pub(crate) struct CollectionListItem {
    pub name: String,
}

#[derive(Deserialize)]
pub(crate) struct UserListResponse {
    pub items: Vec<UserListItem>,
}

#[derive(Deserialize)]
pub(crate) struct UserListItem {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewUserRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
    pub verified: bool,
}

impl<'a> From<&'a UserDescriptor> for NewUserRequest<'a> {
    fn from(user: &'a UserDescriptor) -> Self {
        Self {
            username: &user.username,
            email: &user.email,
            password: user.password.expose_secret(),
            password_confirm: user.password_confirm.expose_secret(),
            verified: user.verified,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct CreatedRecord {
    pub id: String,
}
