//! reqwest implementation of [`BackendApi`]

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::types::{
    AdminAuthResponse, CollectionListResponse, CreatedRecord, NewUserRequest, PasswordAuthRequest,
    UserAuthResponse, UserListResponse,
};
use super::{
    BackendApi, BackendError, CollectionDescriptor, Credentials, SessionToken, UserAuth,
    UserDescriptor,
};

const ADMIN_AUTH_PATH: &[&str] = &["api", "admins", "auth-with-password"];
const USER_AUTH_PATH: &[&str] = &["api", "collections", "users", "auth-with-password"];
const COLLECTIONS_PATH: &[&str] = &["api", "collections"];
const USER_RECORDS_PATH: &[&str] = &["api", "collections", "users", "records"];

/// HTTP client for a single backend base URL
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client for the given base URL
    pub fn new(base_url: Url) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent(concat!("collection-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Remote(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Parse a base URL string and create a client for it
    pub fn from_url_str(base_url: &str) -> Result<Self, BackendError> {
        let url = Url::parse(base_url)
            .map_err(|e| BackendError::Remote(format!("Invalid backend URL '{}': {}", base_url, e)))?;
        Self::new(url)
    }

    /// Build an endpoint URL, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BackendError::Remote(format!("Backend URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn collection_endpoint(&self, name: &str) -> Result<Url, BackendError> {
        let mut segments = COLLECTIONS_PATH.to_vec();
        segments.push(name);
        self.endpoint(&segments)
    }

    fn authorized(&self, method: Method, url: Url, token: &SessionToken) -> RequestBuilder {
        self.client.request(method, url).header(AUTHORIZATION, token.bearer())
    }

    /// Send a request, mapping transport failures to a remote error
    async fn send(request: RequestBuilder, what: &str) -> Result<Response, BackendError> {
        request
            .send()
            .await
            .map_err(|e| BackendError::Remote(format!("Failed to {}: {}", what, e)))
    }

    /// Require the expected status, otherwise surface the body verbatim
    async fn expect_status(
        response: Response,
        accepted: &[StatusCode],
        what: &str,
    ) -> Result<Response, BackendError> {
        let status = response.status();
        if accepted.contains(&status) {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        debug!(status = %status, body = %body, "Backend rejected request to {}", what);
        Err(BackendError::Remote(format!("Failed to {} ({}): {}", what, status, body)))
    }

    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, BackendError> {
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Remote(format!("Failed to read response to {}: {}", what, e)))?;

        serde_json::from_str(&body).map_err(|e| {
            BackendError::Remote(format!("Failed to parse response to {}: {}: {}", what, e, body))
        })
    }

    /// Shared password authentication flow for admins and users
    async fn password_auth<T: DeserializeOwned>(
        &self,
        path: &[&str],
        credentials: &Credentials,
    ) -> Result<T, BackendError> {
        let url = self.endpoint(path).map_err(|e| BackendError::Auth(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .json(&PasswordAuthRequest::from(credentials))
            .send()
            .await
            .map_err(|e| BackendError::Auth(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Auth(format!("Failed to read response: {}", e)))?;

        if status != StatusCode::OK {
            return Err(BackendError::Auth(format!("{}: {}", status, body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| BackendError::Auth(format!("Failed to parse response: {}: {}", e, body)))
    }
}

#[async_trait]
impl BackendApi for BackendClient {
    async fn authenticate_admin(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionToken, BackendError> {
        let response: AdminAuthResponse = self.password_auth(ADMIN_AUTH_PATH, credentials).await?;
        debug!(identity = %credentials.identity, "Authenticated as admin");
        Ok(SessionToken::new(response.token))
    }

    async fn authenticate_user(&self, credentials: &Credentials) -> Result<UserAuth, BackendError> {
        let response: UserAuthResponse = self.password_auth(USER_AUTH_PATH, credentials).await?;
        debug!(identity = %credentials.identity, user_id = %response.record.id, "Authenticated as user");
        Ok(UserAuth {
            token: SessionToken::new(response.token),
            record: response.record,
        })
    }

    async fn list_collections(&self, token: &SessionToken) -> Result<Vec<String>, BackendError> {
        let what = "list collections";
        let url = self.endpoint(COLLECTIONS_PATH)?;
        let response = Self::send(self.authorized(Method::GET, url, token), what).await?;
        let response = Self::expect_status(response, &[StatusCode::OK], what).await?;
        let list: CollectionListResponse = Self::decode(response, what).await?;

        Ok(list.items.into_iter().map(|item| item.name).collect())
    }

    async fn create_collection(
        &self,
        token: &SessionToken,
        descriptor: &CollectionDescriptor,
    ) -> Result<(), BackendError> {
        let what = "create collection";
        let url = self.endpoint(COLLECTIONS_PATH)?;
        let request = self.authorized(Method::POST, url, token).json(descriptor);
        let response = Self::send(request, what).await?;
        Self::expect_status(response, &[StatusCode::OK], what).await?;

        debug!(collection = %descriptor.name, fields = descriptor.schema.len(), "Created collection");
        Ok(())
    }

    async fn get_collection(
        &self,
        token: &SessionToken,
        name: &str,
    ) -> Result<Map<String, Value>, BackendError> {
        let what = "retrieve collection";
        let url = self.collection_endpoint(name)?;
        let response = Self::send(self.authorized(Method::GET, url, token), what).await?;
        let response = Self::expect_status(response, &[StatusCode::OK], what).await?;
        Self::decode(response, what).await
    }

    async fn delete_collection(&self, token: &SessionToken, name: &str) -> Result<(), BackendError> {
        let what = "delete collection";
        let url = self.collection_endpoint(name)?;
        let response = Self::send(self.authorized(Method::DELETE, url, token), what).await?;
        Self::expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT], what).await?;

        debug!(collection = %name, "Deleted collection");
        Ok(())
    }

    async fn user_exists(&self, token: &SessionToken, email: &str) -> Result<bool, BackendError> {
        let what = "list users";
        let url = self.endpoint(USER_RECORDS_PATH)?;
        let response = Self::send(self.authorized(Method::GET, url, token), what).await?;
        let response = Self::expect_status(response, &[StatusCode::OK], what).await?;
        let users: UserListResponse = Self::decode(response, what).await?;

        Ok(users.items.iter().any(|user| user.email == email))
    }

    async fn create_user(
        &self,
        token: &SessionToken,
        descriptor: &UserDescriptor,
    ) -> Result<String, BackendError> {
        let what = "create user";
        let url = self.endpoint(USER_RECORDS_PATH)?;
        let request = self
            .authorized(Method::POST, url, token)
            .json(&NewUserRequest::from(descriptor));
        let response = Self::send(request, what).await?;
        let response = Self::expect_status(response, &[StatusCode::OK], what).await?;
        let record: CreatedRecord = Self::decode(response, what).await?;

        debug!(user_id = %record.id, username = %descriptor.username, "Created user");
        Ok(record.id)
    }
}
