//! Thin REST client for the Tiffin backend.
//!
//! Plain `reqwest` wrappers over `/api/auth`, `/api/users`, `/api/orders`,
//! and `/api/vendors`. Vendor reads are cached with `moka` (short TTL);
//! everything else hits the network every time. Deliberately no retry
//! policy and no circuit breaker - a failed call surfaces immediately and
//! the user retries the action.
//!
//! When constructed with persistence, the signed-in session (token plus
//! profile) lives under the `auth-storage` key and is resumed on the next
//! launch; logout removes it.

pub mod types;

pub use types::{
    ApiResponse, AuthPayload, ErrorCode, LoginRequest, MenuItem, RegisterRequest,
    UpdateOrderStatusRequest, UpdateProfileRequest,
};

use std::sync::{Arc, Mutex};

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tiffin_core::{Email, OrderId, OrderStatus, UserRole, VendorId};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::models::{Order, UserProfile, Vendor};
use crate::storage::{OfflineStore, keys};

/// Errors from the REST client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (DNS, connect, timeout, body read).
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected envelope.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend answered with `success: false`.
    #[error("API error ({code}): {message}")]
    Rejected {
        code: ErrorCode,
        message: String,
    },

    /// A successful envelope arrived without its `data` field.
    #[error("Response missing data")]
    MissingData,

    /// The call requires a bearer token and none is held.
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl ApiError {
    /// The error code to surface to the UI.
    ///
    /// Failures that never produced an envelope are mapped onto the wire
    /// codes: transport errors become [`ErrorCode::Network`], malformed or
    /// incomplete envelopes become [`ErrorCode::ServerError`], and a missing
    /// token becomes [`ErrorCode::Unauthorized`].
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Http(_) => ErrorCode::Network,
            Self::Parse(_) | Self::MissingData => ErrorCode::ServerError,
            Self::Rejected { code, .. } => *code,
            Self::NotAuthenticated => ErrorCode::Unauthorized,
        }
    }
}

/// Client for the Tiffin REST API.
///
/// Cheap to clone; all clones share the HTTP connection pool, the bearer
/// token, and the vendor cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Mutex<Option<SecretString>>,
    vendor_cache: Cache<VendorId, Vendor>,
    persistence: Option<OfflineStore>,
}

impl ApiClient {
    /// Create a new API client from configuration. The session is not
    /// persisted; a restart starts signed out.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self::build(config, None)
    }

    /// Create an API client that persists the session to `offline` under the
    /// `auth-storage` key and resumes it on construction.
    ///
    /// A corrupt persisted blob is logged and ignored; the client starts
    /// signed out.
    #[must_use]
    pub fn with_persistence(config: &ClientConfig, offline: OfflineStore) -> Self {
        let client = Self::build(config, Some(offline.clone()));
        match offline.get::<AuthPayload>(keys::AUTH) {
            Ok(Some(payload)) => client.set_token(Some(payload.token)),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Failed to hydrate auth blob, starting signed out"),
        }
        client
    }

    fn build(config: &ClientConfig, persistence: Option<OfflineStore>) -> Self {
        let vendor_cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(config.vendor_cache_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.clone(),
                token: Mutex::new(None),
                vendor_cache,
                persistence,
            }),
        }
    }

    // =========================================================================
    // /api/auth
    // =========================================================================

    /// Log in and hold the returned bearer token for subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the backend rejects the
    /// credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: Email, password: String) -> Result<UserProfile, ApiError> {
        let body = LoginRequest { email, password };
        let payload: AuthPayload = self
            .execute(self.post("auth/login")?.json(&body))
            .await?;
        Ok(self.start_session(payload))
    }

    /// Register a new account; logs in on success.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or validation rejection.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: Email,
        password: String,
        name: String,
        role: UserRole,
    ) -> Result<UserProfile, ApiError> {
        let body = RegisterRequest {
            email,
            password,
            name,
            role,
        };
        let payload: AuthPayload = self
            .execute(self.post("auth/register")?.json(&body))
            .await?;
        Ok(self.start_session(payload))
    }

    /// Drop the held token and the persisted session. The backend call is
    /// best-effort; local state is cleared regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Ok(request) = self.post("auth/logout")
            && let Err(e) = self.execute::<serde_json::Value>(request).await
        {
            debug!(error = %e, "Logout call failed, clearing token anyway");
        }
        self.set_token(None);
        if let Some(offline) = &self.inner.persistence
            && let Err(e) = offline.remove(keys::AUTH)
        {
            warn!(error = %e, "Failed to remove persisted auth blob");
        }
    }

    /// Whether a bearer token is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.token.lock().is_ok_and(|t| t.is_some())
    }

    /// The profile from the persisted session blob, if any.
    ///
    /// Lets the UI greet the user before the first `/api/users/me` round
    /// trip completes, or while offline.
    #[must_use]
    pub fn cached_profile(&self) -> Option<UserProfile> {
        let offline = self.inner.persistence.as_ref()?;
        match offline.get::<AuthPayload>(keys::AUTH) {
            Ok(payload) => payload.map(|p| p.user),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted auth blob");
                None
            }
        }
    }

    /// Hold the token, persist the session, and hand back the profile.
    fn start_session(&self, payload: AuthPayload) -> UserProfile {
        if let Some(offline) = &self.inner.persistence
            && let Err(e) = offline.set(keys::AUTH, &payload)
        {
            warn!(error = %e, "Failed to persist auth blob");
        }
        let AuthPayload { token, user } = payload;
        self.set_token(Some(token));
        user
    }

    // =========================================================================
    // /api/users
    // =========================================================================

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAuthenticated`] without a token, or any
    /// network/backend error.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.execute(self.get_authed("users/me")?).await
    }

    /// Update profile fields; absent fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAuthenticated`] without a token, or any
    /// network/backend error.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        update: UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        self.execute(self.patch_authed("users/me")?.json(&update))
            .await
    }

    // =========================================================================
    // /api/vendors
    // =========================================================================

    /// List vendors. Not cached: the list view always refetches.
    ///
    /// # Errors
    ///
    /// Returns any network/backend error.
    #[instrument(skip(self))]
    pub async fn vendors(&self) -> Result<Vec<Vendor>, ApiError> {
        self.execute(self.get("vendors")?).await
    }

    /// Fetch one vendor, served from the moka cache within its TTL.
    ///
    /// # Errors
    ///
    /// Returns any network/backend error.
    #[instrument(skip(self))]
    pub async fn vendor(&self, id: VendorId) -> Result<Vendor, ApiError> {
        if let Some(vendor) = self.inner.vendor_cache.get(&id).await {
            debug!(vendor_id = %id, "Vendor served from cache");
            return Ok(vendor);
        }
        let vendor: Vendor = self
            .execute(self.get(&format!("vendors/{id}"))?)
            .await?;
        self.inner.vendor_cache.insert(id, vendor.clone()).await;
        Ok(vendor)
    }

    /// Fetch a vendor's menu. Not cached: availability changes often.
    ///
    /// # Errors
    ///
    /// Returns any network/backend error.
    #[instrument(skip(self))]
    pub async fn vendor_menu(&self, id: VendorId) -> Result<Vec<MenuItem>, ApiError> {
        self.execute(self.get(&format!("vendors/{id}/menu"))?)
            .await
    }

    // =========================================================================
    // /api/orders
    // =========================================================================

    /// Submit a locally created order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAuthenticated`] without a token, or any
    /// network/backend error.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn create_order(&self, order: &Order) -> Result<Order, ApiError> {
        self.execute(self.post_authed("orders")?.json(order)).await
    }

    /// Fetch the signed-in user's order history.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAuthenticated`] without a token, or any
    /// network/backend error.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.execute(self.get_authed("orders")?).await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAuthenticated`] without a token, or any
    /// network/backend error.
    #[instrument(skip(self))]
    pub async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.execute(self.get_authed(&format!("orders/{id}"))?)
            .await
    }

    /// Push a status change for an order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAuthenticated`] without a token, or any
    /// network/backend error.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let body = UpdateOrderStatusRequest { status };
        self.execute(
            self.patch_authed(&format!("orders/{id}/status"))?
                .json(&body),
        )
        .await
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(&format!("api/{path}"))
            .map_err(|_| ApiError::Rejected {
                code: ErrorCode::Validation,
                message: format!("invalid API path: {path}"),
            })
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.inner.client.get(self.endpoint(path)?))
    }

    fn post(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.inner.client.post(self.endpoint(path)?))
    }

    fn get_authed(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.get(path)?.bearer_auth(self.require_token()?))
    }

    fn post_authed(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self.post(path)?.bearer_auth(self.require_token()?))
    }

    fn patch_authed(&self, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        Ok(self
            .inner
            .client
            .patch(self.endpoint(path)?)
            .bearer_auth(self.require_token()?))
    }

    fn require_token(&self) -> Result<String, ApiError> {
        self.inner
            .token
            .lock()
            .ok()
            .and_then(|t| t.as_ref().map(|s| s.expose_secret().to_string()))
            .ok_or(ApiError::NotAuthenticated)
    }

    fn set_token(&self, token: Option<String>) {
        if let Ok(mut held) = self.inner.token.lock() {
            *held = token.map(SecretString::from);
        }
    }

    /// Send a request and unwrap the `{success, data, message, error}`
    /// envelope.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first for better parse-failure diagnostics.
        let text = response.text().await?;
        let envelope: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    status = %status,
                    body = %text.chars().take(500).collect::<String>(),
                    "Failed to parse API response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if !envelope.success {
            let code = envelope.error.unwrap_or(match status.as_u16() {
                401 | 403 => ErrorCode::Unauthorized,
                404 => ErrorCode::NotFound,
                400 | 422 => ErrorCode::Validation,
                _ => ErrorCode::ServerError,
            });
            return Err(ApiError::Rejected {
                code,
                message: envelope
                    .message
                    .unwrap_or_else(|| "Request failed".to_string()),
            });
        }

        envelope.data.ok_or(ApiError::MissingData)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tiffin_core::UserId;

    fn client() -> ApiClient {
        ApiClient::new(&ClientConfig::default())
    }

    fn auth_payload(token: &str) -> AuthPayload {
        AuthPayload {
            token: token.to_string(),
            user: UserProfile {
                id: UserId::new(1),
                email: Email::parse("asha@example.com").unwrap(),
                name: "Asha".to_string(),
                role: UserRole::Customer,
                phone: None,
            },
        }
    }

    /// A port in the reserved range; connections are refused immediately.
    fn unreachable_config() -> ClientConfig {
        ClientConfig {
            api_base_url: "http://127.0.0.1:9".parse().unwrap(),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_endpoint_joins_api_prefix() {
        let api = client();
        let url = api.endpoint("vendors/7").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/vendors/7");
    }

    #[test]
    fn test_unauthenticated_by_default() {
        let api = client();
        assert!(!api.is_authenticated());
        assert!(matches!(
            api.require_token(),
            Err(ApiError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_token_lifecycle() {
        let api = client();
        api.set_token(Some("tok_abc123".to_string()));
        assert!(api.is_authenticated());
        assert_eq!(api.require_token().unwrap(), "tok_abc123");
        api.set_token(None);
        assert!(!api.is_authenticated());
    }

    #[test]
    fn test_rejected_error_display() {
        let err = ApiError::Rejected {
            code: ErrorCode::NotFound,
            message: "Order not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error (not_found): Order not found");
    }

    #[test]
    fn test_with_persistence_resumes_session() {
        let offline = OfflineStore::in_memory();
        offline.set(keys::AUTH, &auth_payload("tok_persisted")).unwrap();

        let api = ApiClient::with_persistence(&ClientConfig::default(), offline);
        assert!(api.is_authenticated());
        assert_eq!(api.require_token().unwrap(), "tok_persisted");
        assert_eq!(api.cached_profile().unwrap().name, "Asha");
    }

    #[test]
    fn test_with_persistence_empty_store_starts_signed_out() {
        let api = ApiClient::with_persistence(
            &ClientConfig::default(),
            OfflineStore::in_memory(),
        );
        assert!(!api.is_authenticated());
        assert!(api.cached_profile().is_none());
    }

    #[test]
    fn test_start_session_persists_auth_blob() {
        let offline = OfflineStore::in_memory();
        let api = ApiClient::with_persistence(&ClientConfig::default(), offline.clone());

        let user = api.start_session(auth_payload("tok_fresh"));
        assert_eq!(user.name, "Asha");
        assert!(api.is_authenticated());

        let persisted: Option<AuthPayload> = offline.get(keys::AUTH).unwrap();
        assert_eq!(persisted.unwrap().token, "tok_fresh");
    }

    #[tokio::test]
    async fn test_logout_removes_persisted_session() {
        let offline = OfflineStore::in_memory();
        offline.set(keys::AUTH, &auth_payload("tok_old")).unwrap();
        let api = ApiClient::with_persistence(&unreachable_config(), offline.clone());
        assert!(api.is_authenticated());

        api.logout().await;

        assert!(!api.is_authenticated());
        let persisted: Option<AuthPayload> = offline.get(keys::AUTH).unwrap();
        assert!(persisted.is_none());
    }

    #[test]
    fn test_error_code_mapping() {
        let rejected = ApiError::Rejected {
            code: ErrorCode::Validation,
            message: "bad quantity".to_string(),
        };
        assert_eq!(rejected.code(), ErrorCode::Validation);
        assert_eq!(ApiError::NotAuthenticated.code(), ErrorCode::Unauthorized);
        assert_eq!(ApiError::MissingData.code(), ErrorCode::ServerError);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_network_code() {
        let api = ApiClient::new(&unreachable_config());
        let err = api.vendors().await.unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
        assert_eq!(err.code(), ErrorCode::Network);
    }
}
