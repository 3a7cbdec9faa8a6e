//! Wire types for the Tiffin REST API.
//!
//! Every endpoint wraps its payload in the same ad hoc envelope:
//! `{ success, data?, message?, error? }` with a short fixed error-code
//! list. There is no richer error taxonomy on the wire.

use serde::{Deserialize, Serialize};
use tiffin_core::{Email, OrderStatus, Price, ProductId, UserRole};

use crate::models::UserProfile;

/// Response envelope used by every `/api/*` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    /// Human-readable outcome, shown to the user as a toast.
    #[serde(default)]
    pub message: Option<String>,
    /// Machine-readable failure code, absent on success.
    #[serde(default)]
    pub error: Option<ErrorCode>,
}

/// The fixed error-code list the backend emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    NotFound,
    Validation,
    ServerError,
    /// Synthesized client-side when the request never reached the backend.
    Network,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::ServerError => write!(f, "server_error"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// `POST /api/auth/login` request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

/// `POST /api/auth/register` request body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: Email,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

/// Successful auth payload: bearer token plus the signed-in profile.
///
/// Also the shape persisted under the `auth-storage` key so a restart
/// resumes the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserProfile,
}

/// `PATCH /api/users/me` request body. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// `PATCH /api/orders/{id}/status` request body.
#[derive(Debug, Serialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// One orderable product on a vendor's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub is_available: bool,
}
