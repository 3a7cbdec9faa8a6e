//! Unified error handling for the client core.
//!
//! Stores are total over local state and never return errors; everything
//! that touches the filesystem or the network funnels into [`AppError`].
//! There is no automatic retry - failures surface to the UI and the user
//! retries the action.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the client core.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Offline storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend API operation failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
