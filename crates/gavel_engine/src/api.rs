use async_trait::async_trait;
use gavel_core::{Listing, UserIdentity};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote rejected the call for lack of a session (HTTP 401).
    /// Distinct from the other variants so callers can prompt for login
    /// instead of showing an error banner.
    #[error("authentication required")]
    AuthRequired,
    #[error("HTTP error! Status: {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// The remote aggregation API this core calls into.
///
/// The url-keyed listing mappings come back flattened to response order;
/// that order is the sort tie-break downstream.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Full-text search across aggregated listings.
    async fn search(&self, query: &str) -> Result<Vec<Listing>, ApiError>;
    /// The full current listing pool.
    async fn listings(&self) -> Result<Vec<Listing>, ApiError>;
    /// Saved listings for the current identity.
    async fn garage(&self) -> Result<Vec<Listing>, ApiError>;
    /// Saves a listing; returns the remote's snapshot of it.
    async fn save(&self, url: &str) -> Result<Listing, ApiError>;
    /// Removes a listing from the saved set.
    async fn delete_saved_listing(&self, url: &str) -> Result<(), ApiError>;
    async fn login(
        &self,
        email_or_username: &str,
        password: &str,
    ) -> Result<UserIdentity, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<UserIdentity, ApiError>;
}
