use std::time::Duration;

use async_trait::async_trait;
use gavel_core::{Listing, UserIdentity};
use serde::Deserialize;
use serde_json::json;

use crate::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Failure payloads arrive as `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Login and register answer with `{"user": {...}}`.
#[derive(Debug, Deserialize)]
struct UserBody {
    user: UserIdentity,
}

/// Save answers with `{"car": {...}}`.
#[derive(Debug, Deserialize)]
struct SavedBody {
    car: Listing,
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        // The cookie store carries the session credential the API sets on
        // login, like the browser's credentialed fetches did.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .cookie_store(true)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthRequired);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Flattens a url-keyed JSON mapping to response order. The key is
    /// redundant with each listing's own `url` field.
    async fn listing_map(response: reqwest::Response) -> Result<Vec<Listing>, ApiError> {
        let map = response
            .json::<serde_json::Map<String, serde_json::Value>>()
            .await
            .map_err(|err| ApiError::InvalidBody(err.to_string()))?;
        map.into_iter()
            .map(|(_, value)| {
                serde_json::from_value(value).map_err(|err| ApiError::InvalidBody(err.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl ApiClient for ReqwestApiClient {
    async fn search(&self, query: &str) -> Result<Vec<Listing>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/search"))
            .query(&[("query", query)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::listing_map(Self::check(response).await?).await
    }

    async fn listings(&self) -> Result<Vec<Listing>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/listings"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        match Self::check(response).await {
            Ok(response) => Self::listing_map(response).await,
            // The API answers 404 for an empty pool; that is an empty
            // mapping, not a failure.
            Err(ApiError::Status { status: 404, .. }) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    async fn garage(&self) -> Result<Vec<Listing>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("/garage"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::listing_map(Self::check(response).await?).await
    }

    async fn save(&self, url: &str) -> Result<Listing, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/save"))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::check(response)
            .await?
            .json::<SavedBody>()
            .await
            .map(|body| body.car)
            .map_err(|err| ApiError::InvalidBody(err.to_string()))
    }

    async fn delete_saved_listing(&self, url: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint("/delete_saved_listing"))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::check(response).await.map(|_| ())
    }

    async fn login(
        &self,
        email_or_username: &str,
        password: &str,
    ) -> Result<UserIdentity, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/login"))
            .json(&json!({
                "email_or_username": email_or_username,
                "password": password,
            }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::check(response)
            .await?
            .json::<UserBody>()
            .await
            .map(|body| body.user)
            .map_err(|err| ApiError::InvalidBody(err.to_string()))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/logout"))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::check(response).await.map(|_| ())
    }

    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<UserIdentity, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/register"))
            .json(&json!({
                "email": email,
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::check(response)
            .await?
            .json::<UserBody>()
            .await
            .map(|body| body.user)
            .map_err(|err| ApiError::InvalidBody(err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}
