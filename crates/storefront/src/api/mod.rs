//! REST client for the storefront backend.
//!
//! # Architecture
//!
//! - One function per endpoint, each issuing exactly one request
//! - No retries and no backoff: failures are returned to the caller as-is
//! - Every request passes through [`SessionGuard`]: the bearer token is
//!   attached when it is still good, and a 401 forces a logout
//!
//! # Endpoints
//!
//! | Method | Path | Function |
//! |---|---|---|
//! | GET | `/products` | [`ApiClient::list_products`] |
//! | GET | `/products/search?query=` | [`ApiClient::search_products`] |
//! | GET | `/cart` | [`ApiClient::get_cart`] |
//! | POST | `/cart` | [`ApiClient::upsert_cart_line`] |
//! | PUT | `/cart` | [`ApiClient::update_cart_status`] |
//! | POST | `/payment` | [`ApiClient::create_payment`] |
//! | PUT | `/payment` | [`ApiClient::update_payment_status`] |
//! | POST | `/shipment` | [`ApiClient::create_shipment`] |
//! | PUT | `/shipment` | [`ApiClient::update_shipment_status`] |

mod backend;
mod cart;
mod payment;
mod products;
mod shipment;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::StorefrontConfig;
use crate::session::{LogoutReason, SessionGuard};

pub use backend::StoreBackend;
pub use payment::{CreatePayment, PaymentCreated, PaymentStatusUpdate};
pub use shipment::{CreateShipment, ShipmentCreated, ShipmentStatusUpdate};

/// Errors that can occur when talking to the storefront backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, TLS, timeout) or
    /// the body could not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the session. The token has already been cleared
    /// and the logout redirect issued.
    #[error("Request failed with status code 401")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Status { status: u16, message: String },

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message suitable for showing to the shopper.
    ///
    /// Prefers the backend's own error message when it sent one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => self.to_string(),
        }
    }

    /// Whether the failure is on the server or network side (as opposed to
    /// the session or the request itself).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Unauthorized | Self::Url(_) => false,
        }
    }
}

/// Acknowledgement body returned by mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Acknowledgement {
    /// Human-readable confirmation, when the backend sends one.
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body shape the backend uses.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST backend.
///
/// Cheap to clone; clones share the HTTP connection pool and session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    session: SessionGuard,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig, session: SessionGuard) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client: builder.build()?,
                base_url: config.api_url.clone(),
                session,
            }),
        })
    }

    /// The session guard shared by every request.
    #[must_use]
    pub fn session(&self) -> &SessionGuard {
        &self.inner.session
    }

    /// Resolve an endpoint path relative to the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Build a request for an endpoint path relative to the base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.request(method, self.endpoint(path)?))
    }

    /// Attach auth, send, and map the response status.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = match self.inner.session.authorize() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.inner.session.force_logout(LogoutReason::Unauthorized);
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response)
    }

    /// Send and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Send and read an optional acknowledgement body.
    ///
    /// Status-update endpoints may answer with an empty or non-JSON body;
    /// that still counts as success.
    async fn send_ack(&self, request: RequestBuilder) -> Result<Acknowledgement, ApiError> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Extract a readable message from an error response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .unwrap_or_else(|| body.trim().to_string())
}
