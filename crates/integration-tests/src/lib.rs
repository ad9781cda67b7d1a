//! Integration tests for Bazaar.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! No external services are needed: [`FakeBackend`] serves the storefront
//! REST endpoints from memory on an ephemeral local port and records every
//! request it receives.
//!
//! # Test Categories
//!
//! - `session_auth` - bearer token handling and forced logout
//! - `catalog_search` - product search and clearing
//! - `cart_quantity` - quantity changes over HTTP
//! - `checkout_flow` - checkout step ordering and partial failure

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bazaar_core::{CartId, CartItem, Price, Product, QuantityChange};
use bazaar_storefront::api::ApiClient;
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::session::{LogoutReason, Navigator, SessionGuard, TokenStore};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Path a forced logout redirects to in tests.
pub const LOGIN_PATH: &str = "/login";

// ============================================================================
// Recorded traffic
// ============================================================================

/// One request as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    /// Raw `Authorization` header, if sent.
    pub authorization: Option<String>,
    /// JSON body, if one was sent.
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// `"POST /shipment"` style summary.
    #[must_use]
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

// ============================================================================
// Fake backend
// ============================================================================

#[derive(Default)]
struct BackendState {
    products: Vec<Product>,
    cart: Vec<CartItem>,
    requests: Vec<RecordedRequest>,
    failures: HashMap<(Method, String), (StatusCode, Value)>,
    next_id: u32,
}

type Shared = Arc<Mutex<BackendState>>;

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory storefront backend served over HTTP.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start serving on `127.0.0.1` with the given catalog.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(products: Vec<Product>) -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            products,
            ..BackendState::default()
        }));

        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the backend, with a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let mut config =
            StorefrontConfig::for_api_url(&self.base_url()).expect("Fake backend URL is valid");
        config.login_path = LOGIN_PATH.to_string();
        config
    }

    /// API client for this backend over `store`, with a recording navigator.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self, store: Arc<dyn TokenStore>) -> (ApiClient, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::default());
        let session = SessionGuard::new(store, navigator.clone(), LOGIN_PATH);
        let client = ApiClient::new(&self.config(), session).expect("Failed to build client");
        (client, navigator)
    }

    /// Seed the cart.
    pub fn set_cart(&self, cart: Vec<CartItem>) {
        lock(&self.state).cart = cart;
    }

    /// Answer `method path` with `status` and `{"message": message}` from now on.
    pub fn fail(&self, method: Method, path: &str, status: StatusCode, message: &str) {
        lock(&self.state).failures.insert(
            (method, path.to_string()),
            (status, json!({ "message": message })),
        );
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// `"METHOD /path"` of every request received so far.
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        self.requests().iter().map(RecordedRequest::route).collect()
    }

    /// Forget recorded requests.
    pub fn reset_requests(&self) {
        lock(&self.state).requests.clear();
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<Value>(&body).ok()
    };

    let request = RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: body.clone(),
    };

    let mut state = lock(&shared);
    state.requests.push(request);

    if let Some((status, failure)) = state
        .failures
        .get(&(method.clone(), uri.path().to_string()))
    {
        return (*status, Json(failure.clone())).into_response();
    }

    match (method, uri.path()) {
        (Method::GET, "/products") => Json(state.products.clone()).into_response(),
        (Method::GET, "/products/search") => {
            let needle = params
                .get("query")
                .map(|query| query.to_lowercase())
                .unwrap_or_default();
            let matches: Vec<_> = state
                .products
                .iter()
                .filter(|product| product.name.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            Json(matches).into_response()
        }
        (Method::GET, "/cart") => Json(state.cart.clone()).into_response(),
        (Method::POST, "/cart") => upsert_cart(&mut state, body),
        (Method::PUT, "/cart") => {
            state.cart.clear();
            Json(json!({ "message": "Cart checked out" })).into_response()
        }
        (Method::POST, "/shipment") => {
            let id = state.next_id();
            Json(json!({ "shipmentId": format!("shp_{id}") })).into_response()
        }
        (Method::PUT, "/shipment") => {
            Json(json!({ "message": "Shipment updated" })).into_response()
        }
        (Method::POST, "/payment") => {
            let id = state.next_id();
            Json(json!({
                "qrCodeURL": format!("https://upi.example/qr/pay_{id}.png"),
                "paymentId": format!("pay_{id}"),
            }))
            .into_response()
        }
        // Empty body: acknowledgements are optional
        (Method::PUT, "/payment") => StatusCode::OK.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

impl BackendState {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

fn upsert_cart(state: &mut BackendState, body: Option<Value>) -> Response {
    let Some(change) = body.and_then(|body| serde_json::from_value::<QuantityChange>(body).ok())
    else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid cart line" })))
            .into_response();
    };

    if let Some(item) = state
        .cart
        .iter_mut()
        .find(|item| item.product.id == change.product_id)
    {
        item.quantity = change.quantity;
    } else {
        let Some(product) = state
            .products
            .iter()
            .find(|product| product.id == change.product_id)
            .cloned()
        else {
            return (StatusCode::NOT_FOUND, Json(json!({ "message": "Product not found" })))
                .into_response();
        };
        let mut item = CartItem::new(product, change.quantity);
        item.cart_id = Some(CartId::new("cart_1"));
        state.cart.push(item);
    }

    Json(json!({ "message": "Cart updated" })).into_response()
}

// ============================================================================
// Session helpers
// ============================================================================

/// Navigator that records redirects instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<(String, LogoutReason)>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn redirects(&self) -> Vec<(String, LogoutReason)> {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str, reason: LogoutReason) {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((path.to_string(), reason));
    }
}

/// Unsigned JWT-shaped token with the given `exp` (seconds since the epoch).
#[must_use]
pub fn make_token(exp: Option<i64>) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = exp.map_or_else(
        || json!({ "sub": "shopper" }),
        |exp| json!({ "sub": "shopper", "exp": exp }),
    );
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}

/// Token expiring an hour from now.
#[must_use]
pub fn fresh_token() -> String {
    make_token(Some(chrono::Utc::now().timestamp() + 3600))
}

/// Token that expired an hour ago.
#[must_use]
pub fn expired_token() -> String {
    make_token(Some(chrono::Utc::now().timestamp() - 3600))
}

/// A small catalog with two phones.
#[must_use]
pub fn catalog() -> Vec<Product> {
    vec![
        Product::new("p1", "Phone X", Price::from_rupees(29_999)),
        Product::new("p2", "Budget Phone", Price::from_rupees(7_499)),
        Product::new("p3", "Laptop Pro", Price::from_rupees(89_990)),
        Product::new("p4", "USB Charger", Price::from_rupees(1_999)),
    ]
}
