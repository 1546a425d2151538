//! MediCart REST API client.
//!
//! Thin wrapper over `reqwest` with JSON bodies and an optional bearer token.
//! Every call is a single attempt: no retries, no backoff, and no client-side
//! timeout. Failures come back as [`ApiError`] so the caller can choose its
//! own fallback.
//!
//! # Example
//!
//! ```rust,ignore
//! use medicart_client::api::{ApiClient, MedicineQuery};
//!
//! let api = ApiClient::new(&config);
//! let featured = api.featured_medicines().await?;
//! let found = api.medicines(&MedicineQuery::search("napa")).await?;
//! ```

mod error;
pub mod types;

pub use error::{ApiError, ErrorBody, detail_message};
pub use types::*;

use std::sync::Arc;

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;

use medicart_core::{MedicineId, OrderId};

use crate::config::ClientConfig;

const USER_AGENT: &str = concat!("medicart-client/", env!("CARGO_PKG_VERSION"));

/// Client for the MediCart API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    config: ClientConfig,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.api_base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialised.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                config: config.clone(),
            }),
        }
    }

    /// Base URL all paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.inner.config.api_base_url.as_str()
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.inner.client.get(self.inner.config.endpoint(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.inner.client.post(self.inner.config.endpoint(path))
    }

    /// Send a request and decode a JSON success body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = detail_message(&body);
            tracing::debug!(
                status = %status,
                detail = message.as_deref().unwrap_or(""),
                "API rejected request"
            );
            return Err(ApiError::Rejected { status, message });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Decode(e.to_string())
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a user record and bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` for wrong credentials.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        self.send(self.post("/auth/login").json(&body)).await
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the server refuses the registration
    /// (e.g. the email is taken).
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<serde_json::Value, ApiError> {
        self.send(self.post("/auth/register").json(registration)).await
    }

    // =========================================================================
    // Medicines
    // =========================================================================

    /// List medicines matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a medicine list.
    #[instrument(skip(self))]
    pub async fn medicines(&self, query: &MedicineQuery) -> Result<Vec<Medicine>, ApiError> {
        self.send(self.get("/medicines").query(query)).await
    }

    /// List featured medicines.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a medicine list.
    #[instrument(skip(self))]
    pub async fn featured_medicines(&self) -> Result<Vec<Medicine>, ApiError> {
        self.send(self.get("/medicines/featured")).await
    }

    /// Fetch one medicine.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with status 404 if the medicine does not exist.
    #[instrument(skip(self))]
    pub async fn medicine(&self, id: MedicineId) -> Result<Medicine, ApiError> {
        self.send(self.get(&format!("/medicines/{id}"))).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order on behalf of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the token is rejected, a medicine is
    /// unknown, or stock is insufficient.
    #[instrument(skip(self, token, order), fields(lines = order.items.len()))]
    pub async fn create_order(
        &self,
        token: &SecretString,
        order: &OrderRequest,
    ) -> Result<OrderConfirmation, ApiError> {
        let request = self.post("/orders").bearer_auth(token.expose_secret()).json(order);
        self.send(request).await
    }

    /// Orders placed by the token's owner.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        self.send(self.get("/orders/my-orders").bearer_auth(token.expose_secret()))
            .await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with 404 for unknown orders and 403 for
    /// orders belonging to someone else.
    #[instrument(skip(self, token))]
    pub async fn order(&self, token: &SecretString, id: OrderId) -> Result<Order, ApiError> {
        self.send(self.get(&format!("/orders/{id}")).bearer_auth(token.expose_secret()))
            .await
    }

    // =========================================================================
    // Consultations
    // =========================================================================

    /// Ask the pharmacist a question.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the token is rejected.
    #[instrument(skip(self, token, request), fields(category = %request.category))]
    pub async fn create_consultation(
        &self,
        token: &SecretString,
        request: &ConsultationRequest,
    ) -> Result<ConsultationReceipt, ApiError> {
        let request = self
            .post("/consultations")
            .bearer_auth(token.expose_secret())
            .json(request);
        self.send(request).await
    }

    /// Consultations opened by the token's owner.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn my_consultations(&self, token: &SecretString) -> Result<Vec<Consultation>, ApiError> {
        let request = self
            .get("/consultations/my-consultations")
            .bearer_auth(token.expose_secret());
        self.send(request).await
    }

    // =========================================================================
    // Assistant & health
    // =========================================================================

    /// Ask the remote assistant.
    ///
    /// # Errors
    ///
    /// Returns an error if the assistant is unreachable or answers with an
    /// error status.
    #[instrument(skip(self, message, context), fields(chars = message.len()))]
    pub async fn chat(&self, message: &str, context: &ChatContext) -> Result<ChatReply, ApiError> {
        let body = ChatRequest { message, context };
        self.send(self.post("/ai/chat").json(&body)).await
    }

    /// API liveness check.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or unhealthy.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.send(self.get("/health")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use super::*;
    use crate::testing::{serve, unreachable_config};

    #[test]
    fn test_api_client_is_clone_send_sync() {
        fn assert_traits<T: Clone + Send + Sync>() {}
        assert_traits::<ApiClient>();
    }

    #[tokio::test]
    async fn test_login_success_decodes_user_and_token() {
        let router = Router::new().route(
            "/api/auth/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "a@example.com");
                assert_eq!(body["password"], "pw");
                Json(json!({
                    "user": {"id": 1, "name": "A", "email": "a@example.com"},
                    "token": "tok-1"
                }))
            }),
        );
        let api = ApiClient::new(&serve(router).await);

        let response = api
            .login("a@example.com", &SecretString::from("pw"))
            .await
            .unwrap();
        assert_eq!(response.user.name, "A");
        assert_eq!(response.token.expose_secret(), "tok-1");
    }

    #[tokio::test]
    async fn test_rejection_carries_detail() {
        let router = Router::new().route(
            "/api/auth/login",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Incorrect email or password"})),
                )
            }),
        );
        let api = ApiClient::new(&serve(router).await);

        let err = api
            .login("a@example.com", &SecretString::from("bad"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
        assert_eq!(err.server_message(), Some("Incorrect email or password"));
    }

    #[tokio::test]
    async fn test_success_with_unexpected_body_is_decode_error() {
        let router = Router::new().route("/api/medicines/featured", get(|| async { "not json" }));
        let api = ApiClient::new(&serve(router).await);

        let err = api.featured_medicines().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let api = ApiClient::new(&unreachable_config().await);
        let err = api.health().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!err.is_rejected());
    }

    #[tokio::test]
    async fn test_medicine_query_parameters() {
        let router = Router::new().route(
            "/api/medicines",
            get(|Query(params): Query<std::collections::HashMap<String, String>>| async move {
                assert_eq!(params.get("search").map(String::as_str), Some("napa"));
                assert!(!params.contains_key("category"));
                Json(json!([{"id": 1, "name": "Napa", "price": 200.0}]))
            }),
        );
        let api = ApiClient::new(&serve(router).await);

        let medicines = api.medicines(&MedicineQuery::search("napa")).await.unwrap();
        assert_eq!(medicines.len(), 1);
        assert_eq!(medicines[0].name, "Napa");
    }

    #[tokio::test]
    async fn test_order_sends_bearer_token() {
        let router = Router::new().route(
            "/api/orders",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer tok-9")
                );
                assert_eq!(body["items"][0]["medicine_id"], 2);
                assert_eq!(body["items"][0]["quantity"], 3);
                Json(json!({
                    "message": "Order created successfully",
                    "order": {"id": 11, "total_amount": 750.0, "status": "pending"}
                }))
            }),
        );
        let api = ApiClient::new(&serve(router).await);

        let confirmation = api
            .create_order(
                &SecretString::from("tok-9"),
                &OrderRequest {
                    items: vec![OrderLine {
                        medicine_id: MedicineId::new(2),
                        quantity: 3,
                    }],
                    shipping_address: "Dhaka".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(confirmation.order.id, OrderId::new(11));
        assert_eq!(confirmation.message, "Order created successfully");
    }
}
