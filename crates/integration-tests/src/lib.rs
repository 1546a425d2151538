//! Integration tests for MediCart.
//!
//! [`MockApi`] is an in-process stand-in for the MediCart backend: it serves
//! the REST endpoints the client uses from an in-memory database on an
//! ephemeral port, so the flows in `tests/` run without any external
//! service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p medicart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - registration, login, persistence, logout
//! - `checkout_flow` - cart to order, stock and auth failures
//! - `catalog_chat` - listings, offline fallback, assistant

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use medicart_client::config::ClientConfig;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn reject(status: StatusCode, detail: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail.into() })))
}

/// A medicine row.
#[derive(Debug, Clone, Serialize)]
pub struct MedicineRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub manufacturer: String,
    pub stock: u32,
    pub requires_prescription: bool,
    pub is_featured: bool,
}

#[derive(Debug, Clone)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    password: String,
    phone: String,
    address: String,
}

impl UserRow {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "address": self.address,
            "role": "customer",
            "is_active": true
        })
    }
}

#[derive(Debug, Default)]
struct Backend {
    medicines: Vec<MedicineRow>,
    users: Vec<UserRow>,
    tokens: HashMap<String, i32>,
    orders: Vec<Value>,
    consultations: Vec<Value>,
    ai_online: bool,
}

impl Backend {
    fn seeded() -> Self {
        let row = |id, name: &str, description: &str, price, category: &str, manufacturer: &str, stock, rx, featured| MedicineRow {
            id,
            name: name.to_string(),
            description: description.to_string(),
            price,
            category: category.to_string(),
            manufacturer: manufacturer.to_string(),
            stock,
            requires_prescription: rx,
            is_featured: featured,
        };

        Self {
            medicines: vec![
                row(1, "Napa Extra", "Paracetamol and caffeine", 200.0, "tablet", "Beximco", 100, false, true),
                row(2, "Disprin", "Pain reliever tablet", 250.0, "tablet", "Square", 50, false, false),
                row(3, "Levofox", "Antibiotic medication", 500.0, "tablet", "Incepta", 30, true, true),
                row(4, "Iron Complex", "Iron supplement", 400.0, "supplement", "Drug International", 10, false, false),
                row(5, "Seclo", "Omeprazole capsule", 99.99, "capsule", "Square", 5, false, true),
            ],
            ai_online: true,
            ..Self::default()
        }
    }

    fn user_for(&self, headers: &HeaderMap) -> Result<&UserRow, (StatusCode, Json<Value>)> {
        let unauthorized = || reject(StatusCode::UNAUTHORIZED, "Could not validate credentials");
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(unauthorized)?;
        let user_id = self.tokens.get(token).ok_or_else(unauthorized)?;
        self.users
            .iter()
            .find(|u| u.id == *user_id)
            .ok_or_else(unauthorized)
    }
}

type Shared = Arc<Mutex<Backend>>;

fn lock(state: &Shared) -> MutexGuard<'_, Backend> {
    state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// In-process MediCart API.
pub struct MockApi {
    addr: SocketAddr,
    state: Shared,
}

impl MockApi {
    /// Start a server seeded with five medicines and no users.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Backend::seeded()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");

        let router = router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Mock API failed");
        });

        Self { addr, state }
    }

    /// Base URL including the `/api` prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected, which would be a bug here.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::with_api_base_url(&self.base_url()).expect("Mock API URL is valid")
    }

    /// Create an account directly, bypassing `/auth/register`.
    pub fn add_user(&self, name: &str, email: &str, password: &str, address: &str) {
        let mut backend = lock(&self.state);
        let id = i32::try_from(backend.users.len()).unwrap_or(i32::MAX - 1) + 1;
        backend.users.push(UserRow {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: String::new(),
            address: address.to_string(),
        });
    }

    /// Make `/ai/chat` answer or fail.
    pub fn set_ai_online(&self, online: bool) {
        lock(&self.state).ai_online = online;
    }

    /// Invalidate every issued token.
    pub fn revoke_tokens(&self) {
        lock(&self.state).tokens.clear();
    }

    /// Remaining stock of a medicine.
    #[must_use]
    pub fn stock(&self, medicine_id: i32) -> Option<u32> {
        lock(&self.state)
            .medicines
            .iter()
            .find(|m| m.id == medicine_id)
            .map(|m| m.stock)
    }

    /// Orders created so far, as returned to clients.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        lock(&self.state).orders.clone()
    }
}

/// A config whose API port has nothing listening on it.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn unreachable_config() -> ClientConfig {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Probe listener has no address");
    drop(listener);
    ClientConfig::with_api_base_url(&format!("http://{addr}/api")).expect("Probe URL is valid")
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/medicines", get(list_medicines))
        .route("/api/medicines/featured", get(featured_medicines))
        .route("/api/medicines/{id}", get(get_medicine))
        .route("/api/orders", post(create_order))
        .route("/api/orders/my-orders", get(my_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/consultations", post(create_consultation))
        .route("/api/consultations/my-consultations", get(my_consultations))
        .route("/api/ai/chat", post(chat))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "MediCart API", "version": "1.0.0"}))
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> ApiResult {
    let mut backend = lock(&state);
    if backend.users.iter().any(|u| u.email == body.email) {
        return Err(reject(StatusCode::BAD_REQUEST, "Email already registered"));
    }

    let id = i32::try_from(backend.users.len()).unwrap_or(i32::MAX - 1) + 1;
    let user = UserRow {
        id,
        name: body.name,
        email: body.email,
        password: body.password,
        phone: body.phone,
        address: body.address,
    };
    let response = json!({"message": "User created successfully", "user": user.to_json()});
    backend.users.push(user);
    Ok(Json(response))
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> ApiResult {
    let mut backend = lock(&state);
    let user = backend
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
        .cloned()
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Incorrect email or password"))?;

    let token = format!("token-{}-{}", user.id, backend.tokens.len() + 1);
    backend.tokens.insert(token.clone(), user.id);
    Ok(Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user": user.to_json()
    })))
}

#[derive(Deserialize)]
struct MedicineFilter {
    #[serde(default)]
    skip: usize,
    limit: Option<usize>,
    category: Option<String>,
    search: Option<String>,
}

async fn list_medicines(State(state): State<Shared>, Query(filter): Query<MedicineFilter>) -> Json<Value> {
    let backend = lock(&state);
    let search = filter.search.map(|s| s.to_lowercase());
    let rows: Vec<&MedicineRow> = backend
        .medicines
        .iter()
        .filter(|m| filter.category.as_ref().is_none_or(|c| &m.category == c))
        .filter(|m| search.as_ref().is_none_or(|s| m.name.to_lowercase().contains(s)))
        .skip(filter.skip)
        .take(filter.limit.unwrap_or(100))
        .collect();
    Json(json!(rows))
}

async fn featured_medicines(State(state): State<Shared>) -> Json<Value> {
    let backend = lock(&state);
    let rows: Vec<&MedicineRow> = backend
        .medicines
        .iter()
        .filter(|m| m.is_featured)
        .take(10)
        .collect();
    Json(json!(rows))
}

async fn get_medicine(State(state): State<Shared>, Path(id): Path<i32>) -> ApiResult {
    let backend = lock(&state);
    backend
        .medicines
        .iter()
        .find(|m| m.id == id)
        .map(|m| Json(json!(m)))
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Medicine not found"))
}

#[derive(Deserialize)]
struct OrderLineBody {
    medicine_id: i32,
    quantity: u32,
}

#[derive(Deserialize)]
struct OrderBody {
    items: Vec<OrderLineBody>,
    shipping_address: Option<String>,
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<OrderBody>,
) -> ApiResult {
    let mut backend = lock(&state);
    let user_id = backend.user_for(&headers)?.id;

    // Validate every line before touching stock.
    let mut total = 0.0;
    for line in &body.items {
        let medicine = backend
            .medicines
            .iter()
            .find(|m| m.id == line.medicine_id)
            .ok_or_else(|| {
                reject(
                    StatusCode::NOT_FOUND,
                    format!("Medicine {} not found", line.medicine_id),
                )
            })?;
        if medicine.stock < line.quantity {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                format!(
                    "Insufficient stock for {}. Available: {}",
                    medicine.name, medicine.stock
                ),
            ));
        }
        total += medicine.price * f64::from(line.quantity);
    }

    for line in &body.items {
        if let Some(medicine) = backend.medicines.iter_mut().find(|m| m.id == line.medicine_id) {
            medicine.stock -= line.quantity;
        }
    }

    let order = json!({
        "id": backend.orders.len() + 1,
        "user_id": user_id,
        "total_amount": (total * 100.0).round() / 100.0,
        "status": "pending",
        "payment_status": "pending",
        "shipping_address": body.shipping_address,
        "created_at": "2024-05-01T09:30:00.000000"
    });
    backend.orders.push(order.clone());

    Ok(Json(json!({"message": "Order created successfully", "order": order})))
}

async fn my_orders(State(state): State<Shared>, headers: HeaderMap) -> ApiResult {
    let backend = lock(&state);
    let user_id = backend.user_for(&headers)?.id;
    let orders: Vec<&Value> = backend
        .orders
        .iter()
        .filter(|o| o["user_id"] == user_id)
        .collect();
    Ok(Json(json!(orders)))
}

async fn get_order(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i32>) -> ApiResult {
    let backend = lock(&state);
    let user_id = backend.user_for(&headers)?.id;
    let order = backend
        .orders
        .iter()
        .find(|o| o["id"] == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Order not found"))?;
    if order["user_id"] != user_id {
        return Err(reject(StatusCode::FORBIDDEN, "Access denied"));
    }
    Ok(Json(order.clone()))
}

#[derive(Deserialize)]
struct ConsultationBody {
    question: String,
    #[serde(default)]
    category: Option<String>,
}

async fn create_consultation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ConsultationBody>,
) -> ApiResult {
    let mut backend = lock(&state);
    let user_id = backend.user_for(&headers)?.id;
    let consultation = json!({
        "id": backend.consultations.len() + 1,
        "user_id": user_id,
        "question": body.question,
        "response": null,
        "status": "pending",
        "category": body.category.unwrap_or_else(|| "general".to_string()),
        "created_at": "2024-05-01T09:30:00Z"
    });
    backend.consultations.push(consultation.clone());
    Ok(Json(json!({
        "message": "Consultation request submitted successfully",
        "consultation": consultation
    })))
}

async fn my_consultations(State(state): State<Shared>, headers: HeaderMap) -> ApiResult {
    let backend = lock(&state);
    let user_id = backend.user_for(&headers)?.id;
    let consultations: Vec<&Value> = backend
        .consultations
        .iter()
        .filter(|c| c["user_id"] == user_id)
        .collect();
    Ok(Json(json!(consultations)))
}

async fn chat(State(state): State<Shared>, Json(body): Json<Value>) -> ApiResult {
    let message = body["message"].as_str().unwrap_or_default();
    if message.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "Message is required"));
    }
    if !lock(&state).ai_online {
        return Err(reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI service error: model unavailable",
        ));
    }

    let page = body["context"]["currentPage"].as_str().unwrap_or("unknown");
    Ok(Json(json!({
        "response": format!("[{page}] Our pharmacist team can help with: {message}"),
        "timestamp": "2024-01-01T00:00:00Z"
    })))
}
