//! Request and response bodies for the MediCart API.

use chrono::{DateTime, NaiveDateTime};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use medicart_core::{
    ConsultationCategory, ConsultationId, ConsultationStatus, Email, MedicineId, OrderId,
    OrderStatus, PaymentStatus, Price, UserId, UserRole,
};

// =============================================================================
// Auth
// =============================================================================

/// A user record as returned by the API.
///
/// Fields the client does not model are kept in `extra` so the record can be
/// persisted and read back without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Login request body.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login response.
#[derive(Deserialize)]
pub struct LoginResponse {
    /// The authenticated user.
    pub user: User,
    /// Bearer token for subsequent requests.
    #[serde(alias = "access_token", deserialize_with = "secret")]
    pub token: SecretString,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// New account details for `POST /auth/register`.
#[derive(Serialize)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub phone: String,
    pub address: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .field("address", &self.address)
            .finish()
    }
}

// =============================================================================
// Medicines
// =============================================================================

/// A medicine in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: MedicineId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub requires_prescription: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Filters for `GET /medicines`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct MedicineQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl MedicineQuery {
    /// Name search.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One line of an order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub medicine_id: MedicineId,
    pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub shipping_address: String,
}

/// An order as stored by the server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub total_amount: Price,
    #[serde(default = "pending_order")]
    pub status: OrderStatus,
    #[serde(default = "pending_payment")]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

/// Response of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderConfirmation {
    #[serde(default)]
    pub message: String,
    pub order: Order,
}

const fn pending_order() -> OrderStatus {
    OrderStatus::Pending
}

const fn pending_payment() -> PaymentStatus {
    PaymentStatus::Pending
}

// =============================================================================
// Consultations
// =============================================================================

/// Body of `POST /consultations`.
#[derive(Debug, Clone, Serialize)]
pub struct ConsultationRequest {
    pub question: String,
    pub category: ConsultationCategory,
}

/// A question put to the pharmacist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Consultation {
    pub id: ConsultationId,
    pub question: String,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default = "pending_consultation")]
    pub status: ConsultationStatus,
    #[serde(default)]
    pub category: ConsultationCategory,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

/// Response of `POST /consultations`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsultationReceipt {
    #[serde(default)]
    pub message: String,
    pub consultation: Consultation,
}

const fn pending_consultation() -> ConsultationStatus {
    ConsultationStatus::Pending
}

// =============================================================================
// Assistant & health
// =============================================================================

/// Page context sent along with chat messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatContext {
    pub website: String,
    pub services: Vec<String>,
    #[serde(rename = "currentPage")]
    pub current_page: String,
}

/// Body of `POST /ai/chat`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    pub context: &'a ChatContext,
}

/// Response of `POST /ai/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

// =============================================================================
// Serde helpers
// =============================================================================

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

/// Accept naive (`2024-01-01T10:00:00`) and offset (`...Z`) timestamps;
/// anything else becomes `None` rather than failing the whole record.
fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.naive_utc())
            .or_else(|_| s.parse::<NaiveDateTime>())
            .ok()
    }))
}
