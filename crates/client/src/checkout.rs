//! Turning the cart into an order.

use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiClient, ApiError, OrderConfirmation, OrderLine, OrderRequest};
use crate::auth::AuthSession;
use crate::cart::Cart;
use crate::error::add_breadcrumb;

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please login to checkout")]
    NotLoggedIn,

    #[error("Cart is empty")]
    EmptyCart,

    /// No address was given and the profile has none.
    #[error("Shipping address is required")]
    MissingAddress,

    #[error("Failed to place order: {0}")]
    Api(#[from] ApiError),
}

/// Submit the cart as an order for the logged-in user.
///
/// `shipping_address` defaults to the address on the user's profile. On
/// success the cart is cleared; on any failure it is left as it was.
///
/// # Errors
///
/// Returns `CheckoutError` if there is no session, the cart is empty, no
/// address is known, or the API refuses the order.
#[instrument(skip_all, fields(lines = cart.items().len()))]
pub async fn place_order(
    cart: &mut Cart,
    auth: &AuthSession,
    api: &ApiClient,
    shipping_address: Option<&str>,
) -> Result<OrderConfirmation, CheckoutError> {
    let session = auth.session().ok_or(CheckoutError::NotLoggedIn)?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let shipping_address = shipping_address
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .or_else(|| session.user.address.as_deref().map(str::trim))
        .filter(|a| !a.is_empty())
        .ok_or(CheckoutError::MissingAddress)?
        .to_string();

    let request = OrderRequest {
        items: cart
            .items()
            .iter()
            .map(|item| OrderLine {
                medicine_id: item.id,
                quantity: item.quantity,
            })
            .collect(),
        shipping_address,
    };

    let confirmation = api.create_order(&session.token, &request).await?;

    let order_id = confirmation.order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", &order_id)]));
    tracing::info!(order_id = %order_id, total = %confirmation.order.total_amount, "Order placed");

    cart.clear_cart();
    Ok(confirmation)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::post};
    use secrecy::SecretString;
    use serde_json::{Value, json};

    use medicart_core::{MedicineId, Price};

    use super::*;
    use crate::api::Medicine;
    use crate::store::{PersistentStore, keys};
    use crate::testing::serve;

    fn router() -> Router {
        Router::new()
            .route(
                "/api/auth/login",
                post(|| async {
                    Json(json!({
                        "user": {"id": 1, "name": "Rahim", "email": "rahim@example.com", "address": "Mirpur, Dhaka"},
                        "token": "tok"
                    }))
                }),
            )
            .route(
                "/api/orders",
                post(|Json(body): Json<Value>| async move {
                    if body["items"][0]["quantity"].as_u64() > Some(10) {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"detail": "Insufficient stock for Napa"})),
                        );
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Order created successfully",
                            "order": {
                                "id": 42,
                                "total_amount": 400.0,
                                "status": "pending",
                                "shipping_address": body["shipping_address"]
                            }
                        })),
                    )
                }),
            )
    }

    fn napa() -> Medicine {
        Medicine {
            id: MedicineId::new(1),
            name: "Napa".to_string(),
            price: Price::from_cents(20_000),
            manufacturer: None,
            description: None,
            category: None,
            stock: None,
            requires_prescription: false,
            image_url: None,
            is_featured: false,
        }
    }

    async fn logged_in(store: &PersistentStore, api: &ApiClient) -> AuthSession {
        let mut auth = AuthSession::load(store.clone(), api.clone());
        auth.login("rahim@example.com", &SecretString::from("pw")).await;
        auth
    }

    #[tokio::test]
    async fn test_anonymous_checkout_keeps_cart() {
        let config = serve(router()).await;
        let api = ApiClient::new(&config);
        let store = PersistentStore::in_memory();
        let auth = AuthSession::load(store.clone(), api.clone());
        let mut cart = Cart::load(store);
        cart.add_to_cart(&napa());

        let err = place_order(&mut cart, &auth, &api, Some("Dhaka")).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotLoggedIn));
        assert_eq!(cart.item_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_is_refused() {
        let api = ApiClient::new(&serve(router()).await);
        let store = PersistentStore::in_memory();
        let auth = logged_in(&store, &api).await;
        let mut cart = Cart::load(store);

        let err = place_order(&mut cart, &auth, &api, None).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[tokio::test]
    async fn test_success_clears_persisted_cart() {
        let api = ApiClient::new(&serve(router()).await);
        let store = PersistentStore::in_memory();
        let auth = logged_in(&store, &api).await;
        let mut cart = Cart::load(store.clone());
        cart.add_to_cart(&napa());
        cart.add_to_cart(&napa());

        let confirmation = place_order(&mut cart, &auth, &api, None).await.unwrap();
        assert_eq!(confirmation.order.id.as_i32(), 42);
        assert_eq!(
            confirmation.order.shipping_address.as_deref(),
            Some("Mirpur, Dhaka")
        );
        assert!(cart.is_empty());
        assert_eq!(store.get_raw(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_rejected_order_keeps_cart() {
        let api = ApiClient::new(&serve(router()).await);
        let store = PersistentStore::in_memory();
        let auth = logged_in(&store, &api).await;
        let mut cart = Cart::load(store);
        cart.add_to_cart(&napa());
        cart.update_quantity(MedicineId::new(1), 11);

        let err = place_order(&mut cart, &auth, &api, Some("Dhaka")).await.unwrap_err();
        match err {
            CheckoutError::Api(api_err) => {
                assert_eq!(api_err.server_message(), Some("Insufficient stock for Napa"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(cart.item_count(), 11);
    }
}
