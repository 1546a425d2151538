//! Cart to order against the mock API.

use secrecy::SecretString;

use medicart_client::MediCart;
use medicart_client::cart::CartEvent;
use medicart_client::checkout::CheckoutError;
use medicart_client::store::{PersistentStore, keys};
use medicart_client::view::CartView;
use medicart_core::{MedicineId, OrderId, OrderStatus, Price};
use medicart_integration_tests::MockApi;

async fn logged_in_app(api: &MockApi) -> (MediCart, PersistentStore) {
    api.add_user("Nusrat", "nusrat@example.com", "pw", "Dhanmondi, Dhaka");
    let store = PersistentStore::in_memory();
    let mut app = MediCart::with_store(api.config(), store.clone());
    let outcome = app
        .auth_mut()
        .login("nusrat@example.com", &SecretString::from("pw"))
        .await;
    assert!(outcome.is_success(), "{}", outcome.message());
    (app, store)
}

async fn add(app: &mut MediCart, id: i32) {
    let medicine = app
        .catalog()
        .medicine(MedicineId::new(id))
        .await
        .expect("medicine exists");
    app.cart_mut().add_to_cart(&medicine);
}

#[tokio::test]
async fn test_full_checkout() {
    let api = MockApi::start().await;
    let (mut app, store) = logged_in_app(&api).await;

    add(&mut app, 1).await;
    add(&mut app, 1).await;
    add(&mut app, 5).await;

    let view = CartView::from(app.cart());
    assert_eq!(view.items.len(), 2);
    assert_eq!(view.item_count, 3);
    assert_eq!(view.subtotal, "$499.99");

    let mut events = app.cart().subscribe();
    let confirmation = app.checkout(None).await.expect("order placed");

    assert_eq!(confirmation.message, "Order created successfully");
    assert_eq!(confirmation.order.total_amount, Price::from_cents(49_999));
    assert_eq!(confirmation.order.status, OrderStatus::Pending);
    assert_eq!(
        confirmation.order.shipping_address.as_deref(),
        Some("Dhanmondi, Dhaka")
    );
    assert!(confirmation.order.created_at.is_some());

    // Cart cleared in memory, in the store, and subscribers told.
    assert!(app.cart().is_empty());
    assert_eq!(store.get_raw(keys::CART).expect("store readable").as_deref(), Some("[]"));
    assert_eq!(events.recv().await.expect("event"), CartEvent::Cleared);

    // Stock moved on the server.
    assert_eq!(api.stock(1), Some(98));
    assert_eq!(api.stock(5), Some(4));

    // Order history.
    let token = app.auth().token().expect("logged in");
    let orders = app.api().my_orders(token).await.expect("orders listed");
    assert_eq!(orders.len(), 1);
    let order = app
        .api()
        .order(token, confirmation.order.id)
        .await
        .expect("order fetched");
    assert_eq!(order, orders[0]);
}

#[tokio::test]
async fn test_explicit_address_wins() {
    let api = MockApi::start().await;
    let (mut app, _) = logged_in_app(&api).await;
    add(&mut app, 2).await;

    let confirmation = app
        .checkout(Some("  Gulshan 2, Dhaka "))
        .await
        .expect("order placed");
    assert_eq!(
        confirmation.order.shipping_address.as_deref(),
        Some("Gulshan 2, Dhaka")
    );
    assert_eq!(api.orders()[0]["shipping_address"], "Gulshan 2, Dhaka");
}

#[tokio::test]
async fn test_insufficient_stock_keeps_cart() {
    let api = MockApi::start().await;
    let (mut app, _) = logged_in_app(&api).await;
    add(&mut app, 4).await;
    app.cart_mut().update_quantity(MedicineId::new(4), 11);

    let err = app.checkout(None).await.expect_err("not enough stock");
    let api_err = match err {
        CheckoutError::Api(api_err) => api_err,
        other => panic!("expected an API error, got {other}"),
    };
    assert_eq!(
        api_err.server_message(),
        Some("Insufficient stock for Iron Complex. Available: 10")
    );

    assert_eq!(app.cart().item_count(), 11);
    assert_eq!(api.stock(4), Some(10));
    assert!(api.orders().is_empty());
}

#[tokio::test]
async fn test_anonymous_checkout_is_refused() {
    let api = MockApi::start().await;
    let mut app = MediCart::with_store(api.config(), PersistentStore::in_memory());
    add(&mut app, 1).await;

    let err = app.checkout(Some("Dhaka")).await.expect_err("needs login");
    assert!(matches!(err, CheckoutError::NotLoggedIn));
    assert_eq!(app.cart().item_count(), 1);
    assert!(api.orders().is_empty());
}

#[tokio::test]
async fn test_other_users_orders_are_forbidden() {
    let api = MockApi::start().await;
    let (mut first, _) = logged_in_app(&api).await;
    add(&mut first, 1).await;
    let confirmation = first.checkout(None).await.expect("order placed");

    api.add_user("Tanvir", "tanvir@example.com", "pw2", "Sylhet");
    let mut second = MediCart::with_store(api.config(), PersistentStore::in_memory());
    second
        .auth_mut()
        .login("tanvir@example.com", &SecretString::from("pw2"))
        .await;
    let token = second.auth().token().expect("logged in");

    let err = second
        .api()
        .order(token, confirmation.order.id)
        .await
        .expect_err("not theirs");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));

    let err = second
        .api()
        .order(token, OrderId::new(999))
        .await
        .expect_err("no such order");
    assert_eq!(err.server_message(), Some("Order not found"));

    assert!(second.api().my_orders(token).await.expect("listed").is_empty());
}

#[tokio::test]
async fn test_consultation_round_trip() {
    let api = MockApi::start().await;
    let (app, _) = logged_in_app(&api).await;
    let token = app.auth().token().expect("logged in");

    let receipt = app
        .api()
        .create_consultation(
            token,
            &medicart_client::api::ConsultationRequest {
                question: "Can I take Seclo with Napa?".to_string(),
                category: "interactions".parse().expect("infallible"),
            },
        )
        .await
        .expect("consultation created");
    assert_eq!(receipt.message, "Consultation request submitted successfully");
    assert_eq!(receipt.consultation.category.as_str(), "interactions");

    let consultations = app.api().my_consultations(token).await.expect("listed");
    assert_eq!(consultations.len(), 1);
    assert_eq!(consultations[0].response, None);
}
