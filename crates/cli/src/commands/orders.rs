//! Order and consultation commands. All of them need a login.
//!
//! # Usage
//!
//! ```bash
//! medicart checkout --address "House 12, Road 5, Dhanmondi"
//! medicart orders
//! medicart orders 42
//! medicart consult "Can I take Napa with Disprin?" --category interactions
//! medicart consultations
//! ```

use medicart_client::api::{ApiError, ConsultationRequest, Order};
use medicart_client::{ClientError, MediCart};
use medicart_core::{ConsultationCategory, OrderId};

use super::Result;

/// Place an order for everything in the cart.
pub async fn checkout(app: &mut MediCart, address: Option<&str>) -> Result<()> {
    let confirmation = app.checkout(address).await?;
    if !confirmation.message.is_empty() {
        println!("{}", confirmation.message);
    }
    println!("Order placed successfully!");
    print_order(&confirmation.order);
    Ok(())
}

/// List the user's orders, or show one.
pub async fn orders(app: &MediCart, id: Option<&str>) -> Result<()> {
    let token = app.auth().token().ok_or(ClientError::NotLoggedIn)?;

    let Some(id) = id else {
        let orders = app.api().my_orders(token).await?;
        if orders.is_empty() {
            println!("No orders yet.");
        }
        for order in &orders {
            print_order(order);
        }
        return Ok(());
    };

    let order_id: OrderId = id
        .parse()
        .map_err(|_| ClientError::NotFound(format!("order {id}")))?;
    let order = app
        .api()
        .order(token, order_id)
        .await
        .map_err(|e| not_found_or(e, format!("order {id}")))?;
    print_order(&order);
    Ok(())
}

/// Ask the pharmacist a question.
pub async fn consult(app: &MediCart, question: &str, category: ConsultationCategory) -> Result<()> {
    let token = app.auth().token().ok_or(ClientError::NotLoggedIn)?;
    let request = ConsultationRequest {
        question: question.trim().to_string(),
        category,
    };

    let receipt = app.api().create_consultation(token, &request).await?;
    if !receipt.message.is_empty() {
        println!("{}", receipt.message);
    }
    println!(
        "Consultation #{} ({}) is {}",
        receipt.consultation.id, receipt.consultation.category, receipt.consultation.status
    );
    Ok(())
}

/// List the user's consultations with any answers.
pub async fn consultations(app: &MediCart) -> Result<()> {
    let token = app.auth().token().ok_or(ClientError::NotLoggedIn)?;
    let consultations = app.api().my_consultations(token).await?;
    if consultations.is_empty() {
        println!("No consultations yet.");
    }

    for consultation in &consultations {
        println!(
            "#{} [{}] {}",
            consultation.id, consultation.status, consultation.question
        );
        if let Some(response) = &consultation.response {
            println!("    Pharmacist: {response}");
        }
    }
    Ok(())
}

fn print_order(order: &Order) {
    let placed = order
        .created_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    println!(
        "Order #{}  {}  {} (payment {})  {placed}",
        order.id,
        order.total_amount.display(),
        order.status,
        order.payment_status
    );
    if let Some(address) = &order.shipping_address {
        println!("    Ship to: {address}");
    }
}

fn not_found_or(err: ApiError, what: String) -> ClientError {
    if err.status().is_some_and(|s| s.as_u16() == 404) {
        ClientError::NotFound(what)
    } else {
        ClientError::Api(err)
    }
}
