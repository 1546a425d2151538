//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! medicart cart                # show
//! medicart cart add 3
//! medicart cart update 3 2     # 0 or less removes the line
//! medicart cart remove 3
//! medicart cart clear
//! ```
//!
//! Ids that are not numbers refer to nothing: `update` and `remove` leave
//! the cart alone.

use medicart_client::api::{ApiError, Medicine};
use medicart_client::catalog::sample_medicines;
use medicart_client::view::CartView;
use medicart_client::{ClientError, MediCart};
use medicart_core::MedicineId;

use super::Result;

/// Print the cart.
pub fn show(app: &MediCart) {
    let view = CartView::from(app.cart());
    if view.items.is_empty() {
        println!("Your cart is empty");
        println!("Total: {}", view.subtotal);
        return;
    }

    for item in &view.items {
        println!(
            "{:>5}  {:<28} {:>10} x {:<3} {:>10}",
            item.id.as_i32(),
            item.name,
            item.price,
            item.quantity,
            item.line_price
        );
        if let Some(manufacturer) = &item.manufacturer {
            println!("       {manufacturer}");
        }
    }
    println!("{} Items", view.item_count);
    println!("Total: {}", view.subtotal);
}

/// Add one unit of a medicine.
///
/// When the API is unreachable, the sample products can still be added.
pub async fn add(app: &mut MediCart, id: &str) -> Result<()> {
    let id: MedicineId = id
        .parse()
        .map_err(|_| ClientError::NotFound(format!("medicine {id}")))?;

    let medicine = lookup(app, id).await?;
    app.cart_mut().add_to_cart(&medicine);
    println!("Product added to cart!");
    show(app);
    Ok(())
}

async fn lookup(app: &MediCart, id: MedicineId) -> Result<Medicine> {
    match app.catalog().medicine(id).await {
        Ok(medicine) => Ok(medicine),
        Err(ApiError::Rejected { status, .. }) if status.as_u16() == 404 => {
            Err(ClientError::NotFound(format!("medicine {id}")).into())
        }
        Err(e @ ApiError::Rejected { .. }) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Catalog unreachable, looking in sample products");
            sample_medicines()
                .into_iter()
                .find(|m| m.id == id)
                .ok_or_else(|| ClientError::Api(e).into())
        }
    }
}

/// Set a line's quantity.
pub fn update(app: &mut MediCart, id: &str, quantity: i64) {
    match id.parse::<MedicineId>() {
        Ok(id) => app.cart_mut().update_quantity(id, quantity),
        Err(e) => tracing::debug!(error = %e, "Ignoring update for unknown id"),
    }
    show(app);
}

/// Remove a line.
pub fn remove(app: &mut MediCart, id: &str) {
    match id.parse::<MedicineId>() {
        Ok(id) => {
            app.cart_mut().remove_from_cart(id);
            println!("Product removed from cart!");
        }
        Err(e) => tracing::debug!(error = %e, "Ignoring removal of unknown id"),
    }
    show(app);
}

/// Empty the cart.
pub fn clear(app: &mut MediCart) {
    app.cart_mut().clear_cart();
    println!("Cart cleared!");
}
