//! Display data for front-ends.
//!
//! Prices are preformatted; everything else is plain data. Nothing here is
//! markup, so escaping is up to whoever renders it.

use medicart_core::{MedicineId, Price};

use crate::api::Medicine;
use crate::cart::{Cart, CartItem};

/// Cart item display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: MedicineId,
    pub name: String,
    pub manufacturer: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
    /// Checkout is offered only for a non-empty cart.
    pub checkout_enabled: bool,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: Price::ZERO.display(),
            item_count: 0,
            checkout_enabled: false,
        }
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            manufacturer: item.manufacturer.clone(),
            quantity: item.quantity,
            price: item.price.display(),
            line_price: item.line_total().display(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.total().display(),
            item_count: cart.item_count(),
            checkout_enabled: !cart.is_empty(),
        }
    }
}

/// Product display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub id: MedicineId,
    pub name: String,
    pub price: String,
    pub manufacturer: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub requires_prescription: bool,
    /// `None` when the API did not report stock.
    pub in_stock: Option<bool>,
}

impl From<&Medicine> for ProductView {
    fn from(medicine: &Medicine) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name.clone(),
            price: medicine.price.display(),
            manufacturer: medicine.manufacturer.clone().unwrap_or_default(),
            description: medicine.description.clone(),
            category: medicine.category.clone(),
            requires_prescription: medicine.requires_prescription,
            in_stock: medicine.stock.map(|s| s > 0),
        }
    }
}
