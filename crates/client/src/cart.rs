//! Shopping cart kept in the local store.
//!
//! The cart is an ordered list of line items, at most one per medicine, each
//! with a quantity of at least one. Every mutation rewrites the whole list
//! under [`keys::CART`] and then publishes a [`CartEvent`].
//!
//! Mutators never fail. If the store cannot be written the error is logged
//! and the in-memory cart stays authoritative for the rest of the process.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use medicart_core::{MedicineId, Price};

use crate::api::Medicine;
use crate::error::add_breadcrumb;
use crate::store::{PersistentStore, keys};

const EVENT_CAPACITY: usize = 64;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: MedicineId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Published after the cart changed and was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A product was added, or its quantity bumped by one.
    Added { id: MedicineId, quantity: u32 },
    /// A line's quantity was set.
    QuantityChanged { id: MedicineId, quantity: u32 },
    /// A line was removed.
    Removed { id: MedicineId },
    /// All lines were removed.
    Cleared,
}

/// The shopping cart.
#[derive(Debug)]
pub struct Cart {
    items: Vec<CartItem>,
    store: PersistentStore,
    events: broadcast::Sender<CartEvent>,
}

impl Cart {
    /// Load the cart saved in `store`.
    ///
    /// Missing or unreadable data yields an empty cart. Saved lines that
    /// break the cart's invariants are repaired: zero quantities are dropped
    /// and duplicate ids are merged into the first occurrence.
    #[must_use]
    pub fn load(store: PersistentStore) -> Self {
        let items = match store.get_json::<Vec<CartItem>>(keys::CART) {
            Ok(items) => normalize(items.unwrap_or_default()),
            Err(e) => {
                tracing::warn!(error = %e, "Saved cart is unreadable, starting empty");
                Vec::new()
            }
        };

        tracing::debug!(lines = items.len(), "Loaded cart");

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            items,
            store,
            events,
        }
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Add one unit of `medicine`.
    pub fn add_to_cart(&mut self, medicine: &Medicine) {
        let quantity = if let Some(item) = self.items.iter_mut().find(|i| i.id == medicine.id) {
            item.quantity = item.quantity.saturating_add(1);
            item.quantity
        } else {
            self.items.push(CartItem {
                id: medicine.id,
                name: medicine.name.clone(),
                price: medicine.price,
                quantity: 1,
                manufacturer: medicine.manufacturer.clone(),
                description: medicine.description.clone(),
            });
            1
        };

        let id = medicine.id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("medicine_id", &id)]));
        self.commit(CartEvent::Added {
            id: medicine.id,
            quantity,
        });
    }

    /// Set the quantity of the line for `id`.
    ///
    /// A quantity below one removes the line. Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: MedicineId, new_quantity: i64) {
        if new_quantity < 1 {
            self.remove_from_cart(id);
            return;
        }

        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            tracing::debug!(%id, "Quantity update for item not in cart");
            return;
        };
        item.quantity = quantity;

        self.commit(CartEvent::QuantityChanged { id, quantity });
    }

    /// Remove the line for `id`, if any.
    pub fn remove_from_cart(&mut self, id: MedicineId) {
        self.items.retain(|i| i.id != id);

        let id_str = id.to_string();
        add_breadcrumb("cart", "Removed from cart", Some(&[("medicine_id", &id_str)]));
        self.commit(CartEvent::Removed { id });
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        self.items.clear();

        add_breadcrumb("cart", "Cleared cart", None);
        self.commit(CartEvent::Cleared);
    }

    /// Exact sum of price times quantity.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Line for `id`.
    #[must_use]
    pub fn get(&self, id: MedicineId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: MedicineId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn commit(&self, event: CartEvent) {
        if let Err(e) = self.store.set_json(keys::CART, &self.items) {
            tracing::error!(error = %e, "Failed to persist cart");
        }
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn normalize(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items.into_iter().filter(|i| i.quantity > 0) {
        if let Some(existing) = merged.iter_mut().find(|m| m.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            merged.push(item);
        }
    }
    merged
}
