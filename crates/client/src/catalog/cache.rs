//! Cache types for catalog responses.

use medicart_core::MedicineId;

use crate::api::{Medicine, MedicineQuery};

/// Cache key for medicine listings and single medicines.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Featured,
    Medicines(MedicineQuery),
    Medicine(MedicineId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Medicines(Vec<Medicine>),
    Medicine(Box<Medicine>),
}
