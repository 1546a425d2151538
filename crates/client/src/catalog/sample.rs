//! Built-in medicines shown when the API cannot be reached.

use medicart_core::{MedicineId, Price};

use crate::api::{Medicine, MedicineQuery};

const SAMPLES: [(i32, &str, i64, &str, &str); 5] = [
    (1, "Napa", 20_000, "Beximco", "Pain reliever and fever reducer"),
    (2, "Disprin", 25_000, "Square", "Pain reliever tablet"),
    (3, "Levofox", 50_000, "Incepta", "Antibiotic medication"),
    (4, "Iron Complex", 40_000, "Drug International", "Iron supplement"),
    (5, "Nutraflex", 30_000, "ACI", "Joint health supplement"),
];

/// The five sample medicines, in display order.
#[must_use]
pub fn sample_medicines() -> Vec<Medicine> {
    SAMPLES
        .iter()
        .map(|&(id, name, cents, manufacturer, description)| Medicine {
            id: MedicineId::new(id),
            name: name.to_string(),
            price: Price::from_cents(cents),
            manufacturer: Some(manufacturer.to_string()),
            description: Some(description.to_string()),
            category: None,
            stock: None,
            requires_prescription: false,
            image_url: None,
            is_featured: true,
        })
        .collect()
}

/// Samples narrowed by the query's name search. Other filters are ignored
/// because the samples carry no category.
#[must_use]
pub fn matching_samples(query: &MedicineQuery) -> Vec<Medicine> {
    let mut samples = sample_medicines();
    if let Some(term) = query.search.as_deref().map(str::to_lowercase) {
        samples.retain(|m| m.name.to_lowercase().contains(&term));
    }
    samples
}
