//! Product listing commands.
//!
//! # Usage
//!
//! ```bash
//! medicart products --featured
//! medicart products --search napa
//! medicart products --category tablet --limit 20
//! medicart product 3
//! ```

use medicart_client::api::MedicineQuery;
use medicart_client::catalog::{Listing, ProductSource};
use medicart_client::view::ProductView;
use medicart_client::{ClientError, MediCart};
use medicart_core::MedicineId;

use super::Result;

/// List medicines.
pub async fn list(app: &MediCart, featured: bool, query: MedicineQuery) -> Result<()> {
    let listing = if featured {
        app.catalog().featured().await
    } else {
        app.catalog().all(&query).await
    };
    print_listing(&listing);
    Ok(())
}

/// Show one medicine.
///
/// Ids that are not numbers are reported as not found.
pub async fn show(app: &MediCart, id: &str) -> Result<()> {
    let id: MedicineId = id
        .parse()
        .map_err(|_| ClientError::NotFound(format!("medicine {id}")))?;

    let medicine = app.catalog().medicine(id).await.map_err(|e| {
        if e.status().is_some_and(|s| s.as_u16() == 404) {
            ClientError::NotFound(format!("medicine {id}"))
        } else {
            ClientError::Api(e)
        }
    })?;

    let view = ProductView::from(&medicine);
    println!("{} (#{})", view.name, view.id);
    println!("  Price:        {}", view.price);
    if !view.manufacturer.is_empty() {
        println!("  Manufacturer: {}", view.manufacturer);
    }
    if let Some(category) = &view.category {
        println!("  Category:     {category}");
    }
    match view.in_stock {
        Some(true) => println!("  In stock"),
        Some(false) => println!("  Out of stock"),
        None => {}
    }
    if view.requires_prescription {
        println!("  Prescription required");
    }
    if let Some(description) = &view.description {
        println!();
        println!("  {description}");
    }
    Ok(())
}

fn print_listing(listing: &Listing) {
    if listing.source == ProductSource::Fallback {
        println!("(MediCart is unreachable; showing sample products)");
    }
    if listing.medicines.is_empty() {
        println!("No products found.");
        return;
    }

    for view in listing.medicines.iter().map(ProductView::from) {
        let rx = if view.requires_prescription { " [Rx]" } else { "" };
        println!(
            "{:>5}  {:<28} {:>10}  {}{rx}",
            view.id.as_i32(),
            view.name,
            view.price,
            view.manufacturer
        );
    }
}
