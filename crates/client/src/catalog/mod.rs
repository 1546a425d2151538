//! Medicine listings with caching and an offline fallback.
//!
//! Listings come from the API and are cached for the configured TTL.
//! Name searches are not cached. When the API cannot answer, listings fall
//! back to a fixed set of sample medicines so there is always something to
//! show; those fallback results are never cached.

mod cache;
mod sample;

pub use sample::{matching_samples, sample_medicines};

use std::sync::Arc;

use moka::future::Cache;
use tracing::{debug, instrument};

use medicart_core::MedicineId;

use crate::api::{ApiClient, ApiError, Medicine, MedicineQuery};
use crate::config::ClientConfig;
use cache::{CacheKey, CacheValue};

const CACHE_CAPACITY: u64 = 1000;

/// Where a listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSource {
    /// Fetched from the API just now.
    Live,
    /// Served from the listing cache.
    Cached,
    /// Built-in samples, because the API failed.
    Fallback,
}

/// A list of medicines and its provenance.
#[derive(Debug, Clone)]
pub struct Listing {
    pub medicines: Vec<Medicine>,
    pub source: ProductSource,
}

impl Listing {
    const fn new(medicines: Vec<Medicine>, source: ProductSource) -> Self {
        Self { medicines, source }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.source, ProductSource::Fallback)
    }
}

/// Cached access to the medicine catalog.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Create a catalog backed by `api`.
    #[must_use]
    pub fn new(api: ApiClient, config: &ClientConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(config.catalog_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogInner { api, cache }),
        }
    }

    /// Featured medicines, or the samples if the API fails.
    #[instrument(skip(self))]
    pub async fn featured(&self) -> Listing {
        if let Some(CacheValue::Medicines(medicines)) =
            self.inner.cache.get(&CacheKey::Featured).await
        {
            debug!("Cache hit for featured medicines");
            return Listing::new(medicines, ProductSource::Cached);
        }

        match self.inner.api.featured_medicines().await {
            Ok(medicines) => {
                self.inner
                    .cache
                    .insert(CacheKey::Featured, CacheValue::Medicines(medicines.clone()))
                    .await;
                Listing::new(medicines, ProductSource::Live)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load featured medicines, showing samples");
                Listing::new(sample_medicines(), ProductSource::Fallback)
            }
        }
    }

    /// Medicines matching `query`, or matching samples if the API fails.
    #[instrument(skip(self))]
    pub async fn all(&self, query: &MedicineQuery) -> Listing {
        let cacheable = query.search.is_none();
        let cache_key = CacheKey::Medicines(query.clone());

        if cacheable
            && let Some(CacheValue::Medicines(medicines)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for medicines");
            return Listing::new(medicines, ProductSource::Cached);
        }

        match self.inner.api.medicines(query).await {
            Ok(medicines) => {
                if cacheable {
                    self.inner
                        .cache
                        .insert(cache_key, CacheValue::Medicines(medicines.clone()))
                        .await;
                }
                Listing::new(medicines, ProductSource::Live)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load medicines, showing samples");
                Listing::new(matching_samples(query), ProductSource::Fallback)
            }
        }
    }

    /// One medicine by id.
    ///
    /// # Errors
    ///
    /// Returns the API error; there is no fallback for single lookups.
    #[instrument(skip(self))]
    pub async fn medicine(&self, id: MedicineId) -> Result<Medicine, ApiError> {
        let cache_key = CacheKey::Medicine(id);

        if let Some(CacheValue::Medicine(medicine)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for medicine");
            return Ok(*medicine);
        }

        let medicine = self.inner.api.medicine(id).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Medicine(Box::new(medicine.clone())))
            .await;
        Ok(medicine)
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}
