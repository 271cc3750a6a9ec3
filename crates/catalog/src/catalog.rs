use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use stockledger_core::{DomainError, DomainResult, LocationId, ProductId};

use crate::{Location, Product};

/// What the ledger needs from the product/location catalog.
///
/// The ledger never mutates the catalog. Display-name lookups fall back to the
/// raw id when the entity is missing, for products and locations alike.
pub trait EntityCatalog: Send + Sync {
    fn product(&self, id: &ProductId) -> Option<Product>;

    fn location(&self, id: &LocationId) -> Option<Location>;

    /// All products, ordered by id.
    fn products(&self) -> Vec<Product>;

    /// All locations, ordered by id.
    fn locations(&self) -> Vec<Location>;

    fn product_exists(&self, id: &ProductId) -> bool {
        self.product(id).is_some()
    }

    fn location_exists(&self, id: &LocationId) -> bool {
        self.location(id).is_some()
    }

    fn product_display_name(&self, id: &ProductId) -> String {
        self.product(id)
            .map(|p| p.name)
            .unwrap_or_else(|| id.to_string())
    }

    fn location_display_name(&self, id: &LocationId) -> String {
        self.location(id)
            .map(|l| l.name)
            .unwrap_or_else(|| id.to_string())
    }
}

impl<C> EntityCatalog for Arc<C>
where
    C: EntityCatalog + ?Sized,
{
    fn product(&self, id: &ProductId) -> Option<Product> {
        (**self).product(id)
    }

    fn location(&self, id: &LocationId) -> Option<Location> {
        (**self).location(id)
    }

    fn products(&self) -> Vec<Product> {
        (**self).products()
    }

    fn locations(&self) -> Vec<Location> {
        (**self).locations()
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    products: BTreeMap<ProductId, Product>,
    locations: BTreeMap<LocationId, Location>,
}

/// In-memory catalog for tests/dev and the CLI shell.
///
/// Entities are created once and edited in place; there is no delete.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    // Catalog state is plain data, so a poisoned lock still holds a usable value.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, CatalogState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CatalogState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new product. Rejects an id that already exists.
    pub fn add_product(&self, product: Product) -> DomainResult<Product> {
        let mut state = self.write();
        if state.products.contains_key(&product.product_id) {
            return Err(DomainError::duplicate(format!(
                "product {}",
                product.product_id
            )));
        }
        state
            .products
            .insert(product.product_id.clone(), product.clone());
        Ok(product)
    }

    /// Edit a product's name/description.
    pub fn update_product(
        &self,
        id: &ProductId,
        name: &str,
        description: Option<&str>,
    ) -> DomainResult<Product> {
        let mut state = self.write();
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
        product.rename(name, description)?;
        Ok(product.clone())
    }

    pub fn get_product(&self, id: &ProductId) -> DomainResult<Product> {
        self.product(id)
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    pub fn list_products(&self) -> Vec<Product> {
        self.products()
    }

    pub fn product_count(&self) -> usize {
        self.read().products.len()
    }

    /// Register a new location. Rejects an id that already exists.
    pub fn add_location(&self, location: Location) -> DomainResult<Location> {
        let mut state = self.write();
        if state.locations.contains_key(&location.location_id) {
            return Err(DomainError::duplicate(format!(
                "location {}",
                location.location_id
            )));
        }
        state
            .locations
            .insert(location.location_id.clone(), location.clone());
        Ok(location)
    }

    pub fn update_location(
        &self,
        id: &LocationId,
        name: &str,
        address: Option<&str>,
    ) -> DomainResult<Location> {
        let mut state = self.write();
        let location = state
            .locations
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("location {id}")))?;
        location.rename(name, address)?;
        Ok(location.clone())
    }

    pub fn get_location(&self, id: &LocationId) -> DomainResult<Location> {
        self.location(id)
            .ok_or_else(|| DomainError::not_found(format!("location {id}")))
    }

    pub fn list_locations(&self) -> Vec<Location> {
        self.locations()
    }

    pub fn location_count(&self) -> usize {
        self.read().locations.len()
    }
}

impl EntityCatalog for InMemoryCatalog {
    fn product(&self, id: &ProductId) -> Option<Product> {
        self.read().products.get(id).cloned()
    }

    fn location(&self, id: &LocationId) -> Option<Location> {
        self.read().locations.get(id).cloned()
    }

    fn products(&self) -> Vec<Product> {
        self.read().products.values().cloned().collect()
    }

    fn locations(&self) -> Vec<Location> {
        self.read().locations.values().cloned().collect()
    }
}
