//! Presentation views over derived balances.
//!
//! Ids are resolved to display names through the catalog with a raw-id
//! fallback, applied the same way to products and locations. Rows are ordered
//! by (product name, location name) using case-sensitive ordinal comparison,
//! then by (product id, location id) so equal names still sort totally.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stockledger_catalog::EntityCatalog;
use stockledger_core::{LocationId, ProductId};

use super::balances::{Balances, StockLevel};

/// Which balance rows to report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceFilter {
    /// Every (product, location) pair the log has touched, zeros included.
    #[default]
    IncludeZero,
    /// Only pairs whose balance is not zero.
    NonZeroOnly,
}

impl BalanceFilter {
    pub fn from_include_zero(include_zero: bool) -> Self {
        if include_zero {
            BalanceFilter::IncludeZero
        } else {
            BalanceFilter::NonZeroOnly
        }
    }

    fn keeps(self, qty: StockLevel) -> bool {
        match self {
            BalanceFilter::IncludeZero => true,
            BalanceFilter::NonZeroOnly => qty != 0,
        }
    }
}

/// One line of the balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub product_id: ProductId,
    pub product_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub qty: StockLevel,
}

impl BalanceRow {
    fn display_cmp(&self, other: &Self) -> Ordering {
        self.product_name
            .cmp(&other.product_name)
            .then_with(|| self.location_name.cmp(&other.location_name))
            .then_with(|| self.product_id.cmp(&other.product_id))
            .then_with(|| self.location_id.cmp(&other.location_id))
    }
}

/// Resolves display names once per id.
struct NameCache<'a, C: ?Sized> {
    catalog: &'a C,
    products: BTreeMap<ProductId, String>,
    locations: BTreeMap<LocationId, String>,
}

impl<'a, C> NameCache<'a, C>
where
    C: EntityCatalog + ?Sized,
{
    fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            products: BTreeMap::new(),
            locations: BTreeMap::new(),
        }
    }

    fn product(&mut self, id: &ProductId) -> String {
        let catalog = self.catalog;
        self.products
            .entry(id.clone())
            .or_insert_with(|| catalog.product_display_name(id))
            .clone()
    }

    fn location(&mut self, id: &LocationId) -> String {
        let catalog = self.catalog;
        self.locations
            .entry(id.clone())
            .or_insert_with(|| catalog.location_display_name(id))
            .clone()
    }
}

/// Render balances as display rows, sorted for stable presentation.
pub fn balance_rows<C>(balances: &Balances, catalog: &C, filter: BalanceFilter) -> Vec<BalanceRow>
where
    C: EntityCatalog + ?Sized,
{
    let mut names = NameCache::new(catalog);

    let mut rows: Vec<BalanceRow> = balances
        .iter()
        .filter(|(_, _, qty)| filter.keeps(*qty))
        .map(|(product_id, location_id, qty)| BalanceRow {
            product_id: product_id.clone(),
            product_name: names.product(product_id),
            location_id: location_id.clone(),
            location_name: names.location(location_id),
            qty,
        })
        .collect();

    rows.sort_by(BalanceRow::display_cmp);
    rows
}

/// A labelled axis entry of the stock grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridEntry<Id> {
    pub id: Id,
    pub name: String,
}

/// Products × locations matrix of on-hand quantities.
///
/// Axes cover every catalog product and location, plus any product or
/// location referenced by a balance but missing from the catalog. Cells with
/// no movements are 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockGrid {
    pub products: Vec<GridEntry<ProductId>>,
    pub locations: Vec<GridEntry<LocationId>>,
    /// `cells[p][l]` is the balance of `products[p]` at `locations[l]`.
    pub cells: Vec<Vec<StockLevel>>,
}

impl StockGrid {
    pub fn build<C>(balances: &Balances, catalog: &C) -> Self
    where
        C: EntityCatalog + ?Sized,
    {
        let mut products: BTreeMap<ProductId, String> = catalog
            .products()
            .into_iter()
            .map(|p| (p.product_id, p.name))
            .collect();
        let mut locations: BTreeMap<LocationId, String> = catalog
            .locations()
            .into_iter()
            .map(|l| (l.location_id, l.name))
            .collect();

        for (product_id, location_id, _) in balances.iter() {
            products
                .entry(product_id.clone())
                .or_insert_with(|| product_id.to_string());
            locations
                .entry(location_id.clone())
                .or_insert_with(|| location_id.to_string());
        }

        let mut products: Vec<GridEntry<ProductId>> = products
            .into_iter()
            .map(|(id, name)| GridEntry { id, name })
            .collect();
        let mut locations: Vec<GridEntry<LocationId>> = locations
            .into_iter()
            .map(|(id, name)| GridEntry { id, name })
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        locations.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        let cells = products
            .iter()
            .map(|p| {
                locations
                    .iter()
                    .map(|l| balances.get(&p.id, &l.id))
                    .collect()
            })
            .collect();

        Self {
            products,
            locations,
            cells,
        }
    }

    /// Cell lookup by ids; `None` if either id is not on an axis.
    pub fn quantity(&self, product_id: &ProductId, location_id: &LocationId) -> Option<StockLevel> {
        let p = self.products.iter().position(|e| &e.id == product_id)?;
        let l = self.locations.iter().position(|e| &e.id == location_id)?;
        Some(self.cells[p][l])
    }
}
