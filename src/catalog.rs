//! Storefront data access used while evaluating and applying rule-sets.
//!
//! The engine never reads products, categories or coupons directly; it goes
//! through [`Catalog`]. [`MemoryCatalog`] is a self-contained implementation.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{Context, QueryClause, TermOperator, PRODUCT_CATEGORY_TAXONOMY};

/// Which products a count query should consider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Availability {
    /// Every published product matching the filters.
    #[default]
    Any,
    /// Only products in stock, on backorder, or accepting backorders.
    Purchasable,
}

/// A product count query built from the request's own filters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductQuery {
    pub clauses: Vec<QueryClause>,
    pub availability: Availability,
}

impl ProductQuery {
    /// Copy the taxonomy and meta filters of the current query.
    #[must_use]
    pub fn from_context(ctx: &Context, availability: Availability) -> Self {
        let clauses = ctx
            .tax_query()
            .iter()
            .chain(ctx.meta_query())
            .cloned()
            .collect();
        Self {
            clauses,
            availability,
        }
    }
}

/// A product category and its product count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub id: u64,
    pub count: u64,
}

/// Read access to catalog data.
pub trait Catalog {
    /// Number of published products matching `query`.
    fn count_products(&self, query: &ProductQuery) -> u64;

    /// Category ids of a product. Empty for unknown products.
    fn product_categories(&self, product_id: u64) -> Vec<u64>;

    /// Parent product of a variation.
    fn variation_parent(&self, variation_id: u64) -> Option<u64>;

    /// Every product carrying the given attribute term.
    fn products_with_term(&self, term_id: u64) -> Vec<u64>;

    /// Parent of a category, `None` for top-level or unknown categories.
    fn category_parent(&self, category_id: u64) -> Option<u64>;

    /// All product categories with their product counts.
    fn categories(&self) -> Vec<CategoryCount>;

    /// Coupon id for an applied coupon code.
    fn coupon_id(&self, code: &str) -> Option<u64>;
}

/// Stock state of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
}

/// A product held by [`MemoryCatalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub categories: Vec<u64>,
    pub attribute_terms: Vec<u64>,
    pub stock: StockStatus,
    pub backorders_allowed: bool,
    pub meta: BTreeMap<String, String>,
}

impl Product {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_categories(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.categories.extend(ids);
        self
    }

    #[must_use]
    pub fn with_terms(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.attribute_terms.extend(ids);
        self
    }

    #[must_use]
    pub fn stock(mut self, stock: StockStatus) -> Self {
        self.stock = stock;
        self
    }

    #[must_use]
    pub fn backorders_allowed(mut self, allowed: bool) -> Self {
        self.backorders_allowed = allowed;
        self
    }

    #[must_use]
    pub fn meta(mut self, key: &str, value: &str) -> Self {
        self.meta.insert(key.to_owned(), value.to_owned());
        self
    }

    fn is_purchasable(&self) -> bool {
        matches!(self.stock, StockStatus::InStock | StockStatus::OnBackorder)
            || self.backorders_allowed
    }

    fn matches(&self, clause: &QueryClause) -> bool {
        match clause {
            QueryClause::Taxonomy {
                taxonomy,
                terms,
                operator,
            } => {
                let assigned = if taxonomy == PRODUCT_CATEGORY_TAXONOMY {
                    &self.categories
                } else {
                    &self.attribute_terms
                };
                let hit = terms.iter().any(|t| assigned.contains(t));
                match operator {
                    TermOperator::In => hit,
                    TermOperator::NotIn => !hit,
                }
            }
            QueryClause::Meta { key, value } => self.meta.get(key) == Some(value),
        }
    }
}

/// In-memory [`Catalog`].
///
/// Category product counts are derived from product assignments.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: BTreeMap<u64, Product>,
    variations: HashMap<u64, u64>,
    category_parents: BTreeMap<u64, Option<u64>>,
    coupons: HashMap<String, u64>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product. Its categories are registered as top-level categories
    /// unless already known.
    #[must_use]
    pub fn product(mut self, product: Product) -> Self {
        for &category in &product.categories {
            self.category_parents.entry(category).or_insert(None);
        }
        self.products.insert(product.id, product);
        self
    }

    #[must_use]
    pub fn variation(mut self, variation_id: u64, parent_id: u64) -> Self {
        self.variations.insert(variation_id, parent_id);
        self
    }

    #[must_use]
    pub fn category(mut self, id: u64, parent: Option<u64>) -> Self {
        self.category_parents.insert(id, parent);
        self
    }

    #[must_use]
    pub fn coupon(mut self, code: &str, id: u64) -> Self {
        self.coupons.insert(code.to_owned(), id);
        self
    }
}

impl Catalog for MemoryCatalog {
    fn count_products(&self, query: &ProductQuery) -> u64 {
        let count = self
            .products
            .values()
            .filter(|p| query.clauses.iter().all(|c| p.matches(c)))
            .filter(|p| match query.availability {
                Availability::Any => true,
                Availability::Purchasable => p.is_purchasable(),
            })
            .count();
        count as u64
    }

    fn product_categories(&self, product_id: u64) -> Vec<u64> {
        self.products
            .get(&product_id)
            .map(|p| p.categories.clone())
            .unwrap_or_default()
    }

    fn variation_parent(&self, variation_id: u64) -> Option<u64> {
        self.variations.get(&variation_id).copied()
    }

    fn products_with_term(&self, term_id: u64) -> Vec<u64> {
        self.products
            .values()
            .filter(|p| p.attribute_terms.contains(&term_id))
            .map(|p| p.id)
            .collect()
    }

    fn category_parent(&self, category_id: u64) -> Option<u64> {
        self.category_parents.get(&category_id).copied().flatten()
    }

    fn categories(&self) -> Vec<CategoryCount> {
        self.category_parents
            .keys()
            .map(|&id| CategoryCount {
                id,
                count: self
                    .products
                    .values()
                    .filter(|p| p.categories.contains(&id))
                    .count() as u64,
            })
            .collect()
    }

    fn coupon_id(&self, code: &str) -> Option<u64> {
        self.coupons.get(code).copied()
    }
}
